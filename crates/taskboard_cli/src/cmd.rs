//! Command dispatch onto core services.

use crate::{BoardCommands, CardCommands, Commands, ListCommands};
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use taskboard_core::{
    core_version, parse_entity_id, ping, AccountService, AppConfig, AuthorizationGate,
    BoardError, Caller, Connection, EntityKind, ExclusiveScopes, HierarchyService, IdentityResolver,
    BcryptHasher, SqliteBoardRepository, SqliteSessionStore, SqliteUserRepository,
};
use uuid::Uuid;

pub fn dispatch(
    conn: &Connection,
    config: &AppConfig,
    token: Option<&str>,
    command: Commands,
) -> Result<Value> {
    match command {
        Commands::Health => Ok(json!({ "status": ping(), "version": core_version() })),
        Commands::Register {
            name,
            email,
            password,
        } => {
            let user = accounts(conn, config)?.register(&name, &email, &password)?;
            Ok(serde_json::to_value(user)?)
        }
        Commands::Login { email, password } => {
            let session = accounts(conn, config)?.login(&email, &password)?;
            Ok(json!({ "token": session.token.as_str(), "user": session.user }))
        }
        Commands::Logout => {
            let credential = token.ok_or(BoardError::Unauthenticated)?;
            accounts(conn, config)?.logout(credential)?;
            Ok(json!({ "logged_out": true }))
        }
        Commands::Me => {
            let caller = admit(conn, config, token)?;
            Ok(serde_json::to_value(accounts(conn, config)?.me(&caller)?)?)
        }
        Commands::PurgeSessions => {
            let removed = accounts(conn, config)?.purge_expired_sessions()?;
            Ok(json!({ "removed": removed }))
        }
        Commands::Board { command } => {
            let caller = admit(conn, config, token)?;
            board_command(&hierarchy(conn)?, &caller, command)
        }
        Commands::List { command } => {
            let caller = admit(conn, config, token)?;
            list_command(&hierarchy(conn)?, &caller, command)
        }
        Commands::Card { command } => {
            let caller = admit(conn, config, token)?;
            card_command(&hierarchy(conn)?, &caller, command)
        }
    }
}

type Hierarchy<'conn> = HierarchyService<SqliteBoardRepository<'conn>>;

fn board_command(service: &Hierarchy<'_>, caller: &Caller, command: BoardCommands) -> Result<Value> {
    let value = match command {
        BoardCommands::Create { name, description } => serde_json::to_value(
            service.create_board(caller, &name, description.as_deref())?,
        )?,
        BoardCommands::List => serde_json::to_value(service.list_boards(caller)?)?,
        BoardCommands::Get { id } => {
            serde_json::to_value(service.get_board(caller, id_of(EntityKind::Board, &id)?)?)?
        }
        BoardCommands::Update {
            id,
            name,
            description,
        } => serde_json::to_value(service.update_board(
            caller,
            id_of(EntityKind::Board, &id)?,
            name.as_deref(),
            description.as_deref(),
        )?)?,
        BoardCommands::Delete { id } => {
            serde_json::to_value(service.delete_board(caller, id_of(EntityKind::Board, &id)?)?)?
        }
    };
    Ok(value)
}

fn list_command(service: &Hierarchy<'_>, caller: &Caller, command: ListCommands) -> Result<Value> {
    let value = match command {
        ListCommands::Create {
            board,
            name,
            position,
        } => serde_json::to_value(service.create_list(
            caller,
            id_of(EntityKind::Board, &board)?,
            &name,
            position,
        )?)?,
        ListCommands::List { board } => serde_json::to_value(
            service.list_lists(caller, id_of(EntityKind::Board, &board)?)?,
        )?,
        ListCommands::Get { id } => {
            serde_json::to_value(service.get_list(caller, id_of(EntityKind::List, &id)?)?)?
        }
        ListCommands::Rename { id, name } => serde_json::to_value(
            service.rename_list(caller, id_of(EntityKind::List, &id)?, &name)?,
        )?,
        ListCommands::Move {
            id,
            board,
            position,
        } => {
            let destination = board
                .map(|board| id_of(EntityKind::Board, &board))
                .transpose()?;
            serde_json::to_value(service.move_list(
                caller,
                id_of(EntityKind::List, &id)?,
                destination,
                position,
            )?)?
        }
        ListCommands::Delete { id } => {
            serde_json::to_value(service.delete_list(caller, id_of(EntityKind::List, &id)?)?)?
        }
    };
    Ok(value)
}

fn card_command(service: &Hierarchy<'_>, caller: &Caller, command: CardCommands) -> Result<Value> {
    let value = match command {
        CardCommands::Create {
            list,
            title,
            description,
            position,
        } => serde_json::to_value(service.create_card(
            caller,
            id_of(EntityKind::List, &list)?,
            &title,
            description.as_deref(),
            position,
        )?)?,
        CardCommands::List { list } => serde_json::to_value(
            service.list_cards(caller, id_of(EntityKind::List, &list)?)?,
        )?,
        CardCommands::Get { id } => {
            serde_json::to_value(service.get_card(caller, id_of(EntityKind::Card, &id)?)?)?
        }
        CardCommands::Update {
            id,
            title,
            description,
        } => serde_json::to_value(service.update_card(
            caller,
            id_of(EntityKind::Card, &id)?,
            title.as_deref(),
            description.as_deref(),
        )?)?,
        CardCommands::Move {
            id,
            list,
            position,
        } => {
            let destination = list
                .map(|list| id_of(EntityKind::List, &list))
                .transpose()?;
            serde_json::to_value(service.move_card(
                caller,
                id_of(EntityKind::Card, &id)?,
                destination,
                position,
            )?)?
        }
        CardCommands::Delete { id } => {
            serde_json::to_value(service.delete_card(caller, id_of(EntityKind::Card, &id)?)?)?
        }
    };
    Ok(value)
}

fn id_of(kind: EntityKind, value: &str) -> Result<Uuid, BoardError> {
    Ok(parse_entity_id(kind, value)?)
}

fn admit(conn: &Connection, config: &AppConfig, token: Option<&str>) -> Result<Caller, BoardError> {
    let sessions = SqliteSessionStore::try_new(conn, config.session_ttl)?;
    let users = SqliteUserRepository::try_new(conn)?;
    let gate = AuthorizationGate::new(IdentityResolver::new(sessions, users));
    Ok(gate.admit(token)?)
}

fn accounts<'conn>(
    conn: &'conn Connection,
    config: &AppConfig,
) -> Result<
    AccountService<SqliteUserRepository<'conn>, SqliteSessionStore<'conn>, BcryptHasher>,
    BoardError,
> {
    Ok(AccountService::new(
        SqliteUserRepository::try_new(conn)?,
        SqliteSessionStore::try_new(conn, config.session_ttl)?,
        BcryptHasher::default(),
    ))
}

fn hierarchy(conn: &Connection) -> Result<Hierarchy<'_>, BoardError> {
    Ok(HierarchyService::new(
        SqliteBoardRepository::try_new(conn)?,
        Arc::new(ExclusiveScopes::new()),
    ))
}
