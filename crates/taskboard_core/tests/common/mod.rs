#![allow(dead_code)]

use rusqlite::Connection;
use std::sync::Arc;
use std::time::Duration;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::sequencer::SiblingSlot;
use taskboard_core::{
    AccountService, AuthorizationGate, BoardRepository, Caller, Card, ExclusiveScopes,
    BcryptHasher, HierarchyService, IdentityResolver, SiblingSet, SqliteBoardRepository,
    SqliteSessionStore, SqliteUserRepository, TaskList, DEFAULT_SESSION_TTL,
};

pub const PASSWORD: &str = "correct-horse-battery";

pub type Accounts<'conn> =
    AccountService<SqliteUserRepository<'conn>, SqliteSessionStore<'conn>, BcryptHasher>;
pub type Gate<'conn> = AuthorizationGate<SqliteSessionStore<'conn>, SqliteUserRepository<'conn>>;
pub type Service<'conn> = HierarchyService<SqliteBoardRepository<'conn>>;

pub fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn accounts(conn: &Connection) -> Accounts<'_> {
    accounts_with_ttl(conn, DEFAULT_SESSION_TTL)
}

pub fn accounts_with_ttl(conn: &Connection, ttl: Duration) -> Accounts<'_> {
    AccountService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqliteSessionStore::try_new(conn, ttl).unwrap(),
        BcryptHasher::with_cost(4),
    )
}

pub fn gate(conn: &Connection) -> Gate<'_> {
    AuthorizationGate::new(IdentityResolver::new(
        SqliteSessionStore::try_new(conn, DEFAULT_SESSION_TTL).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    ))
}

pub fn service(conn: &Connection) -> Service<'_> {
    service_with_scopes(conn, Arc::new(ExclusiveScopes::new()))
}

pub fn service_with_scopes(conn: &Connection, scopes: Arc<ExclusiveScopes>) -> Service<'_> {
    HierarchyService::new(SqliteBoardRepository::try_new(conn).unwrap(), scopes)
}

/// Registers `email`, logs in and returns the admitted caller and its credential.
pub fn sign_up(conn: &Connection, email: &str) -> (Caller, String) {
    let accounts = accounts(conn);
    accounts.register("Test User", email, PASSWORD).unwrap();
    let session = accounts.login(email, PASSWORD).unwrap();
    let token = session.token.into_string();
    let caller = gate(conn).admit(Some(&token)).unwrap();
    (caller, token)
}

pub fn card_titles(cards: &[Card]) -> Vec<String> {
    cards.iter().map(|card| card.title.clone()).collect()
}

pub fn list_names(lists: &[TaskList]) -> Vec<String> {
    lists.iter().map(|list| list.name.clone()).collect()
}

pub fn slots(conn: &Connection, set: SiblingSet) -> Vec<SiblingSlot> {
    SqliteBoardRepository::try_new(conn)
        .unwrap()
        .sibling_slots(set)
        .unwrap()
}

pub fn positions(cards: &[Card]) -> Vec<i64> {
    cards.iter().map(|card| card.position).collect()
}
