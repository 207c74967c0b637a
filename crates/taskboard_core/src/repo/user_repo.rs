//! User account repository.
//!
//! # Invariants
//! - `email` values are stored already normalized; uniqueness is enforced by
//!   the schema and surfaced as `ValidationError::EmailTaken`.
//! - Accounts are never updated in place; identity is immutable.

use crate::model::hierarchy::UserId;
use crate::model::user::User;
use crate::model::validation::ValidationError;
use crate::repo::{ensure_connection_ready, is_constraint_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    email,
    credential_hash,
    created_at
FROM users";

const USER_COLUMNS: &[&str] = &["uuid", "name", "email", "credential_hash", "created_at"];

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts one account and returns the stored record.
    fn create_user(&self, name: &str, email: &str, credential_hash: &str) -> RepoResult<User>;
    /// Loads one account by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Loads one account by normalized email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("users", USER_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, name: &str, email: &str, credential_hash: &str) -> RepoResult<User> {
        let id = Uuid::new_v4();
        let inserted = self.conn.execute(
            "INSERT INTO users (uuid, name, email, credential_hash)
             VALUES (?1, ?2, ?3, ?4);",
            params![id.to_string(), name, email, credential_hash],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_constraint_violation(&err) => {
                return Err(ValidationError::EmailTaken.into());
            }
            Err(err) => return Err(err.into()),
        }

        self.get_user(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("user {id} vanished after insert")))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                read_user_columns,
            )
            .optional()?
            .map(into_user)
            .transpose()
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
                [email],
                read_user_columns,
            )
            .optional()?
            .map(into_user)
            .transpose()
    }
}

type UserColumns = (String, String, String, String, i64);

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<UserColumns> {
    Ok((
        row.get("uuid")?,
        row.get("name")?,
        row.get("email")?,
        row.get("credential_hash")?,
        row.get("created_at")?,
    ))
}

fn into_user((uuid, name, email, credential_hash, created_at): UserColumns) -> RepoResult<User> {
    Ok(User {
        id: parse_uuid(&uuid, "users.uuid")?,
        name,
        email,
        credential_hash,
        created_at,
    })
}
