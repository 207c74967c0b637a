//! Session persistence.
//!
//! # Invariants
//! - Only a digest of the session credential is stored, never the credential.
//! - Rows past `expires_at` are treated as absent even before purge.

use crate::model::hierarchy::UserId;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

const SESSION_COLUMNS: &[&str] = &["token_hash", "user_uuid", "created_at", "expires_at"];

/// Stored session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: UserId,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Repository interface for session rows.
pub trait SessionRepository {
    fn insert_session(&self, token_hash: &str, user_id: UserId, expires_at: i64) -> RepoResult<()>;
    /// Loads an unexpired session by credential digest.
    fn find_active_session(&self, token_hash: &str, now_ms: i64) -> RepoResult<Option<SessionRecord>>;
    /// Removes one session. Returns whether a row existed.
    fn delete_session(&self, token_hash: &str) -> RepoResult<bool>;
    /// Removes every session expired at `now_ms`. Returns removed count.
    fn purge_expired(&self, now_ms: i64) -> RepoResult<usize>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("sessions", SESSION_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn insert_session(&self, token_hash: &str, user_id: UserId, expires_at: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token_hash, user_uuid, expires_at)
             VALUES (?1, ?2, ?3);",
            params![token_hash, user_id.to_string(), expires_at],
        )?;
        Ok(())
    }

    fn find_active_session(&self, token_hash: &str, now_ms: i64) -> RepoResult<Option<SessionRecord>> {
        let row: Option<(String, String, i64, i64)> = self
            .conn
            .query_row(
                "SELECT token_hash, user_uuid, created_at, expires_at
                 FROM sessions
                 WHERE token_hash = ?1
                   AND expires_at > ?2;",
                params![token_hash, now_ms],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        row.map(|(token_hash, user_uuid, created_at, expires_at)| {
            Ok(SessionRecord {
                token_hash,
                user_id: parse_uuid(&user_uuid, "sessions.user_uuid")?,
                created_at,
                expires_at,
            })
        })
        .transpose()
    }

    fn delete_session(&self, token_hash: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?1;", [token_hash])?;
        Ok(changed > 0)
    }

    fn purge_expired(&self, now_ms: i64) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1;", [now_ms])?;
        Ok(changed)
    }
}
