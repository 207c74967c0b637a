//! Session credential issuance and resolution.
//!
//! # Invariants
//! - Credentials are 32 random bytes, hex encoded; only their SHA-256 is stored.
//! - A session is valid strictly before `expires_at`.

use crate::model::hierarchy::UserId;
use crate::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use crate::repo::RepoResult;
use log::debug;
use rand::RngCore;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use std::fmt::{Debug, Formatter};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const TOKEN_BYTES: usize = 32;

/// Opaque bearer credential handed to the client once at login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Session collaborator consumed by the identity resolver and account service.
pub trait SessionStore {
    fn issue(&self, user_id: UserId) -> RepoResult<SessionToken>;
    /// Returns the bound user, or `None` for unknown or expired credentials.
    fn resolve(&self, credential: &str) -> RepoResult<Option<UserId>>;
    /// Revokes a credential. Returns whether it was live.
    fn invalidate(&self, credential: &str) -> RepoResult<bool>;
    fn purge_expired(&self) -> RepoResult<usize>;
}

/// Session store persisting digests through `SqliteSessionRepository`.
pub struct SqliteSessionStore<'conn> {
    repo: SqliteSessionRepository<'conn>,
    ttl: Duration,
}

impl<'conn> SqliteSessionStore<'conn> {
    pub fn try_new(conn: &'conn Connection, ttl: Duration) -> RepoResult<Self> {
        Ok(Self {
            repo: SqliteSessionRepository::try_new(conn)?,
            ttl,
        })
    }
}

impl SessionStore for SqliteSessionStore<'_> {
    fn issue(&self, user_id: UserId) -> RepoResult<SessionToken> {
        let mut raw = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = hex::encode(raw);

        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now_ms().saturating_add(ttl_ms);
        self.repo
            .insert_session(&credential_digest(&token), user_id, expires_at)?;
        debug!(
            "event=session_issue module=auth status=ok user={} expires_at={}",
            user_id, expires_at
        );
        Ok(SessionToken(token))
    }

    fn resolve(&self, credential: &str) -> RepoResult<Option<UserId>> {
        let session = self
            .repo
            .find_active_session(&credential_digest(credential), now_ms())?;
        Ok(session.map(|record| record.user_id))
    }

    fn invalidate(&self, credential: &str) -> RepoResult<bool> {
        self.repo.delete_session(&credential_digest(credential))
    }

    fn purge_expired(&self) -> RepoResult<usize> {
        self.repo.purge_expired(now_ms())
    }
}

fn credential_digest(credential: &str) -> String {
    hex::encode(Sha256::digest(credential.as_bytes()))
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{credential_digest, SessionToken};

    #[test]
    fn digest_is_stable_hex_sha256() {
        let digest = credential_digest("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = SessionToken("secret".to_string());
        assert!(!format!("{token:?}").contains("secret"));
    }
}
