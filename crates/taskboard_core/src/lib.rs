//! Core domain logic for the task board.
//! This crate is the single source of truth for ordering and ownership invariants.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sequencer;
pub mod service;

pub use auth::credential::{BcryptHasher, CredentialHasher, HashError};
pub use auth::gate::AuthorizationGate;
pub use auth::identity::IdentityResolver;
pub use auth::ownership::OwnershipVerifier;
pub use auth::session::{SessionStore, SessionToken, SqliteSessionStore, DEFAULT_SESSION_TTL};
pub use auth::{AccessError, Caller};
pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use error::{BoardError, BoardResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::board::{Board, Card, CascadeReport, TaskList};
pub use model::hierarchy::{BoardId, CardId, EntityKind, EntityRef, ListId, SiblingSet, UserId};
pub use model::user::User;
pub use model::validation::{parse_entity_id, ValidationError};
pub use repo::board_repo::{BoardRepository, MoveOutcome, SqliteBoardRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{HierarchyLookup, RepoError, RepoResult};
pub use service::account_service::{AccountService, LoginSession};
pub use service::hierarchy_service::HierarchyService;
pub use service::scope::ExclusiveScopes;

pub use rusqlite::Connection;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
