//! Runtime configuration from environment variables.
//!
//! # Invariants
//! - Parsing never reads the process environment directly; `from_env` only
//!   supplies `std::env::var` as the lookup.
//! - Blank values are treated as unset.

use crate::auth::session::DEFAULT_SESSION_TTL;
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TASKBOARD_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";
pub const ENV_SESSION_TTL_SECS: &str = "TASKBOARD_SESSION_TTL_SECS";

const DEFAULT_DB_PATH: &str = "taskboard.sqlite3";

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
    pub session_ttl: Duration,
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} `{}`: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level(),
            log_dir: None,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(|reason| ConfigError {
                key: ENV_LOG_LEVEL,
                value: level.clone(),
                reason,
            })?;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            let path = PathBuf::from(&dir);
            if !path.is_absolute() {
                return Err(ConfigError {
                    key: ENV_LOG_DIR,
                    value: dir,
                    reason: "must be an absolute path".to_string(),
                });
            }
            config.log_dir = Some(path);
        }
        if let Some(secs) = read(ENV_SESSION_TTL_SECS) {
            let parsed = secs.parse::<u64>().map_err(|err| ConfigError {
                key: ENV_SESSION_TTL_SECS,
                value: secs.clone(),
                reason: err.to_string(),
            })?;
            config.session_ttl = Duration::from_secs(parsed);
        }

        Ok(config)
    }
}
