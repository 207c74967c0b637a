//! Account registration and session lifecycle.
//!
//! # Invariants
//! - Unknown email and wrong password are one indistinguishable outcome.
//! - Passwords and credentials never reach the log.

use crate::auth::credential::CredentialHasher;
use crate::auth::session::{SessionStore, SessionToken};
use crate::auth::Caller;
use crate::error::{BoardError, BoardResult};
use crate::model::user::User;
use crate::model::validation::{normalize_email, normalize_required, validate_password};
use crate::repo::user_repo::UserRepository;
use log::{info, warn};

/// Successful login: the account and its fresh credential.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub token: SessionToken,
}

/// Account facade over user storage, sessions and the password hasher.
pub struct AccountService<U, S, H> {
    users: U,
    sessions: S,
    hasher: H,
}

impl<U: UserRepository, S: SessionStore, H: CredentialHasher> AccountService<U, S, H> {
    pub fn new(users: U, sessions: S, hasher: H) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// Registers a new account. Duplicate email is a validation failure.
    pub fn register(&self, name: &str, email: &str, password: &str) -> BoardResult<User> {
        let name = normalize_required(name, "name")?;
        let email = normalize_email(email)?;
        validate_password(password)?;

        let encoded = self.hasher.hash(password)?;
        let user = self.users.create_user(&name, &email, &encoded)?;
        info!("event=account_register module=account status=ok user={}", user.id);
        Ok(user)
    }

    /// Checks the password and issues a fresh session credential.
    pub fn login(&self, email: &str, password: &str) -> BoardResult<LoginSession> {
        let Ok(email) = normalize_email(email) else {
            return Err(BoardError::Unauthenticated);
        };
        let user = match self.users.find_by_email(&email)? {
            Some(user) if self.hasher.verify(password, &user.credential_hash) => user,
            _ => {
                warn!("event=account_login module=account status=rejected");
                return Err(BoardError::Unauthenticated);
            }
        };

        let token = self.sessions.issue(user.id)?;
        info!("event=account_login module=account status=ok user={}", user.id);
        Ok(LoginSession { user, token })
    }

    /// Revokes a credential. Repeating it is harmless.
    pub fn logout(&self, credential: &str) -> BoardResult<()> {
        let revoked = self.sessions.invalidate(credential.trim())?;
        info!(
            "event=account_logout module=account status=ok revoked={}",
            revoked
        );
        Ok(())
    }

    /// Returns the caller's own account.
    pub fn me(&self, caller: &Caller) -> BoardResult<User> {
        self.users
            .get_user(caller.user_id())?
            .ok_or(BoardError::Unauthenticated)
    }

    /// Drops expired sessions. Returns removed count.
    pub fn purge_expired_sessions(&self) -> BoardResult<usize> {
        let removed = self.sessions.purge_expired()?;
        if removed > 0 {
            info!(
                "event=session_purge module=account status=ok removed={}",
                removed
            );
        }
        Ok(removed)
    }
}
