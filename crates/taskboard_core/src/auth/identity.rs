//! Credential to caller resolution.

use crate::auth::session::SessionStore;
use crate::auth::{AccessError, Caller};
use crate::repo::user_repo::UserRepository;
use log::{debug, warn};

/// Maps an opaque session credential to a stable `Caller`.
pub struct IdentityResolver<S, U> {
    sessions: S,
    users: U,
}

impl<S: SessionStore, U: UserRepository> IdentityResolver<S, U> {
    pub fn new(sessions: S, users: U) -> Self {
        Self { sessions, users }
    }

    /// Resolves `credential` or signals `Unauthenticated`.
    ///
    /// Read-only; a credential whose user no longer exists is treated
    /// exactly like an unknown one.
    pub fn resolve(&self, credential: Option<&str>) -> Result<Caller, AccessError> {
        let Some(credential) = credential.map(str::trim).filter(|value| !value.is_empty())
        else {
            debug!("event=identity_resolve module=auth status=rejected reason=missing");
            return Err(AccessError::Unauthenticated);
        };

        let Some(user_id) = self.sessions.resolve(credential)? else {
            debug!("event=identity_resolve module=auth status=rejected reason=unknown_or_expired");
            return Err(AccessError::Unauthenticated);
        };

        if self.users.get_user(user_id)?.is_none() {
            warn!(
                "event=identity_resolve module=auth status=rejected reason=stale_user user={}",
                user_id
            );
            return Err(AccessError::Unauthenticated);
        }

        Ok(Caller::new(user_id))
    }
}
