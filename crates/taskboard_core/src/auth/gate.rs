//! Single admission point for entity operations.

use crate::auth::identity::IdentityResolver;
use crate::auth::ownership::OwnershipVerifier;
use crate::auth::session::SessionStore;
use crate::auth::{AccessError, Caller};
use crate::model::hierarchy::EntityRef;
use crate::repo::user_repo::UserRepository;
use crate::repo::HierarchyLookup;

/// Composes identity resolution and ownership verification.
///
/// Identity is always resolved first so an unauthenticated request never
/// learns whether its target exists.
pub struct AuthorizationGate<S, U> {
    identity: IdentityResolver<S, U>,
}

impl<S: SessionStore, U: UserRepository> AuthorizationGate<S, U> {
    pub fn new(identity: IdentityResolver<S, U>) -> Self {
        Self { identity }
    }

    /// Resolves the request identity once; downstream operations reuse it.
    pub fn admit(&self, credential: Option<&str>) -> Result<Caller, AccessError> {
        self.identity.resolve(credential)
    }

    /// Resolves identity and proves ownership of `target` in one step.
    pub fn admit_owner<L: HierarchyLookup>(
        &self,
        credential: Option<&str>,
        lookup: L,
        target: EntityRef,
    ) -> Result<Caller, AccessError> {
        let caller = self.admit(credential)?;
        OwnershipVerifier::new(lookup).verify(&caller, target)?;
        Ok(caller)
    }
}
