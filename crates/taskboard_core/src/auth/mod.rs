//! Identity and ownership admission.
//!
//! # Responsibility
//! - Resolve session credentials to a `Caller` (`identity`).
//! - Prove a caller owns a target by walking its containment chain (`ownership`).
//! - Compose both into one admission check (`gate`).
//!
//! # Invariants
//! - A `Caller` can only be produced by a successful credential resolution.
//! - Absent, expired, tampered and stale credentials all yield `Unauthenticated`.

use crate::model::hierarchy::{format_chain, EntityRef, UserId};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod credential;
pub mod gate;
pub mod identity;
pub mod ownership;
pub mod session;

/// Authenticated identity of one request.
///
/// Resolved once per request and passed by reference to every operation,
/// including ownership re-checks on cross-parent moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
}

impl Caller {
    pub(crate) fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Outcomes of identity resolution and ownership verification.
#[derive(Debug)]
pub enum AccessError {
    /// Credential missing, invalid, expired or bound to a vanished user.
    Unauthenticated,
    /// Target exists but is owned by someone else.
    Forbidden(EntityRef),
    /// Target or one of its ancestors is absent.
    NotFound(EntityRef),
    /// Chain shape contradicts the fixed hierarchy.
    BrokenChain {
        chain: Vec<EntityRef>,
        detail: String,
    },
    /// Lookup backend failed.
    Lookup(RepoError),
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::Forbidden(entity) => write!(f, "access to {entity} is forbidden"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::BrokenChain { chain, detail } => write!(
                f,
                "broken ownership chain {}: {detail}",
                format_chain(chain)
            ),
            Self::Lookup(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccessError {
    fn from(value: RepoError) -> Self {
        Self::Lookup(value)
    }
}
