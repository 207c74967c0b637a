//! Caller-visible error taxonomy.
//!
//! Lower layers return typed outcomes (`RepoError`, `AccessError`,
//! `ValidationError`); services translate them into `BoardError` without
//! inventing new kinds.

use crate::auth::credential::HashError;
use crate::auth::AccessError;
use crate::model::hierarchy::EntityRef;
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BoardResult<T> = Result<T, BoardError>;

/// Error kinds surfaced by every service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Blank required field, malformed identifier or account rule.
    ValidationFailed(String),
    /// Credential missing, invalid or stale.
    Unauthenticated,
    /// Authenticated but not the owner.
    Forbidden(EntityRef),
    /// Target or an ancestor does not exist.
    NotFound(EntityRef),
    /// Exclusive-scope race survived one automatic retry.
    Conflict,
    /// Storage fault, partial cascade or invariant breach.
    Internal(String),
}

impl BoardError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "validation_failed",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict => "conflict",
            Self::Internal(_) => "internal",
        }
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationFailed(message) => write!(f, "validation failed: {message}"),
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::Forbidden(entity) => write!(f, "access to {entity} is forbidden"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Conflict => write!(f, "concurrent update conflict; retry the operation"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for BoardError {}

impl From<ValidationError> for BoardError {
    fn from(value: ValidationError) -> Self {
        Self::ValidationFailed(value.to_string())
    }
}

impl From<HashError> for BoardError {
    fn from(value: HashError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => err.into(),
            RepoError::NotFound(entity) | RepoError::ParentNotFound(entity) => {
                Self::NotFound(entity)
            }
            RepoError::Busy(_) => Self::Conflict,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AccessError> for BoardError {
    fn from(value: AccessError) -> Self {
        match value {
            AccessError::Unauthenticated => Self::Unauthenticated,
            AccessError::Forbidden(entity) => Self::Forbidden(entity),
            AccessError::NotFound(entity) => Self::NotFound(entity),
            AccessError::Lookup(err) => err.into(),
            broken @ AccessError::BrokenChain { .. } => Self::Internal(broken.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BoardError;
    use crate::auth::AccessError;
    use crate::model::hierarchy::EntityRef;
    use crate::model::validation::ValidationError;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn parent_not_found_surfaces_as_not_found() {
        let board = EntityRef::board(Uuid::nil());
        let err: BoardError = RepoError::ParentNotFound(board).into();
        assert_eq!(err, BoardError::NotFound(board));
    }

    #[test]
    fn cascade_incomplete_is_internal() {
        let err: BoardError = RepoError::CascadeIncomplete {
            root: EntityRef::list(Uuid::nil()),
            remaining: 2,
        }
        .into();
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn broken_chain_is_internal_with_chain() {
        let card = EntityRef::card(Uuid::nil());
        let err: BoardError = AccessError::BrokenChain {
            chain: vec![card],
            detail: "test".to_string(),
        }
        .into();
        match err {
            BoardError::Internal(message) => assert!(message.contains("card:")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validation_keeps_message() {
        let err: BoardError = ValidationError::Blank { field: "name" }.into();
        assert_eq!(err.kind(), "validation_failed");
        assert!(err.to_string().contains("name"));
    }
}
