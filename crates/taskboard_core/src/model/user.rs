//! User account model.
//!
//! # Invariants
//! - `id` and `email` are immutable once created; `email` is unique.
//! - `credential_hash` is opaque here and never serialized.

use crate::model::hierarchy::UserId;
use serde::Serialize;

/// Registered account that owns boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique contact handle, normalized to lowercase.
    pub email: String,
    /// Encoded credential produced by a `CredentialHasher`.
    #[serde(skip_serializing)]
    pub credential_hash: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}
