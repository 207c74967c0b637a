//! Password hashing collaborator.
//!
//! Stored credentials are standard bcrypt strings (`$2b$<cost>$...`), so the
//! cost travels with each hash and can be raised without invalidating old
//! accounts.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Cheapest cost bcrypt accepts.
pub const MIN_HASH_COST: u32 = 4;
/// Most expensive cost bcrypt accepts.
pub const MAX_HASH_COST: u32 = 31;
pub const DEFAULT_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Hashing failed before producing an encoded credential.
#[derive(Debug)]
pub struct HashError(bcrypt::BcryptError);

impl Display for HashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "credential hashing failed: {}", self.0)
    }
}

impl Error for HashError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Produces and checks opaque credential hashes.
pub trait CredentialHasher {
    fn hash(&self, secret: &str) -> Result<String, HashError>;
    /// Returns false for a wrong secret and for any malformed encoding.
    fn verify(&self, secret: &str, encoded: &str) -> bool;
}

/// bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Clamps `cost` into the range bcrypt accepts.
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_HASH_COST, MAX_HASH_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::with_cost(DEFAULT_HASH_COST)
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, secret: &str) -> Result<String, HashError> {
        bcrypt::hash(secret, self.cost).map_err(HashError)
    }

    fn verify(&self, secret: &str, encoded: &str) -> bool {
        bcrypt::verify(secret, encoded).unwrap_or(false)
    }
}
