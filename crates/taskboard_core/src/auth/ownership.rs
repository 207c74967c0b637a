//! Ownership verification by containment-chain traversal.
//!
//! # Invariants
//! - Ownership is re-derived on every call; nothing is cached.
//! - A missing hop anywhere in the chain reports `NotFound` for the original
//!   target, so absence of an ancestor never leaks as a different outcome.
//! - The walk is bounded by `MAX_CHAIN_HOPS`.

use crate::auth::{AccessError, Caller};
use crate::model::hierarchy::{EntityKind, EntityRef, ParentRef};
use crate::repo::HierarchyLookup;

/// Card → list → board → owner.
pub const MAX_CHAIN_HOPS: usize = 3;

/// Generic verifier over any per-kind parent lookup.
pub struct OwnershipVerifier<L> {
    lookup: L,
}

impl<L: HierarchyLookup> OwnershipVerifier<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Confirms `caller` owns `target`.
    ///
    /// Returns the walked chain, target first and board last.
    pub fn verify(&self, caller: &Caller, target: EntityRef) -> Result<Vec<EntityRef>, AccessError> {
        let mut chain = vec![target];
        let mut current = target;

        for _ in 0..MAX_CHAIN_HOPS {
            match self.lookup.parent_of(current)? {
                None => return Err(AccessError::NotFound(target)),
                Some(ParentRef::Owner(owner)) => {
                    if current.kind != EntityKind::Board {
                        return Err(AccessError::BrokenChain {
                            chain,
                            detail: format!("{} reported an owner", current.kind.as_str()),
                        });
                    }
                    if owner != caller.user_id() {
                        return Err(AccessError::Forbidden(target));
                    }
                    return Ok(chain);
                }
                Some(ParentRef::Entity(parent)) => {
                    if current.kind.parent_kind() != Some(parent.kind) {
                        return Err(AccessError::BrokenChain {
                            chain,
                            detail: format!(
                                "{} cannot contain {}",
                                parent.kind.as_str(),
                                current.kind.as_str()
                            ),
                        });
                    }
                    chain.push(parent);
                    current = parent;
                }
            }
        }

        Err(AccessError::BrokenChain {
            chain,
            detail: format!("no owner within {MAX_CHAIN_HOPS} hops"),
        })
    }
}
