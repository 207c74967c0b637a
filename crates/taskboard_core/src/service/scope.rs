//! Per-sibling-set exclusive scopes.
//!
//! # Invariants
//! - One mutex per live `SiblingSet`; disjoint sets never contend.
//! - A single `acquire` call locks its sets in ascending `SiblingSet` order,
//!   which puts board scopes before list scopes.
//! - Idle entries are pruned lazily, so the registry does not grow with the
//!   number of parents ever touched.

use crate::model::hierarchy::SiblingSet;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide registry of sibling-set locks.
///
/// Share one instance (behind `Arc`) between every service that writes to
/// the same database.
#[derive(Debug, Default)]
pub struct ExclusiveScopes {
    locks: Mutex<HashMap<SiblingSet, Arc<Mutex<()>>>>,
}

/// Held scopes; released on drop, after commit or rollback.
pub struct ScopeGuard {
    _guards: Vec<ArcMutexGuard<RawMutex, ()>>,
}

impl ExclusiveScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until every scope in `sets` is held by the caller.
    pub fn acquire(&self, sets: impl IntoIterator<Item = SiblingSet>) -> ScopeGuard {
        let mut sets: Vec<SiblingSet> = sets.into_iter().collect();
        sets.sort();
        sets.dedup();

        let handles: Vec<Arc<Mutex<()>>> = {
            let mut locks = self.locks.lock();
            locks.retain(|_, handle| Arc::strong_count(handle) > 1);
            sets.iter()
                .map(|set| Arc::clone(locks.entry(*set).or_default()))
                .collect()
        };

        ScopeGuard {
            _guards: handles.iter().map(|handle| handle.lock_arc()).collect(),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}
