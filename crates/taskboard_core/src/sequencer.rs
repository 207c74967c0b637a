//! Position sequencing for sibling lists and cards.
//!
//! # Responsibility
//! - Turn a caller's rank hint into concrete ordering keys.
//! - Report only the sibling keys that must change, so writes stay minimal.
//!
//! # Invariants
//! - Keys are 1-based and dense (`1..=n`) after every plan is applied.
//! - Sibling order is `position ASC, id ASC`; the id tiebreak keeps legacy
//!   duplicates deterministic until the next write renumbers them.
//! - A requested rank below 1 prepends; above the sibling count appends.
//! - Planning the entity's current rank yields an empty plan.
//!
//! Functions here are pure. Callers run them inside the exclusive scope of
//! the sibling set and persist the result in one transaction.

use serde::Serialize;
use std::cmp::Ordering;
use uuid::Uuid;

/// Key assigned to the first sibling of any parent.
pub const FIRST_POSITION: i64 = 1;

/// One sibling and its ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiblingSlot {
    pub id: Uuid,
    pub position: i64,
}

impl SiblingSlot {
    pub fn new(id: Uuid, position: i64) -> Self {
        Self { id, position }
    }
}

/// Outcome of placing one entity into a sibling sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Key the placed entity must carry.
    pub position: i64,
    /// Other siblings whose key changes, with their new key.
    pub displaced: Vec<SiblingSlot>,
}

impl Placement {
    /// True when applying this placement would not change any stored key.
    pub fn is_noop(&self, current_position: i64) -> bool {
        self.displaced.is_empty() && self.position == current_position
    }
}

/// Canonical sibling comparison: key first, then id.
pub fn compare_slots(left: &SiblingSlot, right: &SiblingSlot) -> Ordering {
    left.position
        .cmp(&right.position)
        .then_with(|| left.id.cmp(&right.id))
}

/// Converts a 1-based rank hint into an insertion index among `len` siblings.
pub fn target_index(requested: Option<i64>, len: usize) -> usize {
    match requested {
        None => len,
        Some(rank) if rank < FIRST_POSITION => 0,
        Some(rank) => usize::try_from(rank - FIRST_POSITION)
            .unwrap_or(usize::MAX)
            .min(len),
    }
}

/// Plans placing `entity` at rank `requested` among `siblings`.
///
/// `siblings` may or may not already contain `entity`; if it does, the
/// entity's current slot is removed first, which makes this both the
/// insert-on-create and the reorder-within-parent planner.
pub fn place(siblings: &[SiblingSlot], entity: Uuid, requested: Option<i64>) -> Placement {
    let mut ordered: Vec<SiblingSlot> = siblings
        .iter()
        .copied()
        .filter(|slot| slot.id != entity)
        .collect();
    ordered.sort_by(compare_slots);

    let index = target_index(requested, ordered.len());
    let mut displaced = Vec::new();
    let mut position = FIRST_POSITION;

    let sequence = ordered[..index]
        .iter()
        .map(Some)
        .chain(std::iter::once(None))
        .chain(ordered[index..].iter().map(Some));
    for (rank, slot) in sequence.enumerate() {
        let key = FIRST_POSITION + rank as i64;
        match slot {
            None => position = key,
            Some(slot) if slot.position != key => displaced.push(SiblingSlot::new(slot.id, key)),
            Some(_) => {}
        }
    }

    Placement {
        position,
        displaced,
    }
}

/// Plans the renumbering that closes the gap left by `removed`.
///
/// Returns the remaining siblings whose key changes.
pub fn close_gap(siblings: &[SiblingSlot], removed: Uuid) -> Vec<SiblingSlot> {
    let mut remaining: Vec<SiblingSlot> = siblings
        .iter()
        .copied()
        .filter(|slot| slot.id != removed)
        .collect();
    remaining.sort_by(compare_slots);

    remaining
        .into_iter()
        .enumerate()
        .filter_map(|(rank, slot)| {
            let key = FIRST_POSITION + rank as i64;
            (slot.position != key).then(|| SiblingSlot::new(slot.id, key))
        })
        .collect()
}

/// True when keys are unique and dense from `FIRST_POSITION`.
pub fn is_dense(siblings: &[SiblingSlot]) -> bool {
    let mut keys: Vec<i64> = siblings.iter().map(|slot| slot.position).collect();
    keys.sort_unstable();
    keys.iter()
        .enumerate()
        .all(|(rank, key)| *key == FIRST_POSITION + rank as i64)
}
