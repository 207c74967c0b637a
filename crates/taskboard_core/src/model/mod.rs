//! Task-board domain model.
//!
//! # Responsibility
//! - Define the User → Board → List → Card records used by core logic.
//! - Describe the containment chain in typed form (`EntityRef`, `ParentRef`).
//! - Own field-level validation rules shared by repositories and services.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID that is never reused.
//! - Deletion is a soft-delete tombstone; a deleted entity never returns to active.
//! - The containment depth is fixed at four levels.

pub mod board;
pub mod hierarchy;
pub mod user;
pub mod validation;
