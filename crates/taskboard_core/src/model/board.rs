//! Board, list and card read models.
//!
//! # Invariants
//! - `position` orders siblings ascending; ties never survive a committed write.
//! - `name`/`title` are trimmed and non-empty.
//! - Soft-deleted rows are never returned by default reads.

use crate::model::hierarchy::{BoardId, CardId, EntityRef, ListId, UserId};
use serde::{Deserialize, Serialize};

/// Top-level container owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub is_deleted: bool,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Ordered column of cards inside one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: ListId,
    pub board_id: BoardId,
    pub name: String,
    /// 1-based ordering key among the board's lists.
    pub position: i64,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Work item inside one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub list_id: ListId,
    pub title: String,
    pub description: Option<String>,
    /// 1-based ordering key among the list's cards.
    pub position: i64,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Board {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::board(self.id)
    }
}

impl TaskList {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::list(self.id)
    }
}

impl Card {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::card(self.id)
    }
}

/// Rows soft-deleted by one cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub boards: usize,
    pub lists: usize,
    pub cards: usize,
}
