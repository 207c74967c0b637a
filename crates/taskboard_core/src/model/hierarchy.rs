//! Typed references along the ownership chain.
//!
//! # Invariants
//! - A card's parent is always a list, a list's parent is always a board,
//!   and a board's parent is always its owning user.
//! - `SiblingSet` ordering puts every board scope before every list scope;
//!   lock acquisition relies on this.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type UserId = Uuid;
pub type BoardId = Uuid;
pub type ListId = Uuid;
pub type CardId = Uuid;

/// Kind of an owned entity in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Board,
    List,
    Card,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::List => "list",
            Self::Card => "card",
        }
    }

    /// Kind of the entity one hop up the chain. `None` means the parent is a user.
    pub fn parent_kind(self) -> Option<EntityKind> {
        match self {
            Self::Board => None,
            Self::List => Some(Self::Board),
            Self::Card => Some(Self::List),
        }
    }
}

/// Reference to one board, list or card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityRef {
    pub fn board(id: BoardId) -> Self {
        Self {
            kind: EntityKind::Board,
            id,
        }
    }

    pub fn list(id: ListId) -> Self {
        Self {
            kind: EntityKind::List,
            id,
        }
    }

    pub fn card(id: CardId) -> Self {
        Self {
            kind: EntityKind::Card,
            id,
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// One hop up the ownership chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// Containing board or list.
    Entity(EntityRef),
    /// Owning user; terminates the chain.
    Owner(UserId),
}

/// Sibling sequence sharing one ordering key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SiblingSet {
    /// Lists of one board.
    Board(BoardId),
    /// Cards of one list.
    List(ListId),
}

impl SiblingSet {
    /// Sibling set that holds children of `parent`, if that kind has ordered children.
    pub fn of_parent(parent: EntityRef) -> Option<Self> {
        match parent.kind {
            EntityKind::Board => Some(Self::Board(parent.id)),
            EntityKind::List => Some(Self::List(parent.id)),
            EntityKind::Card => None,
        }
    }

    pub fn parent(self) -> EntityRef {
        match self {
            Self::Board(id) => EntityRef::board(id),
            Self::List(id) => EntityRef::list(id),
        }
    }
}

impl Display for SiblingSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "children_of({})", self.parent())
    }
}

/// Renders a chain as `card:..>list:..>board:..` for diagnostics.
pub fn format_chain(chain: &[EntityRef]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(">")
}

#[cfg(test)]
mod tests {
    use super::{format_chain, EntityKind, EntityRef, SiblingSet};
    use uuid::Uuid;

    #[test]
    fn parent_kinds_follow_fixed_depth_chain() {
        assert_eq!(EntityKind::Card.parent_kind(), Some(EntityKind::List));
        assert_eq!(EntityKind::List.parent_kind(), Some(EntityKind::Board));
        assert_eq!(EntityKind::Board.parent_kind(), None);
    }

    #[test]
    fn board_scopes_sort_before_list_scopes() {
        let high = Uuid::from_u128(u128::MAX);
        let low = Uuid::from_u128(1);
        assert!(SiblingSet::Board(high) < SiblingSet::List(low));
    }

    #[test]
    fn cards_have_no_sibling_set() {
        assert_eq!(SiblingSet::of_parent(EntityRef::card(Uuid::nil())), None);
        assert_eq!(
            SiblingSet::of_parent(EntityRef::list(Uuid::nil())),
            Some(SiblingSet::List(Uuid::nil()))
        );
    }

    #[test]
    fn chain_formatting_joins_hops() {
        let card = EntityRef::card(Uuid::nil());
        let list = EntityRef::list(Uuid::nil());
        let rendered = format_chain(&[card, list]);
        assert_eq!(rendered, format!("card:{0}>list:{0}", Uuid::nil()));
    }
}
