//! Board hierarchy lifecycle service.
//!
//! # Responsibility
//! - Verify ownership of every target (and of every move destination).
//! - Hold the exclusive scope of each sibling set an operation renumbers.
//! - Translate lower-layer outcomes into `BoardError` and log them.
//!
//! # Invariants
//! - Scopes are taken after ownership checks and before the storage
//!   transaction, and released only after commit or rollback.
//! - Lock contention (`Busy`) is retried once; everything else surfaces.
//!   Creates fix the new id before the first attempt, so a retry of a create
//!   that did commit returns the same entity instead of a second one.
//! - Field-only updates never change parent or position.

use crate::auth::ownership::{OwnershipVerifier, MAX_CHAIN_HOPS};
use crate::auth::Caller;
use crate::error::{BoardError, BoardResult};
use crate::model::board::{Board, Card, CascadeReport, TaskList};
use crate::model::hierarchy::{
    format_chain, BoardId, CardId, EntityKind, EntityRef, ListId, ParentRef, SiblingSet,
};
use crate::model::validation::{normalize_optional, normalize_required};
use crate::repo::board_repo::{BoardRepository, MoveOutcome};
use crate::repo::RepoResult;
use crate::service::scope::ExclusiveScopes;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Lifecycle facade over a `BoardRepository`.
pub struct HierarchyService<R: BoardRepository> {
    repo: R,
    scopes: Arc<ExclusiveScopes>,
}

impl<R: BoardRepository> HierarchyService<R> {
    /// Creates service from repository and the shared scope registry.
    pub fn new(repo: R, scopes: Arc<ExclusiveScopes>) -> Self {
        Self { repo, scopes }
    }

    /// Creates one board owned by the caller.
    pub fn create_board(
        &self,
        caller: &Caller,
        name: &str,
        description: Option<&str>,
    ) -> BoardResult<Board> {
        self.observe("board_create", None, || {
            let name = normalize_required(name, "name")?;
            let description = normalize_optional(description);
            let board =
                self.repo
                    .create_board(caller.user_id(), &name, description.as_deref())?;
            info!(
                "event=board_create module=hierarchy status=ok board={} owner={}",
                board.id, board.owner_id
            );
            Ok(board)
        })
    }

    pub fn get_board(&self, caller: &Caller, id: BoardId) -> BoardResult<Board> {
        let target = EntityRef::board(id);
        self.observe("board_get", Some(target), || {
            self.authorize(caller, target)?;
            self.repo
                .get_board(id)?
                .ok_or(BoardError::NotFound(target))
        })
    }

    /// Lists the caller's boards, oldest first.
    pub fn list_boards(&self, caller: &Caller) -> BoardResult<Vec<Board>> {
        self.observe("board_list", None, || {
            Ok(self.repo.list_boards(caller.user_id())?)
        })
    }

    /// Updates name and/or description. `None` keeps the current value; an
    /// empty description clears it.
    pub fn update_board(
        &self,
        caller: &Caller,
        id: BoardId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> BoardResult<Board> {
        let target = EntityRef::board(id);
        self.observe("board_update", Some(target), || {
            self.authorize(caller, target)?;
            let current = self
                .repo
                .get_board(id)?
                .ok_or(BoardError::NotFound(target))?;
            let name = match name {
                Some(name) => normalize_required(name, "name")?,
                None => current.name,
            };
            let description = match description {
                Some(description) => normalize_optional(Some(description)),
                None => current.description,
            };
            Ok(self
                .repo
                .update_board(id, &name, description.as_deref())?)
        })
    }

    /// Deletes a board with all its lists and cards.
    pub fn delete_board(&self, caller: &Caller, id: BoardId) -> BoardResult<CascadeReport> {
        let target = EntityRef::board(id);
        self.observe("board_delete", Some(target), || {
            self.authorize(caller, target)?;
            let started = Instant::now();
            let _board_scope = self.scopes.acquire([SiblingSet::Board(id)]);
            let lists = self.repo.list_lists(id)?;
            let _list_scopes = self
                .scopes
                .acquire(lists.iter().map(|list| SiblingSet::List(list.id)));

            let report = self.retry_once("board_delete", || self.repo.delete_board(id))?;
            info!(
                "event=board_delete module=hierarchy status=ok board={} lists={} cards={} duration_ms={}",
                id,
                report.lists,
                report.cards,
                started.elapsed().as_millis()
            );
            Ok(report)
        })
    }

    /// Creates one list at rank `position` (append when `None`).
    pub fn create_list(
        &self,
        caller: &Caller,
        board_id: BoardId,
        name: &str,
        position: Option<i64>,
    ) -> BoardResult<TaskList> {
        let parent = EntityRef::board(board_id);
        self.observe("list_create", Some(parent), || {
            let name = normalize_required(name, "name")?;
            self.authorize(caller, parent)?;
            let _scope = self.scopes.acquire([SiblingSet::Board(board_id)]);
            let id = Uuid::new_v4();
            let list = self.retry_once("list_create", || {
                self.repo.create_list(id, board_id, &name, position)
            })?;
            info!(
                "event=list_create module=hierarchy status=ok list={} board={} position={}",
                list.id, board_id, list.position
            );
            Ok(list)
        })
    }

    pub fn get_list(&self, caller: &Caller, id: ListId) -> BoardResult<TaskList> {
        let target = EntityRef::list(id);
        self.observe("list_get", Some(target), || {
            self.authorize(caller, target)?;
            self.repo
                .get_list(id)?
                .ok_or(BoardError::NotFound(target))
        })
    }

    /// Lists a board's lists in sibling order.
    pub fn list_lists(&self, caller: &Caller, board_id: BoardId) -> BoardResult<Vec<TaskList>> {
        let parent = EntityRef::board(board_id);
        self.observe("list_list", Some(parent), || {
            self.authorize(caller, parent)?;
            Ok(self.repo.list_lists(board_id)?)
        })
    }

    pub fn rename_list(&self, caller: &Caller, id: ListId, name: &str) -> BoardResult<TaskList> {
        let target = EntityRef::list(id);
        self.observe("list_rename", Some(target), || {
            let name = normalize_required(name, "name")?;
            self.authorize(caller, target)?;
            Ok(self.repo.rename_list(id, &name)?)
        })
    }

    /// Reorders a list, optionally into another board the caller owns.
    pub fn move_list(
        &self,
        caller: &Caller,
        id: ListId,
        destination: Option<BoardId>,
        position: Option<i64>,
    ) -> BoardResult<TaskList> {
        let target = EntityRef::list(id);
        self.observe("list_move", Some(target), || {
            self.relocate(caller, target, destination, position)?;
            self.repo
                .get_list(id)?
                .ok_or(BoardError::NotFound(target))
        })
    }

    /// Deletes a list with its cards and closes the gap among its siblings.
    pub fn delete_list(&self, caller: &Caller, id: ListId) -> BoardResult<CascadeReport> {
        let target = EntityRef::list(id);
        self.observe("list_delete", Some(target), || {
            let chain = self.authorize(caller, target)?;
            let board_id = parent_in_chain(&chain)?;
            let _scope = self
                .scopes
                .acquire([SiblingSet::Board(board_id), SiblingSet::List(id)]);

            let report = self.retry_once("list_delete", || self.repo.delete_list(id))?;
            info!(
                "event=list_delete module=hierarchy status=ok list={} board={} cards={}",
                id, board_id, report.cards
            );
            Ok(report)
        })
    }

    /// Creates one card at rank `position` (append when `None`).
    pub fn create_card(
        &self,
        caller: &Caller,
        list_id: ListId,
        title: &str,
        description: Option<&str>,
        position: Option<i64>,
    ) -> BoardResult<Card> {
        let parent = EntityRef::list(list_id);
        self.observe("card_create", Some(parent), || {
            let title = normalize_required(title, "title")?;
            let description = normalize_optional(description);
            self.authorize(caller, parent)?;
            let _scope = self.scopes.acquire([SiblingSet::List(list_id)]);
            let id = Uuid::new_v4();
            let card = self.retry_once("card_create", || {
                self.repo
                    .create_card(id, list_id, &title, description.as_deref(), position)
            })?;
            info!(
                "event=card_create module=hierarchy status=ok card={} list={} position={}",
                card.id, list_id, card.position
            );
            Ok(card)
        })
    }

    pub fn get_card(&self, caller: &Caller, id: CardId) -> BoardResult<Card> {
        let target = EntityRef::card(id);
        self.observe("card_get", Some(target), || {
            self.authorize(caller, target)?;
            self.repo
                .get_card(id)?
                .ok_or(BoardError::NotFound(target))
        })
    }

    /// Lists a list's cards in sibling order.
    pub fn list_cards(&self, caller: &Caller, list_id: ListId) -> BoardResult<Vec<Card>> {
        let parent = EntityRef::list(list_id);
        self.observe("card_list", Some(parent), || {
            self.authorize(caller, parent)?;
            Ok(self.repo.list_cards(list_id)?)
        })
    }

    /// Updates title and/or description with the same rules as `update_board`.
    pub fn update_card(
        &self,
        caller: &Caller,
        id: CardId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> BoardResult<Card> {
        let target = EntityRef::card(id);
        self.observe("card_update", Some(target), || {
            self.authorize(caller, target)?;
            let current = self
                .repo
                .get_card(id)?
                .ok_or(BoardError::NotFound(target))?;
            let title = match title {
                Some(title) => normalize_required(title, "title")?,
                None => current.title,
            };
            let description = match description {
                Some(description) => normalize_optional(Some(description)),
                None => current.description,
            };
            Ok(self
                .repo
                .update_card(id, &title, description.as_deref())?)
        })
    }

    /// Reorders a card, optionally into another list the caller owns.
    pub fn move_card(
        &self,
        caller: &Caller,
        id: CardId,
        destination: Option<ListId>,
        position: Option<i64>,
    ) -> BoardResult<Card> {
        let target = EntityRef::card(id);
        self.observe("card_move", Some(target), || {
            self.relocate(caller, target, destination, position)?;
            self.repo
                .get_card(id)?
                .ok_or(BoardError::NotFound(target))
        })
    }

    pub fn delete_card(&self, caller: &Caller, id: CardId) -> BoardResult<CascadeReport> {
        let target = EntityRef::card(id);
        self.observe("card_delete", Some(target), || {
            let chain = self.authorize(caller, target)?;
            let list_id = parent_in_chain(&chain)?;
            let _scope = self.scopes.acquire([SiblingSet::List(list_id)]);

            let report = self.retry_once("card_delete", || self.repo.delete_card(id))?;
            info!(
                "event=card_delete module=hierarchy status=ok card={} list={}",
                id, list_id
            );
            Ok(report)
        })
    }

    /// Shared move path for lists and cards.
    ///
    /// The caller must own the entity and, when the parent changes, the
    /// destination parent as well.
    fn relocate(
        &self,
        caller: &Caller,
        target: EntityRef,
        destination: Option<Uuid>,
        position: Option<i64>,
    ) -> BoardResult<MoveOutcome> {
        let chain = self.authorize(caller, target)?;
        let source = parent_in_chain(&chain)?;
        let destination = destination.filter(|parent| *parent != source);
        let parent_kind = target
            .kind
            .parent_kind()
            .ok_or_else(|| BoardError::Internal(format!("{target} has no sibling ordering")))?;

        if let Some(parent) = destination {
            self.authorize(
                caller,
                EntityRef {
                    kind: parent_kind,
                    id: parent,
                },
            )?;
        }

        let scope_of = |parent: Uuid| {
            SiblingSet::of_parent(EntityRef {
                kind: parent_kind,
                id: parent,
            })
        };
        let _scope = self.scopes.acquire(
            [source, destination.unwrap_or(source)]
                .into_iter()
                .filter_map(scope_of),
        );

        let op = match target.kind {
            EntityKind::Card => "card_move",
            _ => "list_move",
        };
        let outcome = self.retry_once(op, || self.repo.move_child(target, destination, position))?;
        if outcome.changed {
            info!(
                "event={} module=hierarchy status=ok entity={} from={} to={} position={}",
                op, target, outcome.from, outcome.to, outcome.position
            );
        } else {
            debug!(
                "event={} module=hierarchy status=noop entity={} position={}",
                op, target, outcome.position
            );
        }
        Ok(outcome)
    }

    fn authorize(&self, caller: &Caller, target: EntityRef) -> BoardResult<Vec<EntityRef>> {
        Ok(OwnershipVerifier::new(&self.repo).verify(caller, target)?)
    }

    fn retry_once<T>(
        &self,
        op: &'static str,
        mut attempt: impl FnMut() -> RepoResult<T>,
    ) -> RepoResult<T> {
        match attempt() {
            Err(err) if err.is_busy() => {
                warn!("event={op} module=hierarchy status=retry reason=busy");
                attempt()
            }
            other => other,
        }
    }

    /// Runs one operation and logs its failure by kind.
    fn observe<T>(
        &self,
        op: &'static str,
        target: Option<EntityRef>,
        body: impl FnOnce() -> BoardResult<T>,
    ) -> BoardResult<T> {
        let result = body();
        if let Err(err) = &result {
            let chain = target
                .map(|target| self.chain_for_log(target))
                .unwrap_or_else(|| "-".to_string());
            match err {
                BoardError::Internal(detail) => error!(
                    "event={op} module=hierarchy status=error kind=internal chain={chain} detail={detail}"
                ),
                BoardError::Conflict => {
                    warn!("event={op} module=hierarchy status=error kind=conflict chain={chain}")
                }
                BoardError::Forbidden(_) => {
                    warn!("event={op} module=hierarchy status=rejected kind=forbidden chain={chain}")
                }
                other => debug!(
                    "event={op} module=hierarchy status=rejected kind={} target={chain}",
                    other.kind()
                ),
            }
        }
        result
    }

    /// Best-effort ancestor chain for diagnostics; stops at the first gap.
    fn chain_for_log(&self, target: EntityRef) -> String {
        let mut chain = vec![target];
        let mut current = target;
        for _ in 0..MAX_CHAIN_HOPS {
            match self.repo.parent_of(current) {
                Ok(Some(ParentRef::Entity(parent))) => {
                    chain.push(parent);
                    current = parent;
                }
                _ => break,
            }
        }
        format_chain(&chain)
    }
}

fn parent_in_chain(chain: &[EntityRef]) -> BoardResult<Uuid> {
    chain.get(1).map(|parent| parent.id).ok_or_else(|| {
        BoardError::Internal(format!(
            "ownership chain {} has no parent hop",
            format_chain(chain)
        ))
    })
}
