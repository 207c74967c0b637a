//! Board hierarchy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for boards, lists and cards.
//! - Apply `sequencer` plans to sibling sets inside one transaction.
//! - Soft-delete subtrees atomically and prove no live descendant remains.
//!
//! # Invariants
//! - Sibling listing is deterministic: `position ASC, uuid ASC`.
//! - Creates and moves re-check parent liveness inside their transaction, so
//!   nothing attaches to a parent deleted by a concurrent cascade.
//! - A cascade that leaves live descendants is rolled back and reported as
//!   `RepoError::CascadeIncomplete`.
//! - Multi-row writes read back their result before commit, so `Busy` only
//!   ever comes from an attempt that was rolled back.

use crate::model::board::{Board, Card, CascadeReport, TaskList};
use crate::model::hierarchy::{
    BoardId, CardId, EntityKind, EntityRef, ListId, ParentRef, SiblingSet, UserId,
};
use crate::repo::{
    ensure_connection_ready, parse_flag, parse_uuid, HierarchyLookup, RepoError, RepoResult,
};
use crate::sequencer::{self, SiblingSlot};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const BOARD_COLUMNS: &[&str] = &[
    "uuid",
    "owner_uuid",
    "name",
    "description",
    "is_deleted",
    "created_at",
    "updated_at",
];
const LIST_COLUMNS: &[&str] = &[
    "uuid",
    "board_uuid",
    "name",
    "position",
    "is_deleted",
    "created_at",
    "updated_at",
];
const CARD_COLUMNS: &[&str] = &[
    "uuid",
    "list_uuid",
    "title",
    "description",
    "position",
    "is_deleted",
    "created_at",
    "updated_at",
];

const BOARD_SELECT_SQL: &str = "SELECT
    uuid,
    owner_uuid,
    name,
    description,
    is_deleted,
    created_at,
    updated_at
FROM boards";

const LIST_SELECT_SQL: &str = "SELECT
    uuid,
    board_uuid,
    name,
    position,
    is_deleted,
    created_at,
    updated_at
FROM lists";

const CARD_SELECT_SQL: &str = "SELECT
    uuid,
    list_uuid,
    title,
    description,
    position,
    is_deleted,
    created_at,
    updated_at
FROM cards";

/// Storage layout of one ordered child kind.
struct ChildTable {
    kind: EntityKind,
    table: &'static str,
    parent_column: &'static str,
    parent_table: &'static str,
}

const LIST_TABLE: ChildTable = ChildTable {
    kind: EntityKind::List,
    table: "lists",
    parent_column: "board_uuid",
    parent_table: "boards",
};

const CARD_TABLE: ChildTable = ChildTable {
    kind: EntityKind::Card,
    table: "cards",
    parent_column: "list_uuid",
    parent_table: "lists",
};

impl ChildTable {
    fn for_kind(kind: EntityKind) -> Option<&'static ChildTable> {
        match kind {
            EntityKind::Board => None,
            EntityKind::List => Some(&LIST_TABLE),
            EntityKind::Card => Some(&CARD_TABLE),
        }
    }

    fn for_set(set: SiblingSet) -> &'static ChildTable {
        match set {
            SiblingSet::Board(_) => &LIST_TABLE,
            SiblingSet::List(_) => &CARD_TABLE,
        }
    }

    fn sibling_set(&self, parent_id: Uuid) -> SiblingSet {
        match self.kind {
            EntityKind::Card => SiblingSet::List(parent_id),
            _ => SiblingSet::Board(parent_id),
        }
    }
}

/// Result of a reorder or cross-parent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Sibling set the entity left.
    pub from: SiblingSet,
    /// Sibling set the entity now belongs to.
    pub to: SiblingSet,
    /// Key assigned in `to`.
    pub position: i64,
    /// False when the move was a no-op and nothing was written.
    pub changed: bool,
}

/// Repository interface for the board hierarchy.
pub trait BoardRepository: HierarchyLookup {
    /// Creates one board owned by `owner_id`.
    fn create_board(
        &self,
        owner_id: UserId,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<Board>;
    /// Loads one active board.
    fn get_board(&self, id: BoardId) -> RepoResult<Option<Board>>;
    /// Lists active boards of one owner, oldest first.
    fn list_boards(&self, owner_id: UserId) -> RepoResult<Vec<Board>>;
    /// Replaces board name and description.
    fn update_board(
        &self,
        id: BoardId,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<Board>;
    /// Soft-deletes a board with all its lists and cards.
    fn delete_board(&self, id: BoardId) -> RepoResult<CascadeReport>;

    /// Creates list `id` at rank `requested` (append when `None`).
    ///
    /// Replaying a create whose `id` already exists returns the stored list
    /// and writes nothing.
    fn create_list(
        &self,
        id: ListId,
        board_id: BoardId,
        name: &str,
        requested: Option<i64>,
    ) -> RepoResult<TaskList>;
    fn get_list(&self, id: ListId) -> RepoResult<Option<TaskList>>;
    /// Lists active lists of one board in sibling order.
    fn list_lists(&self, board_id: BoardId) -> RepoResult<Vec<TaskList>>;
    fn rename_list(&self, id: ListId, name: &str) -> RepoResult<TaskList>;
    /// Soft-deletes a list with its cards and closes the gap among its siblings.
    fn delete_list(&self, id: ListId) -> RepoResult<CascadeReport>;

    /// Creates card `id` at rank `requested`; replays behave as for lists.
    fn create_card(
        &self,
        id: CardId,
        list_id: ListId,
        title: &str,
        description: Option<&str>,
        requested: Option<i64>,
    ) -> RepoResult<Card>;
    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>>;
    /// Lists active cards of one list in sibling order.
    fn list_cards(&self, list_id: ListId) -> RepoResult<Vec<Card>>;
    fn update_card(&self, id: CardId, title: &str, description: Option<&str>) -> RepoResult<Card>;
    fn delete_card(&self, id: CardId) -> RepoResult<CascadeReport>;

    /// Reorders a list or card, optionally under a new parent.
    ///
    /// `destination = None` keeps the current parent.
    fn move_child(
        &self,
        entity: EntityRef,
        destination: Option<Uuid>,
        requested: Option<i64>,
    ) -> RepoResult<MoveOutcome>;
    /// Reads the ordering keys of one sibling set.
    fn sibling_slots(&self, set: SiblingSet) -> RepoResult<Vec<SiblingSlot>>;
}

/// SQLite-backed board hierarchy repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("boards", BOARD_COLUMNS),
                ("lists", LIST_COLUMNS),
                ("cards", CARD_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl HierarchyLookup for SqliteBoardRepository<'_> {
    fn parent_of(&self, entity: EntityRef) -> RepoResult<Option<ParentRef>> {
        let sql = match entity.kind {
            EntityKind::Board => {
                "SELECT owner_uuid FROM boards WHERE uuid = ?1 AND is_deleted = 0;"
            }
            EntityKind::List => {
                "SELECT board_uuid FROM lists WHERE uuid = ?1 AND is_deleted = 0;"
            }
            EntityKind::Card => {
                "SELECT list_uuid FROM cards WHERE uuid = ?1 AND is_deleted = 0;"
            }
        };
        let parent: Option<String> = self
            .conn
            .query_row(sql, [entity.id.to_string()], |row| row.get(0))
            .optional()?;
        let Some(parent) = parent else {
            return Ok(None);
        };

        let parent_ref = match entity.kind {
            EntityKind::Board => ParentRef::Owner(parse_uuid(&parent, "boards.owner_uuid")?),
            EntityKind::List => {
                ParentRef::Entity(EntityRef::board(parse_uuid(&parent, "lists.board_uuid")?))
            }
            EntityKind::Card => {
                ParentRef::Entity(EntityRef::list(parse_uuid(&parent, "cards.list_uuid")?))
            }
        };
        Ok(Some(parent_ref))
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn create_board(
        &self,
        owner_id: UserId,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<Board> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO boards (uuid, owner_uuid, name, description, is_deleted)
             VALUES (?1, ?2, ?3, ?4, 0);",
            params![id.to_string(), owner_id.to_string(), name, description],
        )?;
        load_required_board(self.conn, id)
    }

    fn get_board(&self, id: BoardId) -> RepoResult<Option<Board>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOARD_SELECT_SQL}
             WHERE uuid = ?1
               AND is_deleted = 0;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_board_row(row)?));
        }
        Ok(None)
    }

    fn list_boards(&self, owner_id: UserId) -> RepoResult<Vec<Board>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOARD_SELECT_SQL}
             WHERE owner_uuid = ?1
               AND is_deleted = 0
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut boards = Vec::new();
        while let Some(row) = rows.next()? {
            boards.push(parse_board_row(row)?);
        }
        Ok(boards)
    }

    fn update_board(
        &self,
        id: BoardId,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<Board> {
        let changed = self.conn.execute(
            "UPDATE boards
             SET name = ?2,
                 description = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![id.to_string(), name, description],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::board(id)));
        }
        load_required_board(self.conn, id)
    }

    fn delete_board(&self, id: BoardId) -> RepoResult<CascadeReport> {
        let root = EntityRef::board(id);
        let tx = self.begin()?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM boards WHERE uuid = ?1 AND is_deleted = 0);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::NotFound(root));
        }

        let cards = tx.execute(
            "UPDATE cards
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE is_deleted = 0
               AND list_uuid IN (
                 SELECT uuid FROM lists WHERE board_uuid = ?1 AND is_deleted = 0
               );",
            [id.to_string()],
        )?;
        let lists = tx.execute(
            "UPDATE lists
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE board_uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        let boards = tx.execute(
            "UPDATE boards
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        ensure_no_live_descendants(&tx, root)?;
        tx.commit()?;
        Ok(CascadeReport {
            boards,
            lists,
            cards,
        })
    }

    fn create_list(
        &self,
        id: ListId,
        board_id: BoardId,
        name: &str,
        requested: Option<i64>,
    ) -> RepoResult<TaskList> {
        let tx = self.begin()?;
        if let Some(existing) = find_list(&tx, id)? {
            return Ok(existing);
        }
        let set = SiblingSet::Board(board_id);
        let position = reserve_position(&tx, set, id, requested)?;
        tx.execute(
            "INSERT INTO lists (uuid, board_uuid, name, position, is_deleted)
             VALUES (?1, ?2, ?3, ?4, 0);",
            params![id.to_string(), board_id.to_string(), name, position],
        )?;
        ensure_dense(&tx, set)?;
        let list = load_required_list(&tx, id)?;
        tx.commit()?;
        Ok(list)
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<TaskList>> {
        find_list(self.conn, id)
    }

    fn list_lists(&self, board_id: BoardId) -> RepoResult<Vec<TaskList>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL}
             WHERE board_uuid = ?1
               AND is_deleted = 0
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(parse_list_row(row)?);
        }
        Ok(lists)
    }

    fn rename_list(&self, id: ListId, name: &str) -> RepoResult<TaskList> {
        let changed = self.conn.execute(
            "UPDATE lists
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::list(id)));
        }
        load_required_list(self.conn, id)
    }

    fn delete_list(&self, id: ListId) -> RepoResult<CascadeReport> {
        let root = EntityRef::list(id);
        let tx = self.begin()?;
        let (board_id, _) =
            child_location(&tx, &LIST_TABLE, id)?.ok_or(RepoError::NotFound(root))?;

        let cards = tx.execute(
            "UPDATE cards
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE list_uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        let lists = tx.execute(
            "UPDATE lists
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        close_gap(&tx, SiblingSet::Board(board_id), id)?;
        ensure_dense(&tx, SiblingSet::Board(board_id))?;

        ensure_no_live_descendants(&tx, root)?;
        tx.commit()?;
        Ok(CascadeReport {
            boards: 0,
            lists,
            cards,
        })
    }

    fn create_card(
        &self,
        id: CardId,
        list_id: ListId,
        title: &str,
        description: Option<&str>,
        requested: Option<i64>,
    ) -> RepoResult<Card> {
        let tx = self.begin()?;
        if let Some(existing) = find_card(&tx, id)? {
            return Ok(existing);
        }
        let set = SiblingSet::List(list_id);
        let position = reserve_position(&tx, set, id, requested)?;
        tx.execute(
            "INSERT INTO cards (uuid, list_uuid, title, description, position, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, 0);",
            params![
                id.to_string(),
                list_id.to_string(),
                title,
                description,
                position
            ],
        )?;
        ensure_dense(&tx, set)?;
        let card = load_required_card(&tx, id)?;
        tx.commit()?;
        Ok(card)
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>> {
        find_card(self.conn, id)
    }

    fn list_cards(&self, list_id: ListId) -> RepoResult<Vec<Card>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CARD_SELECT_SQL}
             WHERE list_uuid = ?1
               AND is_deleted = 0
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([list_id.to_string()])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }

    fn update_card(&self, id: CardId, title: &str, description: Option<&str>) -> RepoResult<Card> {
        let changed = self.conn.execute(
            "UPDATE cards
             SET title = ?2,
                 description = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![id.to_string(), title, description],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::card(id)));
        }
        load_required_card(self.conn, id)
    }

    fn delete_card(&self, id: CardId) -> RepoResult<CascadeReport> {
        let tx = self.begin()?;
        let (list_id, _) = child_location(&tx, &CARD_TABLE, id)?
            .ok_or(RepoError::NotFound(EntityRef::card(id)))?;

        let cards = tx.execute(
            "UPDATE cards
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        close_gap(&tx, SiblingSet::List(list_id), id)?;
        ensure_dense(&tx, SiblingSet::List(list_id))?;

        tx.commit()?;
        Ok(CascadeReport {
            boards: 0,
            lists: 0,
            cards,
        })
    }

    fn move_child(
        &self,
        entity: EntityRef,
        destination: Option<Uuid>,
        requested: Option<i64>,
    ) -> RepoResult<MoveOutcome> {
        let table = ChildTable::for_kind(entity.kind).ok_or_else(|| {
            RepoError::InvalidData(format!("{entity} has no sibling ordering"))
        })?;

        let tx = self.begin()?;
        let (source_parent, current_position) =
            child_location(&tx, table, entity.id)?.ok_or(RepoError::NotFound(entity))?;
        let from = table.sibling_set(source_parent);
        let to = table.sibling_set(destination.unwrap_or(source_parent));
        if from != to {
            ensure_parent_live(&tx, to)?;
        }

        let placement = sequencer::place(&load_slots(&tx, to)?, entity.id, requested);
        if from == to && placement.is_noop(current_position) {
            return Ok(MoveOutcome {
                from,
                to,
                position: current_position,
                changed: false,
            });
        }

        if from != to {
            let remaining = load_slots(&tx, from)?;
            write_positions(&tx, table, &sequencer::close_gap(&remaining, entity.id))?;
            tx.execute(
                &format!(
                    "UPDATE {table}
                     SET {parent_column} = ?2,
                         updated_at = (strftime('%s', 'now') * 1000)
                     WHERE uuid = ?1
                       AND is_deleted = 0;",
                    table = table.table,
                    parent_column = table.parent_column,
                ),
                params![entity.id.to_string(), to.parent().id.to_string()],
            )?;
        }
        write_positions(&tx, table, &placement.displaced)?;
        write_positions(
            &tx,
            table,
            &[SiblingSlot::new(entity.id, placement.position)],
        )?;
        if from != to {
            ensure_dense(&tx, from)?;
        }
        ensure_dense(&tx, to)?;

        tx.commit()?;
        Ok(MoveOutcome {
            from,
            to,
            position: placement.position,
            changed: true,
        })
    }

    fn sibling_slots(&self, set: SiblingSet) -> RepoResult<Vec<SiblingSlot>> {
        load_slots(self.conn, set)
    }
}

/// Checks the parent, plans the insert and shifts displaced siblings.
///
/// Returns the key the new child must be inserted with.
fn reserve_position(
    conn: &Connection,
    set: SiblingSet,
    id: Uuid,
    requested: Option<i64>,
) -> RepoResult<i64> {
    ensure_parent_live(conn, set)?;
    let placement = sequencer::place(&load_slots(conn, set)?, id, requested);
    write_positions(conn, ChildTable::for_set(set), &placement.displaced)?;
    Ok(placement.position)
}

fn close_gap(conn: &Connection, set: SiblingSet, removed: Uuid) -> RepoResult<()> {
    let remaining = load_slots(conn, set)?;
    write_positions(
        conn,
        ChildTable::for_set(set),
        &sequencer::close_gap(&remaining, removed),
    )
}

fn load_slots(conn: &Connection, set: SiblingSet) -> RepoResult<Vec<SiblingSlot>> {
    let table = ChildTable::for_set(set);
    let mut stmt = conn.prepare(&format!(
        "SELECT uuid, position
         FROM {table}
         WHERE {parent_column} = ?1
           AND is_deleted = 0
         ORDER BY position ASC, uuid ASC;",
        table = table.table,
        parent_column = table.parent_column,
    ))?;
    let mut rows = stmt.query([set.parent().id.to_string()])?;
    let mut slots = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get(0)?;
        slots.push(SiblingSlot::new(
            parse_uuid(&id_text, "sibling uuid")?,
            row.get(1)?,
        ));
    }
    Ok(slots)
}

fn write_positions(conn: &Connection, table: &ChildTable, slots: &[SiblingSlot]) -> RepoResult<()> {
    if slots.is_empty() {
        return Ok(());
    }
    let mut stmt = conn.prepare(&format!(
        "UPDATE {table}
         SET position = ?2,
             updated_at = (strftime('%s', 'now') * 1000)
         WHERE uuid = ?1
           AND is_deleted = 0;",
        table = table.table,
    ))?;
    for slot in slots {
        let changed = stmt.execute(params![slot.id.to_string(), slot.position])?;
        if changed != 1 {
            return Err(RepoError::InvalidData(format!(
                "sibling {} of {} vanished during renumbering",
                slot.id, table.table
            )));
        }
    }
    Ok(())
}

/// Rejects a commit that would leave `set` with duplicate or gapped keys.
fn ensure_dense(conn: &Connection, set: SiblingSet) -> RepoResult<()> {
    if sequencer::is_dense(&load_slots(conn, set)?) {
        return Ok(());
    }
    Err(RepoError::InvalidData(format!(
        "sibling keys of {set} are not dense after renumbering"
    )))
}

fn child_location(
    conn: &Connection,
    table: &ChildTable,
    id: Uuid,
) -> RepoResult<Option<(Uuid, i64)>> {
    let row: Option<(String, i64)> = conn
        .query_row(
            &format!(
                "SELECT {parent_column}, position
                 FROM {table}
                 WHERE uuid = ?1
                   AND is_deleted = 0;",
                table = table.table,
                parent_column = table.parent_column,
            ),
            [id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    row.map(|(parent, position)| Ok((parse_uuid(&parent, table.parent_column)?, position)))
        .transpose()
}

fn ensure_parent_live(conn: &Connection, set: SiblingSet) -> RepoResult<()> {
    let table = ChildTable::for_set(set);
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(
                SELECT 1 FROM {parent_table} WHERE uuid = ?1 AND is_deleted = 0
            );",
            parent_table = table.parent_table,
        ),
        [set.parent().id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::ParentNotFound(set.parent()));
    }
    Ok(())
}

fn ensure_no_live_descendants(conn: &Connection, root: EntityRef) -> RepoResult<()> {
    let sql = match root.kind {
        EntityKind::Board => {
            "SELECT
                (SELECT COUNT(*) FROM lists WHERE board_uuid = ?1 AND is_deleted = 0)
                + (SELECT COUNT(*)
                   FROM cards c
                   INNER JOIN lists l ON l.uuid = c.list_uuid
                   WHERE l.board_uuid = ?1
                     AND c.is_deleted = 0);"
        }
        EntityKind::List => {
            "SELECT COUNT(*) FROM cards WHERE list_uuid = ?1 AND is_deleted = 0;"
        }
        EntityKind::Card => return Ok(()),
    };
    let remaining: i64 = conn.query_row(sql, [root.id.to_string()], |row| row.get(0))?;
    if remaining > 0 {
        return Err(RepoError::CascadeIncomplete { root, remaining });
    }
    Ok(())
}

fn load_required_board(conn: &Connection, id: BoardId) -> RepoResult<Board> {
    let mut stmt = conn.prepare(&format!(
        "{BOARD_SELECT_SQL}
         WHERE uuid = ?1
           AND is_deleted = 0;"
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_board_row(row);
    }
    Err(RepoError::NotFound(EntityRef::board(id)))
}

fn find_list(conn: &Connection, id: ListId) -> RepoResult<Option<TaskList>> {
    let mut stmt = conn.prepare(&format!(
        "{LIST_SELECT_SQL}
         WHERE uuid = ?1
           AND is_deleted = 0;"
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_list_row(row)?));
    }
    Ok(None)
}

fn load_required_list(conn: &Connection, id: ListId) -> RepoResult<TaskList> {
    find_list(conn, id)?.ok_or(RepoError::NotFound(EntityRef::list(id)))
}

fn find_card(conn: &Connection, id: CardId) -> RepoResult<Option<Card>> {
    let mut stmt = conn.prepare(&format!(
        "{CARD_SELECT_SQL}
         WHERE uuid = ?1
           AND is_deleted = 0;"
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_card_row(row)?));
    }
    Ok(None)
}

fn load_required_card(conn: &Connection, id: CardId) -> RepoResult<Card> {
    find_card(conn, id)?.ok_or(RepoError::NotFound(EntityRef::card(id)))
}

fn parse_board_row(row: &Row<'_>) -> RepoResult<Board> {
    let id_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_uuid")?;
    Ok(Board {
        id: parse_uuid(&id_text, "boards.uuid")?,
        owner_id: parse_uuid(&owner_text, "boards.owner_uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "boards.is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<TaskList> {
    let id_text: String = row.get("uuid")?;
    let board_text: String = row.get("board_uuid")?;
    Ok(TaskList {
        id: parse_uuid(&id_text, "lists.uuid")?,
        board_id: parse_uuid(&board_text, "lists.board_uuid")?,
        name: row.get("name")?,
        position: row.get("position")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "lists.is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let id_text: String = row.get("uuid")?;
    let list_text: String = row.get("list_uuid")?;
    Ok(Card {
        id: parse_uuid(&id_text, "cards.uuid")?,
        list_id: parse_uuid(&list_text, "cards.list_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        position: row.get("position")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "cards.is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
