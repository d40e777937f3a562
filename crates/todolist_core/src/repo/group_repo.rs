//! Group repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and reorder APIs over `groups` storage.
//! - Own the detach-on-delete step that emulates referential integrity for
//!   soft-deleted groups.
//!
//! # Invariants
//! - All reads are constrained to `deleted_at IS NULL`.
//! - `reorder_groups` and `delete_group` are single transactions; partial
//!   application is never observable.
//! - Groups are never hard-deleted.

use crate::model::group::{validate_group_input, Group, GroupId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const GROUP_SELECT_SQL: &str = "SELECT
    id,
    name,
    color,
    sort_order,
    created_at,
    updated_at,
    deleted_at
FROM groups";

/// Repository interface for group operations.
pub trait GroupRepository {
    /// Lists all non-deleted groups ordered by `sort_order` ascending.
    fn list_groups(&self) -> RepoResult<Vec<Group>>;
    /// Creates a group appended after the current highest sort position.
    fn create_group(&self, name: &str, color: &str) -> RepoResult<Group>;
    /// Renames/recolors a group. Returns `None` when no live row matches;
    /// order is left untouched.
    fn update_group(&self, id: GroupId, name: &str, color: &str) -> RepoResult<Option<Group>>;
    /// Reassigns `sort_order` to each id's index position, atomically.
    fn reorder_groups(&mut self, ordered_ids: &[GroupId]) -> RepoResult<()>;
    /// Detaches the group's todos and tombstones the group in one
    /// transaction. No-op for missing or already-deleted ids.
    fn delete_group(&mut self, id: GroupId) -> RepoResult<()>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GROUP_SELECT_SQL}
             WHERE deleted_at IS NULL
             ORDER BY sort_order ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }

        Ok(groups)
    }

    fn create_group(&self, name: &str, color: &str) -> RepoResult<Group> {
        validate_group_input(name, color)?;

        let id = Uuid::new_v4();
        // Tombstoned groups keep their old positions; only live rows count
        // toward the next append slot.
        let next_order: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM groups WHERE deleted_at IS NULL;",
            [],
            |row| row.get(0),
        )?;

        self.conn.execute(
            "INSERT INTO groups (id, name, color, sort_order) VALUES (?1, ?2, ?3, ?4);",
            params![id.to_string(), name, color, next_order],
        )?;

        fetch_group(self.conn, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created group {id} missing on read-back"))
        })
    }

    fn update_group(&self, id: GroupId, name: &str, color: &str) -> RepoResult<Option<Group>> {
        validate_group_input(name, color)?;

        let changed = self.conn.execute(
            "UPDATE groups
             SET
                name = ?1,
                color = ?2,
                updated_at = datetime('now', 'localtime')
             WHERE id = ?3
               AND deleted_at IS NULL;",
            params![name, color, id.to_string()],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        fetch_group(self.conn, id)
    }

    fn reorder_groups(&mut self, ordered_ids: &[GroupId]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        {
            let mut stmt = tx.prepare("UPDATE groups SET sort_order = ?1 WHERE id = ?2;")?;
            for (index, id) in ordered_ids.iter().enumerate() {
                stmt.execute(params![index as i64, id.to_string()])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_group(&mut self, id: GroupId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Detach first, then tombstone; both commit together so readers never
        // observe a deleted group that still owns todos.
        tx.execute(
            "UPDATE todos
             SET
                group_id = NULL,
                updated_at = datetime('now', 'localtime')
             WHERE group_id = ?1
               AND deleted_at IS NULL;",
            [id_text.as_str()],
        )?;
        tx.execute(
            "UPDATE groups
             SET
                deleted_at = datetime('now', 'localtime'),
                updated_at = datetime('now', 'localtime')
             WHERE id = ?1
               AND deleted_at IS NULL;",
            [id_text.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }
}

fn fetch_group(conn: &Connection, id: GroupId) -> RepoResult<Option<Group>> {
    let mut stmt = conn.prepare(&format!("{GROUP_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;

    if let Some(row) = rows.next()? {
        return Ok(Some(parse_group_row(row)?));
    }

    Ok(None)
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<Group> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in groups.id"))
    })?;

    Ok(Group {
        id,
        name: row.get("name")?,
        color: row.get("color")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}
