//! Todo repository contract, SQLite implementation, and the filter/sort/
//! paginate query engine.
//!
//! # Responsibility
//! - Provide CRUD APIs over `todos` storage returning joined `TodoView` rows.
//! - Assemble conditional filters as predicate + bind-value pairs and an
//!   explicit sort-key enum; never interpolate values into SQL text.
//!
//! # Invariants
//! - Reads and writes are scoped to `deleted_at IS NULL`; soft-deleted rows
//!   never resurface and are never re-stamped.
//! - `completed_at` is set exactly when `completed` flips to true and cleared
//!   when it flips back.
//! - The page total is counted separately from the page fetch.

use crate::model::group::GroupId;
use crate::model::todo::{
    validate_calendar_date, validate_todo_input, Todo, TodoId, TodoStats, TodoView,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Page size applied when the caller does not specify one.
pub const DEFAULT_QUERY_LIMIT: u32 = 200;

// The join is constrained to live groups so a tombstoned group's display
// attributes never leak into the view.
const TODO_VIEW_SELECT_SQL: &str = "SELECT
    t.id,
    t.title,
    t.description,
    t.group_id,
    t.due_date,
    t.completed,
    t.created_at,
    t.completed_at,
    t.updated_at,
    t.deleted_at,
    g.name AS group_name,
    g.color AS group_color
FROM todos t
LEFT JOIN groups g ON g.id = t.group_id AND g.deleted_at IS NULL";

/// Sort key for todo queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodoSortField {
    #[default]
    CreatedAt,
    /// Two-tier: rows with a due date rank before rows without one; the
    /// undated tier is always ordered by `created_at` descending.
    DueDate,
}

/// Sort direction for the primary sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One group-membership selector. A query may combine `Ungrouped` with any
/// number of concrete group ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSelector {
    /// Matches todos with no group.
    Ungrouped,
    /// Matches todos in the given group.
    Group(GroupId),
}

/// Normalized query options for `query_todos`. Every field has an explicit
/// default; entry points fill omitted fields before building the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoQuery {
    /// Completion flag to match (conjunctive with every other filter).
    pub completed: bool,
    /// Group membership clause; empty means no group constraint.
    pub groups: Vec<GroupSelector>,
    pub sort_by: TodoSortField,
    pub sort_order: SortDirection,
    /// Inclusive `YYYY-MM-DD` lower bound on the `created_at` calendar day.
    pub start_date: Option<String>,
    /// Inclusive `YYYY-MM-DD` upper bound on the `created_at` calendar day.
    pub end_date: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for TodoQuery {
    fn default() -> Self {
        Self {
            completed: false,
            groups: Vec::new(),
            sort_by: TodoSortField::default(),
            sort_order: SortDirection::default(),
            start_date: None,
            end_date: None,
            limit: DEFAULT_QUERY_LIMIT,
            offset: 0,
        }
    }
}

/// One page of query results plus the pagination envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoQueryPage {
    pub items: Vec<TodoView>,
    /// Count of all matching rows, ignoring pagination.
    pub total: u64,
    pub has_more: bool,
}

/// Repository interface for todo operations.
pub trait TodoRepository {
    /// Creates a todo with `completed=false` and returns the joined view.
    fn create_todo(
        &self,
        title: &str,
        description: &str,
        group_id: Option<GroupId>,
        due_date: Option<&str>,
    ) -> RepoResult<TodoView>;
    /// Gets one live todo by id.
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoView>>;
    /// Replaces all editable fields. Fails with `TodoNotFound` when no live
    /// row matches.
    fn update_todo(
        &self,
        id: TodoId,
        title: &str,
        description: &str,
        group_id: Option<GroupId>,
        due_date: Option<&str>,
    ) -> RepoResult<TodoView>;
    /// Flips `completed`, maintaining the `completed_at` invariant. Fails
    /// with `TodoNotFound` when no live row matches.
    fn toggle_complete(&self, id: TodoId) -> RepoResult<TodoView>;
    /// Tombstones a todo. Idempotent: missing or already-deleted ids are a
    /// silent no-op.
    fn soft_delete_todo(&self, id: TodoId) -> RepoResult<()>;
    /// Runs the filter/sort/paginate query.
    fn query_todos(&self, query: &TodoQuery) -> RepoResult<TodoQueryPage>;
    /// Counts non-deleted todos; `pending = total - completed`.
    fn stats(&self) -> RepoResult<TodoStats>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(
        &self,
        title: &str,
        description: &str,
        group_id: Option<GroupId>,
        due_date: Option<&str>,
    ) -> RepoResult<TodoView> {
        validate_todo_input(title, due_date)?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO todos (id, title, description, group_id, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                title,
                description,
                group_id.map(|value| value.to_string()),
                due_date,
            ],
        )?;

        self.get_todo(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created todo {id} missing on read-back"))
        })
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoView>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_VIEW_SELECT_SQL}
             WHERE t.id = ?1
               AND t.deleted_at IS NULL;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_view_row(row)?));
        }

        Ok(None)
    }

    fn update_todo(
        &self,
        id: TodoId,
        title: &str,
        description: &str,
        group_id: Option<GroupId>,
        due_date: Option<&str>,
    ) -> RepoResult<TodoView> {
        validate_todo_input(title, due_date)?;

        let changed = self.conn.execute(
            "UPDATE todos
             SET
                title = ?1,
                description = ?2,
                group_id = ?3,
                due_date = ?4,
                updated_at = datetime('now', 'localtime')
             WHERE id = ?5
               AND deleted_at IS NULL;",
            params![
                title,
                description,
                group_id.map(|value| value.to_string()),
                due_date,
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::TodoNotFound(id));
        }

        self.get_todo(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("updated todo {id} missing on read-back"))
        })
    }

    fn toggle_complete(&self, id: TodoId) -> RepoResult<TodoView> {
        let id_text = id.to_string();
        let current: Option<i64> = self
            .conn
            .query_row(
                "SELECT completed FROM todos WHERE id = ?1 AND deleted_at IS NULL;",
                [id_text.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let completed = match current {
            Some(value) => int_to_bool(value, "todos.completed")?,
            None => return Err(RepoError::TodoNotFound(id)),
        };

        if completed {
            self.conn.execute(
                "UPDATE todos
                 SET
                    completed = 0,
                    completed_at = NULL,
                    updated_at = datetime('now', 'localtime')
                 WHERE id = ?1;",
                [id_text.as_str()],
            )?;
        } else {
            self.conn.execute(
                "UPDATE todos
                 SET
                    completed = 1,
                    completed_at = datetime('now', 'localtime'),
                    updated_at = datetime('now', 'localtime')
                 WHERE id = ?1;",
                [id_text.as_str()],
            )?;
        }

        self.get_todo(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("toggled todo {id} missing on read-back"))
        })
    }

    fn soft_delete_todo(&self, id: TodoId) -> RepoResult<()> {
        // The tombstone guard keeps repeated deletes from re-stamping
        // `deleted_at`; a second call leaves state untouched.
        self.conn.execute(
            "UPDATE todos
             SET
                deleted_at = datetime('now', 'localtime'),
                updated_at = datetime('now', 'localtime')
             WHERE id = ?1
               AND deleted_at IS NULL;",
            [id.to_string()],
        )?;

        Ok(())
    }

    fn query_todos(&self, query: &TodoQuery) -> RepoResult<TodoQueryPage> {
        if let Some(date) = query.start_date.as_deref() {
            validate_calendar_date(date)?;
        }
        if let Some(date) = query.end_date.as_deref() {
            validate_calendar_date(date)?;
        }

        let mut conditions: Vec<String> =
            vec!["t.completed = ?".to_string(), "t.deleted_at IS NULL".to_string()];
        let mut bind_values: Vec<Value> = vec![Value::Integer(bool_to_int(query.completed))];

        push_group_clause(query, &mut conditions, &mut bind_values);

        if let Some(date) = query.start_date.as_deref() {
            conditions.push("date(t.created_at) >= ?".to_string());
            bind_values.push(Value::Text(date.to_string()));
        }
        if let Some(date) = query.end_date.as_deref() {
            conditions.push("date(t.created_at) <= ?".to_string());
            bind_values.push(Value::Text(date.to_string()));
        }

        let where_clause = conditions.join(" AND ");

        // Total is counted over the full filter, ignoring pagination.
        let count_sql = format!("SELECT COUNT(*) FROM todos t WHERE {where_clause};");
        let total: i64 = self.conn.query_row(
            &count_sql,
            params_from_iter(bind_values.iter().cloned()),
            |row| row.get(0),
        )?;
        let total = total.max(0) as u64;

        let order_by = order_by_clause(query.sort_by, query.sort_order);
        let page_sql = format!(
            "{TODO_VIEW_SELECT_SQL}
             WHERE {where_clause}
             ORDER BY {order_by}
             LIMIT ? OFFSET ?;"
        );
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&page_sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_todo_view_row(row)?);
        }

        let has_more = u64::from(query.offset) + (items.len() as u64) < total;

        Ok(TodoQueryPage {
            items,
            total,
            has_more,
        })
    }

    fn stats(&self) -> RepoResult<TodoStats> {
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM todos WHERE deleted_at IS NULL;",
            [],
            |row| row.get(0),
        )?;
        let completed: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM todos WHERE completed = 1 AND deleted_at IS NULL;",
            [],
            |row| row.get(0),
        )?;

        let total = total.max(0) as u64;
        let completed = (completed.max(0) as u64).min(total);

        Ok(TodoStats {
            total,
            completed,
            pending: total - completed,
        })
    }
}

fn push_group_clause(query: &TodoQuery, conditions: &mut Vec<String>, bind_values: &mut Vec<Value>) {
    let mut include_ungrouped = false;
    let mut group_ids: Vec<String> = Vec::new();
    for selector in &query.groups {
        match selector {
            GroupSelector::Ungrouped => include_ungrouped = true,
            GroupSelector::Group(id) => group_ids.push(id.to_string()),
        }
    }

    if !group_ids.is_empty() {
        let placeholders = vec!["?"; group_ids.len()].join(", ");
        if include_ungrouped {
            conditions.push(format!(
                "(t.group_id IS NULL OR t.group_id IN ({placeholders}))"
            ));
        } else {
            conditions.push(format!("t.group_id IN ({placeholders})"));
        }
        bind_values.extend(group_ids.into_iter().map(Value::Text));
    } else if include_ungrouped {
        conditions.push("t.group_id IS NULL".to_string());
    }
}

fn order_by_clause(sort_by: TodoSortField, sort_order: SortDirection) -> String {
    match sort_by {
        TodoSortField::CreatedAt => format!("t.created_at {}", sort_order.as_sql()),
        // Dated rows always rank first; the undated tier keeps a fixed
        // `created_at DESC` ordering regardless of direction.
        TodoSortField::DueDate => format!(
            "CASE WHEN t.due_date IS NULL THEN 1 ELSE 0 END ASC, t.due_date {}, t.created_at DESC",
            sort_order.as_sql()
        ),
    }
}

fn parse_todo_view_row(row: &Row<'_>) -> RepoResult<TodoView> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in todos.id"))
    })?;

    let group_id = match row.get::<_, Option<String>>("group_id")? {
        Some(value) => Some(Uuid::parse_str(&value).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{value}` in todos.group_id"))
        })?),
        None => None,
    };

    let completed = int_to_bool(row.get::<_, i64>("completed")?, "todos.completed")?;

    Ok(TodoView {
        todo: Todo {
            id,
            title: row.get("title")?,
            description: row.get::<_, Option<String>>("description")?.unwrap_or_default(),
            group_id,
            due_date: row.get("due_date")?,
            completed,
            created_at: row.get("created_at")?,
            completed_at: row.get("completed_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
        group_name: row.get("group_name")?,
        group_color: row.get("group_color")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
