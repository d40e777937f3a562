//! Bridge use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the presentation layer.
//! - Normalize loosely-typed request arguments into core query/input types.
//! - Own the process-wide store handle (one long-lived connection; all
//!   operations run sequentially against it).
//!
//! # Invariants
//! - Exported functions must not panic across the bridge boundary.
//! - Failures are reported through `ok=false` envelopes, never exceptions.

use log::error;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use todolist_core::db::{default_db_path, open_db};
use todolist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Group, GroupSelector, GroupService, SortDirection, SqliteGroupRepository,
    SqliteTodoRepository, TodoQuery, TodoService, TodoSortField, TodoView,
};
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE: OnceLock<Mutex<Option<Connection>>> = OnceLock::new();

/// Minimal health-check API for bridge smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through the bridge.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Group row crossing the bridge. Tombstoned rows never cross it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
    pub color: String,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Todo row joined with its group's display attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub group_id: Option<String>,
    pub due_date: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub updated_at: String,
    pub group_name: Option<String>,
    pub group_color: Option<String>,
}

/// Counters over non-deleted todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsDto {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Open-ended query options as the UI sends them. Every omitted field falls
/// back to an explicit default during normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoQueryOptions {
    pub completed: Option<bool>,
    /// Group ids; the sentinel `"none"` selects ungrouped todos. Empty or
    /// absent means no group constraint.
    pub group_ids: Option<Vec<String>>,
    /// `created_at` (default) or `due_date`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupListResponse {
    pub ok: bool,
    pub groups: Vec<GroupDto>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupActionResponse {
    pub ok: bool,
    /// Affected row; `None` when the target was absent (silent no-op).
    pub group: Option<GroupDto>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    pub todos: Vec<TodoDto>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    pub ok: bool,
    pub todo: Option<TodoDto>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoQueryResponse {
    pub ok: bool,
    pub items: Vec<TodoDto>,
    /// Count of all matching rows, ignoring pagination.
    pub total: u64,
    pub has_more: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsResponse {
    pub ok: bool,
    pub stats: Option<StatsDto>,
    pub message: String,
}

/// Generic acknowledgement envelope for delete/reorder style calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckResponse {
    pub ok: bool,
    pub message: String,
}

impl AckResponse {
    fn success() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Lists all non-deleted groups in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_get_all() -> GroupListResponse {
    match with_store(|conn| {
        let service = GroupService::new(SqliteGroupRepository::new(conn));
        service.list_groups().map_err(|err| err.to_string())
    }) {
        Ok(groups) => GroupListResponse {
            ok: true,
            groups: groups.into_iter().map(group_to_dto).collect(),
            message: String::new(),
        },
        Err(message) => GroupListResponse {
            ok: false,
            groups: Vec::new(),
            message: op_failure("groups_get_all", &message),
        },
    }
}

/// Creates a group appended after the current highest sort position.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_create(name: String, color: String) -> GroupActionResponse {
    match with_store(|conn| {
        let service = GroupService::new(SqliteGroupRepository::new(conn));
        service
            .create_group(name.as_str(), color.as_str())
            .map_err(|err| err.to_string())
    }) {
        Ok(group) => GroupActionResponse {
            ok: true,
            group: Some(group_to_dto(group)),
            message: String::new(),
        },
        Err(message) => GroupActionResponse {
            ok: false,
            group: None,
            message: op_failure("groups_create", &message),
        },
    }
}

/// Renames/recolors a group; silent no-op (`group=None`) when absent.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_update(id: String, name: String, color: String) -> GroupActionResponse {
    let result = parse_id(&id, "group id").and_then(|group_id| {
        with_store(|conn| {
            let service = GroupService::new(SqliteGroupRepository::new(conn));
            service
                .update_group(group_id, name.as_str(), color.as_str())
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(updated) => GroupActionResponse {
            ok: true,
            group: updated.map(group_to_dto),
            message: String::new(),
        },
        Err(message) => GroupActionResponse {
            ok: false,
            group: None,
            message: op_failure("groups_update", &message),
        },
    }
}

/// Soft-deletes a group, detaching its todos in the same transaction.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_delete(id: String) -> AckResponse {
    let result = parse_id(&id, "group id").and_then(|group_id| {
        with_store(|conn| {
            let mut service = GroupService::new(SqliteGroupRepository::new(conn));
            service.delete_group(group_id).map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(()) => AckResponse::success(),
        Err(message) => AckResponse::failure(op_failure("groups_delete", &message)),
    }
}

/// Persists a drag-reorder: each id receives its index position.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_reorder(ordered_ids: Vec<String>) -> AckResponse {
    let parsed: Result<Vec<_>, String> = ordered_ids
        .iter()
        .map(|id| parse_id(id, "group id"))
        .collect();

    let result = parsed.and_then(|ids| {
        with_store(|conn| {
            let mut service = GroupService::new(SqliteGroupRepository::new(conn));
            service.reorder_groups(&ids).map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(()) => AckResponse::success(),
        Err(message) => AckResponse::failure(op_failure("groups_reorder", &message)),
    }
}

/// Legacy alias: all todos with the given completion flag (default pending).
#[flutter_rust_bridge::frb(sync)]
pub fn todos_get_all(completed: Option<bool>) -> TodoListResponse {
    match with_store(|conn| {
        let service = TodoService::new(SqliteTodoRepository::new(conn));
        service
            .list_todos(completed.unwrap_or(false))
            .map_err(|err| err.to_string())
    }) {
        Ok(todos) => TodoListResponse {
            ok: true,
            todos: todos.into_iter().map(todo_to_dto).collect(),
            message: String::new(),
        },
        Err(message) => TodoListResponse {
            ok: false,
            todos: Vec::new(),
            message: op_failure("todos_get_all", &message),
        },
    }
}

/// Runs the filter/sort/paginate query.
#[flutter_rust_bridge::frb(sync)]
pub fn todos_query(options: TodoQueryOptions) -> TodoQueryResponse {
    let result = build_todo_query(&options).and_then(|query| {
        with_store(|conn| {
            let service = TodoService::new(SqliteTodoRepository::new(conn));
            service.query_todos(&query).map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(page) => TodoQueryResponse {
            ok: true,
            items: page.items.into_iter().map(todo_to_dto).collect(),
            total: page.total,
            has_more: page.has_more,
            message: String::new(),
        },
        Err(message) => TodoQueryResponse {
            ok: false,
            items: Vec::new(),
            total: 0,
            has_more: false,
            message: op_failure("todos_query", &message),
        },
    }
}

/// Gets one live todo by id; `todo=None` when absent.
#[flutter_rust_bridge::frb(sync)]
pub fn todos_get_by_id(id: String) -> TodoActionResponse {
    let result = parse_id(&id, "todo id").and_then(|todo_id| {
        with_store(|conn| {
            let service = TodoService::new(SqliteTodoRepository::new(conn));
            service.get_todo(todo_id).map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(found) => TodoActionResponse {
            ok: true,
            todo: found.map(todo_to_dto),
            message: String::new(),
        },
        Err(message) => TodoActionResponse {
            ok: false,
            todo: None,
            message: op_failure("todos_get_by_id", &message),
        },
    }
}

/// Creates a todo with `completed=false`; returns the joined view.
#[flutter_rust_bridge::frb(sync)]
pub fn todos_create(
    title: String,
    description: Option<String>,
    group_id: Option<String>,
    due_date: Option<String>,
) -> TodoActionResponse {
    let result = parse_optional_id(group_id.as_deref(), "group id").and_then(|parsed_group| {
        with_store(|conn| {
            let service = TodoService::new(SqliteTodoRepository::new(conn));
            service
                .create_todo(
                    title.as_str(),
                    description.as_deref().unwrap_or(""),
                    parsed_group,
                    due_date.as_deref(),
                )
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(view) => TodoActionResponse {
            ok: true,
            todo: Some(todo_to_dto(view)),
            message: String::new(),
        },
        Err(message) => TodoActionResponse {
            ok: false,
            todo: None,
            message: op_failure("todos_create", &message),
        },
    }
}

/// Replaces all editable fields of a todo.
#[flutter_rust_bridge::frb(sync)]
pub fn todos_update(
    id: String,
    title: String,
    description: String,
    group_id: Option<String>,
    due_date: Option<String>,
) -> TodoActionResponse {
    let result = parse_id(&id, "todo id").and_then(|todo_id| {
        parse_optional_id(group_id.as_deref(), "group id").and_then(|parsed_group| {
            with_store(|conn| {
                let service = TodoService::new(SqliteTodoRepository::new(conn));
                service
                    .update_todo(
                        todo_id,
                        title.as_str(),
                        description.as_str(),
                        parsed_group,
                        due_date.as_deref(),
                    )
                    .map_err(|err| err.to_string())
            })
        })
    });

    match result {
        Ok(view) => TodoActionResponse {
            ok: true,
            todo: Some(todo_to_dto(view)),
            message: String::new(),
        },
        Err(message) => TodoActionResponse {
            ok: false,
            todo: None,
            message: op_failure("todos_update", &message),
        },
    }
}

/// Flips a todo's completion state.
#[flutter_rust_bridge::frb(sync)]
pub fn todos_toggle_complete(id: String) -> TodoActionResponse {
    let result = parse_id(&id, "todo id").and_then(|todo_id| {
        with_store(|conn| {
            let service = TodoService::new(SqliteTodoRepository::new(conn));
            service
                .toggle_complete(todo_id)
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(view) => TodoActionResponse {
            ok: true,
            todo: Some(todo_to_dto(view)),
            message: String::new(),
        },
        Err(message) => TodoActionResponse {
            ok: false,
            todo: None,
            message: op_failure("todos_toggle_complete", &message),
        },
    }
}

/// Soft-deletes a todo; idempotent.
#[flutter_rust_bridge::frb(sync)]
pub fn todos_delete(id: String) -> AckResponse {
    let result = parse_id(&id, "todo id").and_then(|todo_id| {
        with_store(|conn| {
            let service = TodoService::new(SqliteTodoRepository::new(conn));
            service.delete_todo(todo_id).map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(()) => AckResponse::success(),
        Err(message) => AckResponse::failure(op_failure("todos_delete", &message)),
    }
}

/// Counts over non-deleted todos.
#[flutter_rust_bridge::frb(sync)]
pub fn stats_get() -> StatsResponse {
    match with_store(|conn| {
        let service = TodoService::new(SqliteTodoRepository::new(conn));
        service.stats().map_err(|err| err.to_string())
    }) {
        Ok(stats) => StatsResponse {
            ok: true,
            stats: Some(StatsDto {
                total: stats.total,
                completed: stats.completed,
                pending: stats.pending,
            }),
            message: String::new(),
        },
        Err(message) => StatsResponse {
            ok: false,
            stats: None,
            message: op_failure("stats_get", &message),
        },
    }
}

/// Returns the resolved database file location.
#[flutter_rust_bridge::frb(sync)]
pub fn system_get_database_path() -> String {
    resolve_db_path().display().to_string()
}

/// Closes the store handle. Subsequent calls reopen it; intended for process
/// shutdown.
#[flutter_rust_bridge::frb(sync)]
pub fn close_database() -> AckResponse {
    let Some(mutex) = STORE.get() else {
        return AckResponse::success();
    };
    let mut guard = match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => return AckResponse::failure("store lock poisoned"),
    };
    if let Some(conn) = guard.take() {
        if let Err((_conn, err)) = conn.close() {
            return AckResponse::failure(op_failure("close_database", &err.to_string()));
        }
    }
    AckResponse::success()
}

fn with_store<T>(f: impl FnOnce(&mut Connection) -> Result<T, String>) -> Result<T, String> {
    let mutex = STORE.get_or_init(|| Mutex::new(None));
    let mut guard = mutex.lock().map_err(|_| "store lock poisoned".to_string())?;

    if guard.is_none() {
        *guard = Some(open_store()?);
    }
    let Some(conn) = guard.as_mut() else {
        return Err("store unavailable".to_string());
    };

    f(conn)
}

fn open_store() -> Result<Connection, String> {
    let path = resolve_db_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            format!(
                "failed to create data directory `{}`: {err}",
                parent.display()
            )
        })?;
    }
    open_db(&path).map_err(|err| format!("store open failed: {err}"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH.get_or_init(default_db_path).clone()
}

fn op_failure(op: &str, message: &str) -> String {
    error!("event=bridge_call module=ffi op={op} status=error error={message}");
    format!("{op} failed: {message}")
}

fn parse_id(value: &str, what: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid {what}: `{value}`"))
}

fn parse_optional_id(value: Option<&str>, what: &str) -> Result<Option<Uuid>, String> {
    value.map(|id| parse_id(id, what)).transpose()
}

fn build_todo_query(options: &TodoQueryOptions) -> Result<TodoQuery, String> {
    let mut groups = Vec::new();
    if let Some(group_ids) = options.group_ids.as_ref() {
        for raw in group_ids {
            if raw.trim() == "none" {
                groups.push(GroupSelector::Ungrouped);
            } else {
                groups.push(GroupSelector::Group(parse_id(raw, "group id")?));
            }
        }
    }

    let sort_by = match options.sort_by.as_deref() {
        None => TodoSortField::CreatedAt,
        Some("created_at") => TodoSortField::CreatedAt,
        Some("due_date") => TodoSortField::DueDate,
        Some(other) => {
            return Err(format!(
                "invalid sort_by `{other}`; expected created_at|due_date"
            ))
        }
    };

    let sort_order = match options.sort_order.as_deref() {
        None => SortDirection::Desc,
        Some("asc") => SortDirection::Asc,
        Some("desc") => SortDirection::Desc,
        Some(other) => return Err(format!("invalid sort_order `{other}`; expected asc|desc")),
    };

    let defaults = TodoQuery::default();
    Ok(TodoQuery {
        completed: options.completed.unwrap_or(defaults.completed),
        groups,
        sort_by,
        sort_order,
        start_date: options.start_date.clone(),
        end_date: options.end_date.clone(),
        limit: options.limit.unwrap_or(defaults.limit),
        offset: options.offset.unwrap_or(defaults.offset),
    })
}

fn group_to_dto(group: Group) -> GroupDto {
    GroupDto {
        id: group.id.to_string(),
        name: group.name,
        color: group.color,
        sort_order: group.sort_order,
        created_at: group.created_at,
        updated_at: group.updated_at,
    }
}

fn todo_to_dto(view: TodoView) -> TodoDto {
    TodoDto {
        id: view.todo.id.to_string(),
        title: view.todo.title,
        description: view.todo.description,
        group_id: view.todo.group_id.map(|id| id.to_string()),
        due_date: view.todo.due_date,
        completed: view.todo.completed,
        created_at: view.todo.created_at,
        completed_at: view.todo.completed_at,
        updated_at: view.todo.updated_at,
        group_name: view.group_name,
        group_color: view.group_color,
    }
}
