//! Core data layer for the todolist desktop app.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::group::{Group, GroupId, DEFAULT_GROUP_COLOR};
pub use model::todo::{Todo, TodoId, TodoStats, TodoView};
pub use model::ValidationError;
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::todo_repo::{
    GroupSelector, SortDirection, SqliteTodoRepository, TodoQuery, TodoQueryPage, TodoRepository,
    TodoSortField, DEFAULT_QUERY_LIMIT,
};
pub use repo::{RepoError, RepoResult};
pub use service::group_service::GroupService;
pub use service::todo_service::TodoService;

/// Minimal health-check API for early bridge integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
