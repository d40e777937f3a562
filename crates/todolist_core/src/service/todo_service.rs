//! Todo use-case service.
//!
//! # Responsibility
//! - Provide stable todo CRUD/query entry points for bridge callers.
//! - Carry the legacy "get all" alias on top of the query engine.
//!
//! # Invariants
//! - Service APIs never bypass repository validation contracts.
//! - Todo titles are trimmed before persistence.

use crate::model::group::GroupId;
use crate::model::todo::{TodoId, TodoStats, TodoView};
use crate::repo::todo_repo::{TodoQuery, TodoQueryPage, TodoRepository};
use crate::repo::RepoResult;

/// Use-case service wrapper for todo operations.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a todo with `completed=false`; returns the joined view.
    pub fn create_todo(
        &self,
        title: &str,
        description: &str,
        group_id: Option<GroupId>,
        due_date: Option<&str>,
    ) -> RepoResult<TodoView> {
        self.repo
            .create_todo(title.trim(), description, group_id, due_date)
    }

    /// Gets one live todo by id.
    pub fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoView>> {
        self.repo.get_todo(id)
    }

    /// Replaces all editable fields of a todo.
    pub fn update_todo(
        &self,
        id: TodoId,
        title: &str,
        description: &str,
        group_id: Option<GroupId>,
        due_date: Option<&str>,
    ) -> RepoResult<TodoView> {
        self.repo
            .update_todo(id, title.trim(), description, group_id, due_date)
    }

    /// Flips a todo's completion state.
    pub fn toggle_complete(&self, id: TodoId) -> RepoResult<TodoView> {
        self.repo.toggle_complete(id)
    }

    /// Soft-deletes a todo; idempotent.
    pub fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        self.repo.soft_delete_todo(id)
    }

    /// Runs the filter/sort/paginate query.
    pub fn query_todos(&self, query: &TodoQuery) -> RepoResult<TodoQueryPage> {
        self.repo.query_todos(query)
    }

    /// Legacy alias: all todos with the given completion flag, using query
    /// defaults for everything else.
    pub fn list_todos(&self, completed: bool) -> RepoResult<Vec<TodoView>> {
        let query = TodoQuery {
            completed,
            ..TodoQuery::default()
        };
        Ok(self.repo.query_todos(&query)?.items)
    }

    /// Counts over non-deleted todos.
    pub fn stats(&self) -> RepoResult<TodoStats> {
        self.repo.stats()
    }
}
