//! Todo domain model and read projections.
//!
//! # Invariants
//! - `completed_at` is non-null iff `completed` is true.
//! - `group_id`, when set, references a row in `groups`; group soft-delete
//!   detaches it to `None` instead of cascading.

use crate::model::group::GroupId;
use crate::model::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a todo.
pub type TodoId = Uuid;

static CALENDAR_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid calendar date regex"));

/// Canonical todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Owning group; `None` for ungrouped todos.
    pub group_id: Option<GroupId>,
    /// Caller-supplied `YYYY-MM-DD` date; day granularity only.
    pub due_date: Option<String>,
    pub completed: bool,
    pub created_at: String,
    /// Set when `completed` flips to true, cleared when it flips back.
    pub completed_at: Option<String>,
    pub updated_at: String,
    /// Soft delete tombstone.
    pub deleted_at: Option<String>,
}

impl Todo {
    /// Returns whether this todo should be considered visible/active.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Denormalized read-only projection joining a todo with its group's display
/// attributes. Derived at query time, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoView {
    #[serde(flatten)]
    pub todo: Todo,
    /// Owning group name; `None` when ungrouped or the group is deleted.
    pub group_name: Option<String>,
    /// Owning group color; `None` when ungrouped or the group is deleted.
    pub group_color: Option<String>,
}

/// Counts over non-deleted todos. `pending` is computed, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Validates caller-supplied todo fields before persistence.
pub fn validate_todo_input(title: &str, due_date: Option<&str>) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if let Some(date) = due_date {
        validate_calendar_date(date)?;
    }
    Ok(())
}

/// Validates a `YYYY-MM-DD` date string (used for due dates and date filters).
pub fn validate_calendar_date(value: &str) -> Result<(), ValidationError> {
    if CALENDAR_DATE_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDate(value.to_string()))
    }
}
