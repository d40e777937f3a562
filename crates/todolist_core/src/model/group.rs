//! Group domain model.
//!
//! # Invariants
//! - `sort_order` values are dense, zero-based, and unique among non-deleted
//!   groups; the reorder operation reassigns them wholesale.
//! - `deleted_at` is the source of truth for tombstone state.

use crate::model::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a group.
pub type GroupId = Uuid;

/// Color applied to groups created without an explicit color.
pub const DEFAULT_GROUP_COLOR: &str = "#6366f1";

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// User-defined todo group.
///
/// Timestamps are produced by the store at write time, serialized as local
/// `YYYY-MM-DD HH:MM:SS` text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// `#rrggbb` display color.
    pub color: String,
    /// Dense zero-based position among non-deleted groups.
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Soft delete tombstone; a tombstoned group is excluded from all reads.
    pub deleted_at: Option<String>,
}

impl Group {
    /// Returns whether this group should be considered visible/active.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Validates caller-supplied group fields before persistence.
pub fn validate_group_input(name: &str, color: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyGroupName);
    }
    if !HEX_COLOR_RE.is_match(color) {
        return Err(ValidationError::InvalidColor(color.to_string()));
    }
    Ok(())
}
