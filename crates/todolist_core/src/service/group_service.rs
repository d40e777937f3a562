//! Group use-case service.
//!
//! # Responsibility
//! - Provide stable group CRUD/reorder entry points for bridge callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation contracts.
//! - Group names are trimmed before persistence.

use crate::model::group::{Group, GroupId};
use crate::repo::group_repo::GroupRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for group operations.
pub struct GroupService<R: GroupRepository> {
    repo: R,
}

impl<R: GroupRepository> GroupService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all non-deleted groups in display order.
    pub fn list_groups(&self) -> RepoResult<Vec<Group>> {
        self.repo.list_groups()
    }

    /// Creates a group appended after the current highest sort position.
    pub fn create_group(&self, name: &str, color: &str) -> RepoResult<Group> {
        self.repo.create_group(name.trim(), color.trim())
    }

    /// Renames/recolors a group; `None` when no live row matches.
    pub fn update_group(&self, id: GroupId, name: &str, color: &str) -> RepoResult<Option<Group>> {
        self.repo.update_group(id, name.trim(), color.trim())
    }

    /// Persists a drag-reorder: each id receives its index position.
    pub fn reorder_groups(&mut self, ordered_ids: &[GroupId]) -> RepoResult<()> {
        self.repo.reorder_groups(ordered_ids)
    }

    /// Soft-deletes a group, detaching its todos in the same transaction.
    pub fn delete_group(&mut self, id: GroupId) -> RepoResult<()> {
        self.repo.delete_group(id)
    }
}
