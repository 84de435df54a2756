//! Outcomes of sync runs.

use std::collections::BTreeSet;
use std::path::PathBuf;

/// Result of [`Syncer::sync`](crate::Syncer::sync).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Slugs of every document sent to the remote.
    pub processed: BTreeSet<String>,
    /// Slugs of newly created posts, in processing order.
    pub created: Vec<String>,
    /// Slugs of updated posts, in processing order.
    pub updated: Vec<String>,
    /// Slugs of deleted posts.
    pub deleted: Vec<String>,
    /// Documents skipped by the filter or for lacking a slug.
    pub skipped: Vec<PathBuf>,
}

/// Result of [`Syncer::plan`](crate::Syncer::plan). Nothing is written remotely.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Slugs that would be created.
    pub create: Vec<String>,
    /// Slugs that would be updated.
    pub update: Vec<String>,
    /// Slugs that would be deleted.
    pub delete: Vec<String>,
    /// Tags that would be created.
    pub new_tags: Vec<String>,
    /// Documents that would be skipped.
    pub skipped: Vec<PathBuf>,
}

impl SyncPlan {
    /// Whether the plan contains no remote writes.
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update.is_empty()
            && self.delete.is_empty()
            && self.new_tags.is_empty()
    }
}
