//! Duplicate detection against a scoped id index.
//!
//! The index is a plain set of fingerprints supplied by the storage layer
//! for one scope. Nothing here holds state between calls, so concurrent
//! pipeline runs over different scopes cannot interfere.

use std::collections::HashSet;

use crate::models::Job;

/// Fingerprints already present in storage for one scope, plus any ids
/// stored during the current run.
#[derive(Debug, Default, Clone)]
pub struct IdIndex {
    ids: HashSet<String>,
}

impl IdIndex {
    pub fn new(ids: HashSet<String>) -> Self {
        Self { ids }
    }

    /// Record a newly stored id so later records in the same batch are
    /// deduplicated against it.
    pub fn insert(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Whether `job` duplicates a posting already in the index.
pub fn is_duplicate(job: &Job, index: &IdIndex) -> bool {
    index.ids.contains(&job.id)
}
