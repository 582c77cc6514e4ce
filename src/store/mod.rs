// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Run status store: the persisted, queryable record of every run.
//!
//! The engine writes through on every node transition; callers poll with
//! [`RunStore::get`] and [`RunStore::list`]. Both backends hand out cloned
//! snapshots so readers never hold a lock across an adapter call.

mod file;
mod memory;
mod snapshot;

use async_trait::async_trait;

use crate::errors::StoreError;

pub use file::FileRunStore;
pub use memory::InMemoryRunStore;
pub use snapshot::{NodeRecord, NodeStatus, NodeUpdate, RunId, RunSnapshot, RunStatus};

/// Query for [`RunStore::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFilter {
    pub status: Option<RunStatus>,
    pub limit: Option<usize>,
}

impl RunFilter {
    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, run: &RunSnapshot) -> bool {
        self.status.map_or(true, |status| run.status == status)
    }

    /// Filter, sort newest first and truncate.
    pub(crate) fn apply<'a>(&self, runs: impl Iterator<Item = &'a RunSnapshot>) -> Vec<RunSnapshot> {
        let mut selected: Vec<RunSnapshot> = runs.filter(|r| self.matches(r)).cloned().collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

#[async_trait]
pub trait RunStore: Send + Sync {
    /// Register a new run. Fails with [`StoreError::RunExists`] if the id is taken.
    async fn create(&self, run: RunSnapshot) -> Result<(), StoreError>;

    /// Move one node to a new state.
    ///
    /// Re-writing the status a node already has is a no-op; any other illegal
    /// move is [`StoreError::InvalidTransition`].
    async fn update_node_status(
        &self,
        run_id: RunId,
        node_id: &str,
        update: NodeUpdate,
    ) -> Result<(), StoreError>;

    async fn get(&self, run_id: RunId) -> Result<RunSnapshot, StoreError>;

    /// Runs matching `filter`, newest first.
    async fn list(&self, filter: RunFilter) -> Result<Vec<RunSnapshot>, StoreError>;

    async fn delete(&self, run_id: RunId) -> Result<(), StoreError>;
}
