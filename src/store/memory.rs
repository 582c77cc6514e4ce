// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{NodeUpdate, RunFilter, RunId, RunSnapshot, RunStore};
use crate::errors::StoreError;

/// Process-local store. Runs are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<RunId, RunSnapshot>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn create(&self, run: RunSnapshot) -> Result<(), StoreError> {
        let mut runs = self.runs.write().await;
        if runs.contains_key(&run.run_id) {
            return Err(StoreError::RunExists(run.run_id));
        }
        runs.insert(run.run_id, run);
        Ok(())
    }

    async fn update_node_status(
        &self,
        run_id: RunId,
        node_id: &str,
        update: NodeUpdate,
    ) -> Result<(), StoreError> {
        let mut runs = self.runs.write().await;
        let run = runs
            .get_mut(&run_id)
            .ok_or(StoreError::RunNotFound(run_id))?;
        run.apply(node_id, update)?;
        Ok(())
    }

    async fn get(&self, run_id: RunId) -> Result<RunSnapshot, StoreError> {
        self.runs
            .read()
            .await
            .get(&run_id)
            .cloned()
            .ok_or(StoreError::RunNotFound(run_id))
    }

    async fn list(&self, filter: RunFilter) -> Result<Vec<RunSnapshot>, StoreError> {
        Ok(filter.apply(self.runs.read().await.values()))
    }

    async fn delete(&self, run_id: RunId) -> Result<(), StoreError> {
        self.runs
            .write()
            .await
            .remove(&run_id)
            .map(|_| ())
            .ok_or(StoreError::RunNotFound(run_id))
    }
}
