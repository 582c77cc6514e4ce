// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use super::{NodeUpdate, RunFilter, RunId, RunSnapshot, RunStore};
use crate::errors::StoreError;

/// Store that keeps one JSON document per run under a directory.
///
/// Reads are served from an in-memory cache populated at [`FileRunStore::open`].
/// Writes are serialized and land on disk through a temp-file rename, so a
/// crash leaves either the old or the new document.
#[derive(Debug)]
pub struct FileRunStore {
    dir: PathBuf,
    cache: RwLock<HashMap<RunId, RunSnapshot>>,
    writer: Mutex<()>,
}

impl FileRunStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        let mut cache = HashMap::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<RunSnapshot>(&bytes) {
                Ok(run) => {
                    cache.insert(run.run_id, run);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable run document"),
            }
        }

        Ok(Self {
            dir,
            cache: RwLock::new(cache),
            writer: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn run_path(&self, run_id: RunId) -> PathBuf {
        self.dir.join(format!("{}.json", run_id))
    }

    async fn persist(&self, run: &RunSnapshot) -> Result<(), StoreError> {
        let path = self.run_path(run.run_id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(run)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl RunStore for FileRunStore {
    async fn create(&self, run: RunSnapshot) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        if self.cache.read().await.contains_key(&run.run_id) {
            return Err(StoreError::RunExists(run.run_id));
        }
        self.persist(&run).await?;
        self.cache.write().await.insert(run.run_id, run);
        Ok(())
    }

    async fn update_node_status(
        &self,
        run_id: RunId,
        node_id: &str,
        update: NodeUpdate,
    ) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        let mut run = self
            .cache
            .read()
            .await
            .get(&run_id)
            .cloned()
            .ok_or(StoreError::RunNotFound(run_id))?;

        if !run.apply(node_id, update)? {
            return Ok(());
        }
        self.persist(&run).await?;
        self.cache.write().await.insert(run_id, run);
        Ok(())
    }

    async fn get(&self, run_id: RunId) -> Result<RunSnapshot, StoreError> {
        self.cache
            .read()
            .await
            .get(&run_id)
            .cloned()
            .ok_or(StoreError::RunNotFound(run_id))
    }

    async fn list(&self, filter: RunFilter) -> Result<Vec<RunSnapshot>, StoreError> {
        Ok(filter.apply(self.cache.read().await.values()))
    }

    async fn delete(&self, run_id: RunId) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        if self.cache.write().await.remove(&run_id).is_none() {
            return Err(StoreError::RunNotFound(run_id));
        }
        match tokio::fs::remove_file(self.run_path(run_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
