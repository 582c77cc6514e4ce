// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::store::{NodeStatus, RunId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("run '{0}' not found")]
    RunNotFound(RunId),

    #[error("run '{0}' already exists")]
    RunExists(RunId),

    #[error("run '{run_id}' has no node '{node_id}'")]
    NodeNotFound { run_id: RunId, node_id: String },

    #[error("node '{node_id}' cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        node_id: String,
        from: NodeStatus,
        to: NodeStatus,
    },

    #[error("run store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("run store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
