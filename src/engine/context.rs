// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::{ExecutionNode, OperationRegistry, PipelineGraph};
use crate::engine::resolver::ExecutionPlan;
use crate::errors::{ExecutionError, FailureStrategy};
use crate::store::{NodeRecord, RunId, RunSnapshot, RunStore};

/// Per-run execution knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub failure_strategy: FailureStrategy,
    /// Upper bound for each adapter invocation.
    pub timeout: Option<Duration>,
}

/// Everything an executor needs to drive one run.
///
/// Cheap to clone: all heavy parts are behind `Arc`.
#[derive(Clone)]
pub struct RunContext {
    pub run_id: RunId,
    pub graph: Arc<PipelineGraph>,
    pub plan: Arc<ExecutionPlan>,
    pub registry: Arc<OperationRegistry>,
    pub store: Arc<dyn RunStore>,
    pub options: RunOptions,
    pub cancel: CancellationToken,
}

impl RunContext {
    pub fn new(
        run_id: RunId,
        graph: Arc<PipelineGraph>,
        plan: Arc<ExecutionPlan>,
        registry: Arc<OperationRegistry>,
        store: Arc<dyn RunStore>,
    ) -> Self {
        Self {
            run_id,
            graph,
            plan,
            registry,
            store,
            options: RunOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn node(&self, id: &str) -> Result<&ExecutionNode, ExecutionError> {
        self.graph.get(id).ok_or_else(|| ExecutionError::Internal {
            message: format!("planned node '{}' is missing from the graph", id),
        })
    }

    /// The all-`PENDING` snapshot a run starts from, nodes in execution order.
    pub fn initial_snapshot(&self) -> RunSnapshot {
        let nodes = self
            .plan
            .order
            .iter()
            .filter_map(|id| self.graph.get(id))
            .map(|node| {
                NodeRecord::pending(
                    node.id.clone(),
                    node.operation.clone(),
                    node.dependencies.clone(),
                )
            })
            .collect();
        RunSnapshot::new(self.run_id, self.graph.roots().to_vec(), nodes)
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.run_id)
            .field("node_count", &self.plan.len())
            .field("options", &self.options)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
