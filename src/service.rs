// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Submission and query front door.
//!
//! A payload is parsed and resolved synchronously, so structural problems
//! come back to the submitter before any run exists. Accepted payloads get
//! a run in the store and are executed on the tokio runtime.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::{parse_pipeline, OperationRegistry, PipelineGraph, Runtime};
use crate::engine::{resolve_execution_plan, ExecutionPlan, RunContext, RunOptions};
use crate::errors::{ExecutionError, PipelineError};
use crate::observability::messages::engine::{RunAborted, RunSubmitted};
use crate::observability::messages::validation::{log_validation_errors, ConfigurationRejected};
use crate::observability::messages::StructuredLog;
use crate::store::{RunFilter, RunId, RunSnapshot, RunStore};
use crate::traits::DagExecutor;

/// A parsed and resolved payload, ready to run.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedPipeline {
    #[serde(skip)]
    pub graph: PipelineGraph,
    #[serde(flatten)]
    pub plan: ExecutionPlan,
}

pub struct PipelineService {
    registry: Arc<OperationRegistry>,
    executor: Arc<dyn DagExecutor>,
    store: Arc<dyn RunStore>,
    options: RunOptions,
    active: Arc<Mutex<HashMap<RunId, CancellationToken>>>,
}

impl PipelineService {
    pub fn new(runtime: Runtime) -> Self {
        Self {
            registry: Arc::new(runtime.registry),
            executor: Arc::from(runtime.executor),
            store: runtime.store,
            options: runtime.options,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Parse and resolve `payload` without creating a run.
    pub fn plan(&self, payload: &Value) -> Result<PlannedPipeline, PipelineError> {
        let graph = parse_pipeline(payload).map_err(|error| {
            ConfigurationRejected { error: &error }.log();
            error
        })?;
        let plan = resolve_execution_plan(&graph).map_err(|errors| {
            log_validation_errors(&errors);
            errors
        })?;
        Ok(PlannedPipeline { graph, plan })
    }

    /// Accept `payload` and execute it in the background.
    pub async fn submit(&self, payload: &Value) -> Result<RunId, PipelineError> {
        let ctx = self.prepare(payload).await?;
        let run_id = ctx.run_id;

        let executor = self.executor.clone();
        let active = self.active.clone();
        tokio::spawn(async move {
            if let Err(error) = executor.execute(ctx).await {
                RunAborted {
                    run_id: &run_id,
                    error: &error,
                }
                .log();
            }
            active.lock().await.remove(&run_id);
        });

        Ok(run_id)
    }

    /// Accept `payload` and wait for its run to finish.
    pub async fn run(&self, payload: &Value) -> Result<RunSnapshot, PipelineError> {
        let ctx = self.prepare(payload).await?;
        let run_id = ctx.run_id;

        let result = self.executor.execute(ctx).await;
        self.active.lock().await.remove(&run_id);

        result.map_err(|error: ExecutionError| {
            RunAborted {
                run_id: &run_id,
                error: &error,
            }
            .log();
            error.into()
        })
    }

    /// Request cancellation of an in-flight run.
    ///
    /// Returns `false` when the run is unknown or already finished.
    pub async fn cancel(&self, run_id: RunId) -> bool {
        match self.active.lock().await.get(&run_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn status(&self, run_id: RunId) -> Result<RunSnapshot, PipelineError> {
        Ok(self.store.get(run_id).await?)
    }

    pub async fn list(&self, filter: RunFilter) -> Result<Vec<RunSnapshot>, PipelineError> {
        Ok(self.store.list(filter).await?)
    }

    /// Remove a finished run. In-flight runs must be cancelled first.
    pub async fn delete(&self, run_id: RunId) -> Result<(), PipelineError> {
        if self.active.lock().await.contains_key(&run_id) {
            return Err(PipelineError::RunInProgress(run_id));
        }
        Ok(self.store.delete(run_id).await?)
    }

    async fn prepare(&self, payload: &Value) -> Result<RunContext, PipelineError> {
        let PlannedPipeline { graph, plan } = self.plan(payload)?;
        let cancel = CancellationToken::new();

        let ctx = RunContext::new(
            RunId::new(),
            Arc::new(graph),
            Arc::new(plan),
            self.registry.clone(),
            self.store.clone(),
        )
        .with_options(self.options)
        .with_cancellation(cancel.clone());

        self.store.create(ctx.initial_snapshot()).await?;
        self.active.lock().await.insert(ctx.run_id, cancel);

        RunSubmitted {
            run_id: &ctx.run_id,
            node_count: ctx.plan.len(),
        }
        .log();
        Ok(ctx)
    }
}

impl From<Runtime> for PipelineService {
    fn from(runtime: Runtime) -> Self {
        Self::new(runtime)
    }
}

impl std::fmt::Debug for PipelineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineService")
            .field("registry", &self.registry)
            .field("strategy", &self.executor.strategy_name())
            .field("options", &self.options)
            .finish()
    }
}
