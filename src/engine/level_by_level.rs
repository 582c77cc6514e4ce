// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, TryAcquireError};
use tokio::task::JoinSet;

use crate::engine::context::RunContext;
use crate::engine::run_state::{
    cancel_pending, finish_node, finish_run, invoke_node, skip_node, start_node, Disposition,
    RunState,
};
use crate::errors::ExecutionError;
use crate::observability::messages::engine::{LevelStarted, RunStarted};
use crate::observability::messages::StructuredLog;
use crate::store::RunSnapshot;
use crate::traits::DagExecutor;

type NodeOutcome = (String, Result<Value, ExecutionError>, Duration);

/// Level-by-Level executor: runs each dependency level concurrently.
///
/// Levels come from the resolved [`ExecutionPlan`](crate::engine::resolver::ExecutionPlan);
/// every node in a level depends only on earlier levels, so a level can be
/// fanned out once the previous one has settled.
///
/// ## Coordination
///
/// Adapter calls run on spawned tasks. The coordinating task owns the
/// [`RunState`] and performs every store write, so skip decisions and
/// outputs never race. A per-level semaphore keeps at most
/// `max_concurrency` calls in flight; a node only becomes `RUNNING` once
/// its task holds a permit.
///
/// Cancellation is checked before each level and before each spawn. Calls
/// already in flight are allowed to finish and are recorded normally.
pub struct LevelByLevelExecutor {
    max_concurrency: usize,
}

impl LevelByLevelExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    async fn execute_level(
        &self,
        ctx: &RunContext,
        state: &mut RunState,
        level: &[String],
    ) -> Result<bool, ExecutionError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks: JoinSet<NodeOutcome> = JoinSet::new();

        for id in level {
            if ctx.cancel.is_cancelled() {
                Self::drain(ctx, state, &mut tasks).await?;
                return Ok(false);
            }

            let node = ctx.node(id)?;
            if let Disposition::Skip { blocked_by } =
                state.disposition(node, ctx.options.failure_strategy)
            {
                skip_node(ctx, state, node, blocked_by).await?;
                continue;
            }

            let permit = loop {
                match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => break permit,
                    Err(TryAcquireError::NoPermits) if !tasks.is_empty() => {
                        Self::settle_next(ctx, state, &mut tasks).await?
                    }
                    Err(e) => {
                        return Err(ExecutionError::Internal {
                            message: format!("failed to acquire a slot for '{}': {}", node.id, e),
                        })
                    }
                }
            };

            // A failure settled while waiting for a slot may have changed
            // the fail-fast decision.
            if let Disposition::Skip { blocked_by } =
                state.disposition(node, ctx.options.failure_strategy)
            {
                skip_node(ctx, state, node, blocked_by).await?;
                continue;
            }
            if ctx.cancel.is_cancelled() {
                Self::drain(ctx, state, &mut tasks).await?;
                return Ok(false);
            }

            let params = state.resolve_inputs(node)?;
            start_node(ctx, state, node, params.clone()).await?;

            let registry = ctx.registry.clone();
            let node = node.clone();
            let timeout = ctx.options.timeout;
            tasks.spawn(async move {
                let started = Instant::now();
                let result = invoke_node(&registry, &node, params, timeout).await;
                drop(permit);
                (node.id, result, started.elapsed())
            });
        }

        Self::drain(ctx, state, &mut tasks).await?;
        Ok(true)
    }

    async fn settle_next(
        ctx: &RunContext,
        state: &mut RunState,
        tasks: &mut JoinSet<NodeOutcome>,
    ) -> Result<(), ExecutionError> {
        match tasks.join_next().await {
            Some(Ok((id, result, elapsed))) => {
                let node = ctx.node(&id)?;
                finish_node(ctx, state, node, result, elapsed).await
            }
            Some(Err(join_error)) => Err(ExecutionError::Internal {
                message: format!("node task failed to complete: {}", join_error),
            }),
            None => Ok(()),
        }
    }

    async fn drain(
        ctx: &RunContext,
        state: &mut RunState,
        tasks: &mut JoinSet<NodeOutcome>,
    ) -> Result<(), ExecutionError> {
        while !tasks.is_empty() {
            Self::settle_next(ctx, state, tasks).await?;
        }
        Ok(())
    }
}

impl Default for LevelByLevelExecutor {
    fn default() -> Self {
        Self::new(
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(crate::config::consts::FALLBACK_MAX_CONCURRENCY),
        )
    }
}

#[async_trait]
impl DagExecutor for LevelByLevelExecutor {
    async fn execute(&self, ctx: RunContext) -> Result<RunSnapshot, ExecutionError> {
        let started = Instant::now();
        RunStarted {
            run_id: &ctx.run_id,
            strategy: self.strategy_name(),
            node_count: ctx.plan.len(),
            max_concurrency: self.max_concurrency,
        }
        .log();

        let mut state = RunState::new(&ctx);

        for (index, level) in ctx.plan.levels.iter().enumerate() {
            if ctx.cancel.is_cancelled() {
                cancel_pending(&ctx, &mut state).await?;
                break;
            }

            LevelStarted {
                level: index,
                node_count: level.len(),
            }
            .log();

            if !self.execute_level(&ctx, &mut state, level).await? {
                cancel_pending(&ctx, &mut state).await?;
                break;
            }
        }

        finish_run(&ctx, self.strategy_name(), started).await
    }

    fn strategy_name(&self) -> &'static str {
        "level"
    }

    fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}
