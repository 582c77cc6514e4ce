// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Instant;

use crate::engine::context::RunContext;
use crate::engine::run_state::{
    cancel_pending, finish_run, run_node, skip_node, Disposition, RunState,
};
use crate::errors::ExecutionError;
use crate::observability::messages::engine::RunStarted;
use crate::observability::messages::StructuredLog;
use crate::store::RunSnapshot;
use crate::traits::DagExecutor;

/// Runs nodes one at a time in resolved order.
///
/// A node's outcome is recorded before the next node is looked at, so the
/// store always reflects a prefix of the plan. Cancellation is observed
/// between nodes; the node in flight finishes normally.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DagExecutor for SequentialExecutor {
    async fn execute(&self, ctx: RunContext) -> Result<RunSnapshot, ExecutionError> {
        let started = Instant::now();
        RunStarted {
            run_id: &ctx.run_id,
            strategy: self.strategy_name(),
            node_count: ctx.plan.len(),
            max_concurrency: self.max_concurrency(),
        }
        .log();

        let mut state = RunState::new(&ctx);

        for id in ctx.plan.order.iter() {
            if ctx.cancel.is_cancelled() {
                cancel_pending(&ctx, &mut state).await?;
                break;
            }

            let node = ctx.node(id)?;
            match state.disposition(node, ctx.options.failure_strategy) {
                Disposition::Skip { blocked_by } => {
                    skip_node(&ctx, &mut state, node, blocked_by).await?
                }
                Disposition::Run => run_node(&ctx, &mut state, node).await?,
            }
        }

        finish_run(&ctx, self.strategy_name(), started).await
    }

    fn strategy_name(&self) -> &'static str {
        "sequential"
    }
}
