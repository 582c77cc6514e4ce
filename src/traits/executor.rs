// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::context::RunContext;
use crate::errors::ExecutionError;
use crate::store::RunSnapshot;

#[async_trait]
pub trait DagExecutor: Send + Sync {
    /// Drive every node of the run in `ctx` to a terminal state.
    ///
    /// The run's initial snapshot must already be in `ctx.store`. Node
    /// failures are recorded in the store and never surface here; an `Err`
    /// means the run itself could not be carried out (store failure,
    /// internal inconsistency) and the stored snapshot may be incomplete.
    ///
    /// Returns the final snapshot as read back from the store.
    async fn execute(&self, ctx: RunContext) -> Result<RunSnapshot, ExecutionError>;

    /// Name used in logs and settings (`sequential`, `level`).
    fn strategy_name(&self) -> &'static str;

    /// Upper bound of adapter invocations in flight at once.
    fn max_concurrency(&self) -> usize {
        1
    }
}
