// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node lifecycle steps shared by every executor.
//!
//! Executors decide *when* a node runs; these helpers decide *what happens*
//! to it: skip checks, input resolution, adapter invocation and the store
//! write that goes with each transition. Only the coordinating task calls
//! the writing helpers, so store updates for a run are serialized.

use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::config::{ExecutionNode, InputBinding, OperationRegistry};
use crate::engine::context::RunContext;
use crate::errors::{ExecutionError, FailureStrategy, NodeError};
use crate::observability::messages::engine::{RunCancelled, RunCompleted};
use crate::observability::messages::node::{NodeFailed, NodeSkipped, NodeStarted, NodeSucceeded};
use crate::observability::messages::StructuredLog;
use crate::store::{NodeStatus, NodeUpdate, RunSnapshot};
use crate::traits::Parameters;

/// What the engine does with a node whose turn has come.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition<'a> {
    Run,
    /// `blocked_by` is the first dependency that did not succeed; `None`
    /// means fail-fast halted the run.
    Skip { blocked_by: Option<&'a str> },
}

/// Executor-local view of a run: statuses and the outputs threaded forward.
#[derive(Debug, Default)]
pub(crate) struct RunState {
    statuses: HashMap<String, NodeStatus>,
    outputs: HashMap<String, Value>,
    any_failed: bool,
}

impl RunState {
    pub(crate) fn new(ctx: &RunContext) -> Self {
        Self {
            statuses: ctx
                .plan
                .order
                .iter()
                .map(|id| (id.clone(), NodeStatus::Pending))
                .collect(),
            outputs: HashMap::new(),
            any_failed: false,
        }
    }

    pub(crate) fn status(&self, node_id: &str) -> NodeStatus {
        self.statuses
            .get(node_id)
            .copied()
            .unwrap_or(NodeStatus::Pending)
    }

    pub(crate) fn disposition<'a>(
        &self,
        node: &'a ExecutionNode,
        strategy: FailureStrategy,
    ) -> Disposition<'a> {
        if let Some(dependency) = node
            .dependencies
            .iter()
            .find(|dep| self.status(dep) != NodeStatus::Succeeded)
        {
            return Disposition::Skip {
                blocked_by: Some(dependency.as_str()),
            };
        }
        if strategy == FailureStrategy::FailFast && self.any_failed {
            return Disposition::Skip { blocked_by: None };
        }
        Disposition::Run
    }

    /// Substitute dependency outputs into the node's bindings.
    pub(crate) fn resolve_inputs(&self, node: &ExecutionNode) -> Result<Parameters, ExecutionError> {
        let mut params = Parameters::new();
        for (name, binding) in &node.inputs {
            let value = match binding {
                InputBinding::Literal(value) => value.clone(),
                InputBinding::Output(dependency) => self
                    .outputs
                    .get(dependency)
                    .cloned()
                    .ok_or_else(|| ExecutionError::Internal {
                        message: format!(
                            "output of '{}' is not available for '{}'",
                            dependency, node.id
                        ),
                    })?,
            };
            params.insert(name.clone(), value);
        }
        Ok(params)
    }

    fn set(&mut self, node_id: &str, status: NodeStatus) {
        self.statuses.insert(node_id.to_string(), status);
    }
}

pub(crate) async fn skip_node(
    ctx: &RunContext,
    state: &mut RunState,
    node: &ExecutionNode,
    blocked_by: Option<&str>,
) -> Result<(), ExecutionError> {
    ctx.store
        .update_node_status(ctx.run_id, &node.id, NodeUpdate::Skipped)
        .await?;
    state.set(&node.id, NodeStatus::Skipped);
    NodeSkipped {
        node_id: &node.id,
        blocked_by,
    }
    .log();
    Ok(())
}

/// Mark the node `RUNNING` with the inputs it is about to be invoked with.
pub(crate) async fn start_node(
    ctx: &RunContext,
    state: &mut RunState,
    node: &ExecutionNode,
    params: Parameters,
) -> Result<(), ExecutionError> {
    ctx.store
        .update_node_status(
            ctx.run_id,
            &node.id,
            NodeUpdate::Running {
                resolved_inputs: params,
            },
        )
        .await?;
    state.set(&node.id, NodeStatus::Running);
    Ok(())
}

/// Resolve the adapter, check its contract and call it under the timeout.
///
/// Touches neither the store nor the run state, so it can run on any task.
pub(crate) async fn invoke_node(
    registry: &OperationRegistry,
    node: &ExecutionNode,
    params: Parameters,
    timeout: Option<Duration>,
) -> Result<Value, ExecutionError> {
    let adapter = registry
        .resolve(&node.operation)
        .map_err(|_| ExecutionError::UnknownOperation(node.operation.clone()))?;

    if let Some(missing) = adapter.signature().first_missing(&params) {
        return Err(ExecutionError::MissingParameter {
            operation: node.operation.clone(),
            parameter: missing.to_string(),
        });
    }

    let started = NodeStarted {
        node_id: &node.id,
        operation: &node.operation,
        parameter_count: params.len(),
    };
    started.log();
    let span = started.span("invoke");

    let call = adapter.invoke(params).instrument(span);
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ExecutionError::Timeout {
                operation: node.operation.clone(),
                timeout: limit,
            })?,
        None => call.await,
    };

    result.map_err(|source| ExecutionError::Adapter {
        operation: node.operation.clone(),
        source,
    })
}

/// Record the outcome of an invocation.
pub(crate) async fn finish_node(
    ctx: &RunContext,
    state: &mut RunState,
    node: &ExecutionNode,
    result: Result<Value, ExecutionError>,
    elapsed: Duration,
) -> Result<(), ExecutionError> {
    match result {
        Ok(output) => {
            ctx.store
                .update_node_status(
                    ctx.run_id,
                    &node.id,
                    NodeUpdate::Succeeded {
                        output: output.clone(),
                    },
                )
                .await?;
            state.set(&node.id, NodeStatus::Succeeded);
            state.outputs.insert(node.id.clone(), output);
            NodeSucceeded {
                node_id: &node.id,
                operation: &node.operation,
                duration: elapsed,
            }
            .log();
        }
        Err(ExecutionError::Store(e)) => return Err(ExecutionError::Store(e)),
        Err(error) => {
            let error = NodeError::from(&error);
            NodeFailed {
                node_id: &node.id,
                operation: &node.operation,
                error: &error,
            }
            .log();
            ctx.store
                .update_node_status(ctx.run_id, &node.id, NodeUpdate::Failed { error })
                .await?;
            state.set(&node.id, NodeStatus::Failed);
            state.any_failed = true;
        }
    }
    Ok(())
}

/// Run one node to completion on the current task.
pub(crate) async fn run_node(
    ctx: &RunContext,
    state: &mut RunState,
    node: &ExecutionNode,
) -> Result<(), ExecutionError> {
    let params = state.resolve_inputs(node)?;
    start_node(ctx, state, node, params.clone()).await?;

    let started = Instant::now();
    let result = invoke_node(&ctx.registry, node, params, ctx.options.timeout).await;
    finish_node(ctx, state, node, result, started.elapsed()).await
}

/// Cancel every node that has not started yet.
pub(crate) async fn cancel_pending(
    ctx: &RunContext,
    state: &mut RunState,
) -> Result<usize, ExecutionError> {
    let pending: Vec<String> = ctx
        .plan
        .order
        .iter()
        .filter(|id| state.status(id) == NodeStatus::Pending)
        .cloned()
        .collect();

    for id in &pending {
        ctx.store
            .update_node_status(ctx.run_id, id, NodeUpdate::Cancelled)
            .await?;
        state.set(id, NodeStatus::Cancelled);
    }

    RunCancelled {
        run_id: &ctx.run_id,
        cancelled_nodes: pending.len(),
    }
    .log();
    Ok(pending.len())
}

/// Read back the final snapshot and log the run outcome.
pub(crate) async fn finish_run(
    ctx: &RunContext,
    strategy: &str,
    started: Instant,
) -> Result<RunSnapshot, ExecutionError> {
    let snapshot = ctx.store.get(ctx.run_id).await?;
    RunCompleted {
        run_id: &ctx.run_id,
        strategy,
        status: snapshot.status,
        node_count: snapshot.nodes.len(),
        duration: started.elapsed(),
    }
    .log();
    Ok(snapshot)
}
