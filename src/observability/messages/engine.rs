// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for run lifecycle events:
//! * submission and plan resolution
//! * executor start and completion
//! * cancellation and aborted runs

use crate::observability::messages::StructuredLog;
use crate::store::{RunId, RunStatus};
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A configuration was accepted and a run was created.
///
/// # Log Level
/// `info!`
///
/// # Example
/// ```
/// use pipeline_resolver::observability::messages::engine::RunSubmitted;
/// use pipeline_resolver::store::RunId;
///
/// let run_id = RunId::new();
/// let msg = RunSubmitted { run_id: &run_id, node_count: 3 };
/// assert!(msg.to_string().contains("3 nodes"));
/// ```
pub struct RunSubmitted<'a> {
    pub run_id: &'a RunId,
    pub node_count: usize,
}

impl Display for RunSubmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Run {} submitted with {} nodes", self.run_id, self.node_count)
    }
}

impl StructuredLog for RunSubmitted<'_> {
    fn log(&self) {
        tracing::info!(
            run_id = %self.run_id,
            node_count = self.node_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_submitted",
            span_name = name,
            run_id = %self.run_id,
            node_count = self.node_count,
        )
    }
}

/// Topological order and levels were computed.
///
/// # Log Level
/// `debug!`
pub struct ExecutionPlanResolved {
    pub node_count: usize,
    pub level_count: usize,
}

impl Display for ExecutionPlanResolved {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Resolved execution plan: {} nodes in {} levels",
            self.node_count, self.level_count
        )
    }
}

impl StructuredLog for ExecutionPlanResolved {
    fn log(&self) {
        tracing::debug!(
            node_count = self.node_count,
            level_count = self.level_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "plan_resolved",
            span_name = name,
            node_count = self.node_count,
            level_count = self.level_count,
        )
    }
}

/// An executor started working on a run.
///
/// # Log Level
/// `info!`
///
/// # Example
/// ```
/// use pipeline_resolver::observability::messages::engine::RunStarted;
/// use pipeline_resolver::store::RunId;
///
/// let run_id = RunId::new();
/// let msg = RunStarted {
///     run_id: &run_id,
///     strategy: "sequential",
///     node_count: 5,
///     max_concurrency: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunStarted<'a> {
    pub run_id: &'a RunId,
    pub strategy: &'a str,
    pub node_count: usize,
    pub max_concurrency: usize,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting run {} with {} strategy: {} nodes, max_concurrency={}",
            self.run_id, self.strategy, self.node_count, self.max_concurrency
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            run_id = %self.run_id,
            strategy = self.strategy,
            node_count = self.node_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            run_id = %self.run_id,
            strategy = self.strategy,
        )
    }
}

/// Every node of a run reached a terminal state.
///
/// # Log Level
/// `info!` when the run succeeded, `warn!` otherwise
pub struct RunCompleted<'a> {
    pub run_id: &'a RunId,
    pub strategy: &'a str,
    pub status: RunStatus,
    pub node_count: usize,
    pub duration: std::time::Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run {} finished with status {:?} ({} strategy): {} nodes in {:?}",
            self.run_id, self.status, self.strategy, self.node_count, self.duration
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        let duration_ms = self.duration.as_millis() as u64;
        if self.status == RunStatus::Succeeded {
            tracing::info!(
                run_id = %self.run_id,
                strategy = self.strategy,
                status = ?self.status,
                node_count = self.node_count,
                duration_ms,
                "{}", self
            );
        } else {
            tracing::warn!(
                run_id = %self.run_id,
                strategy = self.strategy,
                status = ?self.status,
                node_count = self.node_count,
                duration_ms,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            run_id = %self.run_id,
            status = ?self.status,
            duration = ?self.duration,
        )
    }
}

/// Cancellation reached the executor; pending nodes were cancelled.
///
/// # Log Level
/// `warn!`
pub struct RunCancelled<'a> {
    pub run_id: &'a RunId,
    pub cancelled_nodes: usize,
}

impl Display for RunCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run {} cancelled: {} pending nodes will not run",
            self.run_id, self.cancelled_nodes
        )
    }
}

impl StructuredLog for RunCancelled<'_> {
    fn log(&self) {
        tracing::warn!(
            run_id = %self.run_id,
            cancelled_nodes = self.cancelled_nodes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "run_cancelled",
            span_name = name,
            run_id = %self.run_id,
            cancelled_nodes = self.cancelled_nodes,
        )
    }
}

/// The executor could not continue (store failure, panicked task).
///
/// # Log Level
/// `error!`
///
/// # Example
/// ```
/// use pipeline_resolver::observability::messages::engine::RunAborted;
/// use pipeline_resolver::store::RunId;
///
/// let run_id = RunId::new();
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
/// let msg = RunAborted { run_id: &run_id, error: &error };
/// assert!(msg.to_string().ends_with("disk full"));
/// ```
pub struct RunAborted<'a> {
    pub run_id: &'a RunId,
    pub error: &'a dyn std::error::Error,
}

impl Display for RunAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Run {} aborted: {}", self.run_id, self.error)
    }
}

impl StructuredLog for RunAborted<'_> {
    fn log(&self) {
        tracing::error!(
            run_id = %self.run_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "run_aborted",
            span_name = name,
            run_id = %self.run_id,
            error = %self.error,
        )
    }
}

/// A dependency level is about to be dispatched.
///
/// # Log Level
/// `debug!`
pub struct LevelStarted {
    pub level: usize,
    pub node_count: usize,
}

impl Display for LevelStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dispatching level {} ({} nodes)", self.level, self.node_count)
    }
}

impl StructuredLog for LevelStarted {
    fn log(&self) {
        tracing::debug!(level = self.level, node_count = self.node_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "level",
            span_name = name,
            level = self.level,
            node_count = self.node_count,
        )
    }
}
