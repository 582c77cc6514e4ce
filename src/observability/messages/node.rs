// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the lifecycle of a single node.

use crate::errors::NodeError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// An adapter is about to be invoked.
///
/// # Log Level
/// `debug!`
pub struct NodeStarted<'a> {
    pub node_id: &'a str,
    pub operation: &'a str,
    pub parameter_count: usize,
}

impl Display for NodeStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' started: operation={}, parameters={}",
            self.node_id, self.operation, self.parameter_count
        )
    }
}

impl StructuredLog for NodeStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            operation = self.operation,
            parameter_count = self.parameter_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node",
            span_name = name,
            node_id = self.node_id,
            operation = self.operation,
        )
    }
}

/// # Log Level
/// `info!`
pub struct NodeSucceeded<'a> {
    pub node_id: &'a str,
    pub operation: &'a str,
    pub duration: Duration,
}

impl Display for NodeSucceeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' ({}) succeeded in {:?}",
            self.node_id, self.operation, self.duration
        )
    }
}

impl StructuredLog for NodeSucceeded<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            operation = self.operation,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_succeeded",
            span_name = name,
            node_id = self.node_id,
            duration = ?self.duration,
        )
    }
}

/// The node's adapter failed, timed out, or could not be resolved.
///
/// # Log Level
/// `warn!` - the run continues; only dependents are affected
pub struct NodeFailed<'a> {
    pub node_id: &'a str,
    pub operation: &'a str,
    pub error: &'a NodeError,
}

impl Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' ({}) failed: {}",
            self.node_id, self.operation, self.error.message
        )
    }
}

impl StructuredLog for NodeFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            operation = self.operation,
            kind = ?self.error.kind,
            error = %self.error.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "node_failed",
            span_name = name,
            node_id = self.node_id,
            kind = ?self.error.kind,
        )
    }
}

/// The node will not run.
///
/// `blocked_by` names the failed or skipped dependency; `None` means the run
/// is failing fast after an unrelated failure.
///
/// # Log Level
/// `info!`
pub struct NodeSkipped<'a> {
    pub node_id: &'a str,
    pub blocked_by: Option<&'a str>,
}

impl Display for NodeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.blocked_by {
            Some(dependency) => write!(
                f,
                "Node '{}' skipped: dependency '{}' did not succeed",
                self.node_id, dependency
            ),
            None => write!(
                f,
                "Node '{}' skipped: run is failing fast",
                self.node_id
            ),
        }
    }
}

impl StructuredLog for NodeSkipped<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            blocked_by = self.blocked_by,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_skipped",
            span_name = name,
            node_id = self.node_id,
            blocked_by = self.blocked_by,
        )
    }
}
