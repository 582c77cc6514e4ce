// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{NodeError, StoreError};
use crate::traits::Parameters;

/// Identifier assigned to a run at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
    Cancelled,
}

impl NodeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NodeStatus::Succeeded | NodeStatus::Failed | NodeStatus::Skipped | NodeStatus::Cancelled
        )
    }

    /// Whether a node in this state can move to `next`.
    ///
    /// Only `PENDING -> RUNNING -> {SUCCEEDED, FAILED}` and
    /// `PENDING -> {SKIPPED, CANCELLED}` are legal; nothing returns to `PENDING`.
    pub fn can_transition_to(self, next: NodeStatus) -> bool {
        use NodeStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Skipped)
                | (Pending, Cancelled)
                | (Running, Succeeded)
                | (Running, Failed)
        )
    }
}

/// Aggregate state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn aggregate(statuses: impl IntoIterator<Item = NodeStatus>) -> Self {
        let mut all_pending = true;
        let mut all_terminal = true;
        let mut all_succeeded = true;
        for status in statuses {
            all_pending &= status == NodeStatus::Pending;
            all_terminal &= status.is_terminal();
            all_succeeded &= status == NodeStatus::Succeeded;
        }

        if all_terminal {
            if all_succeeded {
                RunStatus::Succeeded
            } else {
                RunStatus::Failed
            }
        } else if all_pending {
            RunStatus::Pending
        } else {
            RunStatus::Running
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed)
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RunStatus::Pending),
            "RUNNING" => Ok(RunStatus::Running),
            "SUCCEEDED" => Ok(RunStatus::Succeeded),
            "FAILED" => Ok(RunStatus::Failed),
            other => Err(format!("unknown run status '{}'", other)),
        }
    }
}

/// A state change for one node, carrying the payload that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeUpdate {
    Running { resolved_inputs: Parameters },
    Succeeded { output: Value },
    Failed { error: NodeError },
    Skipped,
    Cancelled,
}

impl NodeUpdate {
    pub fn status(&self) -> NodeStatus {
        match self {
            NodeUpdate::Running { .. } => NodeStatus::Running,
            NodeUpdate::Succeeded { .. } => NodeStatus::Succeeded,
            NodeUpdate::Failed { .. } => NodeStatus::Failed,
            NodeUpdate::Skipped => NodeStatus::Skipped,
            NodeUpdate::Cancelled => NodeStatus::Cancelled,
        }
    }
}

/// Per-node part of a [`RunSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub operation: String,
    pub dependencies: Vec<String>,
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_inputs: Option<Parameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<NodeError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl NodeRecord {
    pub fn pending(
        id: impl Into<String>,
        operation: impl Into<String>,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            operation: operation.into(),
            dependencies,
            status: NodeStatus::Pending,
            resolved_inputs: None,
            output: None,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }
}

/// Everything a caller can learn about a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: RunId,
    pub status: RunStatus,
    /// Set once any node was cancelled.
    pub cancelled: bool,
    /// Node ids in execution order.
    pub order: Vec<String>,
    /// Top-level node ids in submission order.
    pub roots: Vec<String>,
    /// Node records in execution order.
    pub nodes: Vec<NodeRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunSnapshot {
    pub fn new(run_id: RunId, roots: Vec<String>, nodes: Vec<NodeRecord>) -> Self {
        let now = Utc::now();
        let order = nodes.iter().map(|n| n.id.clone()).collect();
        let mut snapshot = Self {
            run_id,
            status: RunStatus::Pending,
            cancelled: false,
            order,
            roots,
            nodes,
            created_at: now,
            updated_at: now,
        };
        snapshot.refresh_status();
        snapshot
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply `update` to `node_id`.
    ///
    /// Returns `Ok(false)` when the node already has the requested status,
    /// in which case nothing is modified.
    pub fn apply(&mut self, node_id: &str, update: NodeUpdate) -> Result<bool, StoreError> {
        let run_id = self.run_id;
        let record = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| StoreError::NodeNotFound {
                run_id,
                node_id: node_id.to_string(),
            })?;

        let next = update.status();
        if record.status == next {
            return Ok(false);
        }
        if !record.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                node_id: node_id.to_string(),
                from: record.status,
                to: next,
            });
        }

        let now = Utc::now();
        match update {
            NodeUpdate::Running { resolved_inputs } => {
                record.resolved_inputs = Some(resolved_inputs);
                record.started_at = Some(now);
            }
            NodeUpdate::Succeeded { output } => {
                record.output = Some(output);
                record.finished_at = Some(now);
            }
            NodeUpdate::Failed { error } => {
                record.error = Some(error);
                record.finished_at = Some(now);
            }
            NodeUpdate::Skipped | NodeUpdate::Cancelled => {
                record.finished_at = Some(now);
            }
        }
        record.status = next;

        self.updated_at = now;
        self.refresh_status();
        Ok(true)
    }

    fn refresh_status(&mut self) {
        self.status = RunStatus::aggregate(self.nodes.iter().map(|n| n.status));
        self.cancelled = self.nodes.iter().any(|n| n.status == NodeStatus::Cancelled);
    }
}
