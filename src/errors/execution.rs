// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::errors::StoreError;

/// How the engine reacts when a node fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Only the failed node's dependents are skipped; unrelated branches keep running.
    #[default]
    ContinueOnError,
    /// The first failure skips every node that has not started yet.
    FailFast,
}

/// Failure reported by an adapter implementation.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("remote service returned status {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("{0}")]
    Failed(String),
}

impl AdapterError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while executing a run.
///
/// The node-level variants (`UnknownOperation`, `MissingParameter`, `Adapter`,
/// `Timeout`) are recorded as a node's terminal state and never escape the
/// engine. `Store` and `Internal` abort the run.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("operation '{operation}' requires parameter '{parameter}'")]
    MissingParameter { operation: String, parameter: String },

    #[error("operation '{operation}' failed: {source}")]
    Adapter {
        operation: String,
        #[source]
        source: AdapterError,
    },

    #[error("operation '{operation}' timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("run store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal engine error: {message}")]
    Internal { message: String },
}

/// Category of a node failure as it appears in a run snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeErrorKind {
    UnknownOperation,
    MissingParameter,
    Adapter,
    Timeout,
    Internal,
}

/// Serializable error payload attached to a `FAILED` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeError {
    pub kind: NodeErrorKind,
    pub message: String,
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl From<&ExecutionError> for NodeError {
    fn from(error: &ExecutionError) -> Self {
        let kind = match error {
            ExecutionError::UnknownOperation(_) => NodeErrorKind::UnknownOperation,
            ExecutionError::MissingParameter { .. } => NodeErrorKind::MissingParameter,
            ExecutionError::Adapter { .. } => NodeErrorKind::Adapter,
            ExecutionError::Timeout { .. } => NodeErrorKind::Timeout,
            ExecutionError::Store(_) | ExecutionError::Internal { .. } => NodeErrorKind::Internal,
        };
        NodeError {
            kind,
            message: error.to_string(),
        }
    }
}
