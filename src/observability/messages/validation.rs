// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for rejected submissions:
//! * malformed configuration payloads
//! * cyclic dependencies
//! * references to nodes that do not exist

use crate::errors::{ParseError, ValidationError};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The payload could not be parsed into nodes.
///
/// # Log Level
/// `warn!` - bad input, not a fault of the service
///
/// # Example
/// ```
/// use pipeline_resolver::errors::ParseError;
/// use pipeline_resolver::observability::messages::validation::ConfigurationRejected;
///
/// let error = ParseError::MissingRawInput;
/// let msg = ConfigurationRejected { error: &error };
/// assert_eq!(
///     msg.to_string(),
///     "Configuration rejected: configuration is missing the 'raw_input' field"
/// );
/// ```
pub struct ConfigurationRejected<'a> {
    pub error: &'a ParseError,
}

impl Display for ConfigurationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration rejected: {}", self.error)
    }
}

impl StructuredLog for ConfigurationRejected<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::WARN,
            "configuration_rejected",
            span_name = name,
            error = %self.error,
        )
    }
}

/// Cyclic dependency detected in a submission.
///
/// # Log Level
/// `error!`
///
/// # Example
/// ```
/// use pipeline_resolver::observability::messages::validation::CyclicDependencyDetected;
///
/// let cycle = vec!["a".to_string(), "b".to_string(), "a".to_string()];
/// let msg = CyclicDependencyDetected { cycle: &cycle };
///
/// assert_eq!(msg.to_string(), "Cyclic dependency detected: a -> b -> a");
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "cyclic_dependency",
            span_name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A node consumes the output of a node that does not exist.
///
/// # Log Level
/// `error!`
pub struct DanglingReferenceDetected<'a> {
    pub node_id: &'a str,
    pub missing_dependency: &'a str,
}

impl Display for DanglingReferenceDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' references missing node '{}'",
            self.node_id, self.missing_dependency
        )
    }
}

impl StructuredLog for DanglingReferenceDetected<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            missing_dependency = self.missing_dependency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "dangling_reference",
            span_name = name,
            node_id = self.node_id,
            missing_dependency = self.missing_dependency,
        )
    }
}

/// Log every validation error with its dedicated message type.
pub fn log_validation_errors(errors: &[ValidationError]) {
    for error in errors {
        match error {
            ValidationError::CycleDetected { cycle } => {
                CyclicDependencyDetected { cycle }.log();
            }
            ValidationError::DanglingReference {
                node_id,
                missing_dependency,
            } => {
                DanglingReferenceDetected {
                    node_id,
                    missing_dependency,
                }
                .log();
            }
        }
    }
}
