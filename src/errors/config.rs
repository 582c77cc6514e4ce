// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised before any node runs: malformed payloads, structural DAG
//! problems and unreadable settings files.

use thiserror::Error;

/// A configuration payload could not be turned into execution nodes.
///
/// `path` fields use a JSONPath-like notation (`raw_input[0].parameters.data`)
/// so that an LLM-produced payload can be corrected precisely.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("configuration payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("configuration is missing the 'raw_input' field")]
    MissingRawInput,

    #[error("'raw_input' must be a descriptor object or a list of descriptors")]
    InvalidRawInput,

    #[error("configuration contains no operations")]
    EmptyConfiguration,

    #[error("{path}: expected an operation descriptor object")]
    NotADescriptor { path: String },

    #[error("{path}: descriptor is missing the 'operation' key")]
    MissingOperation { path: String },

    #[error("{path}: unknown descriptor key '{key}' (expected 'operation', 'parameters' or 'id')")]
    UnknownDescriptorKey { path: String, key: String },

    #[error("{path}: 'operation' must be a non-empty string")]
    InvalidOperationName { path: String },

    #[error("{path}: 'parameters' must be an object")]
    InvalidParameters { path: String },

    #[error("{path}: 'id' must be a non-empty string")]
    InvalidNodeId { path: String },

    #[error("{path}: 'ref' must be a non-empty string")]
    InvalidReference { path: String },

    #[error("{path}: value is neither a literal nor an operation descriptor")]
    InvalidParameterValue { path: String },

    #[error("duplicate node id '{id}'")]
    DuplicateNodeId { id: String },
}

/// Structural problems in an otherwise well-formed configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A chain of references leads back to where it started.
    #[error("Cyclic dependency detected: {}", cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    /// A node consumes the output of a node that does not exist.
    #[error("Node '{node_id}' depends on '{missing_dependency}' which does not exist")]
    DanglingReference {
        node_id: String,
        missing_dependency: String,
    },
}

/// Service settings could not be loaded.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported settings format '{0}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),
}
