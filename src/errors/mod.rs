// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod registry;
mod store;

use thiserror::Error;

use crate::store::RunId;

pub use config::{ParseError, SettingsError, ValidationError};
pub use execution::{
    AdapterError, ExecutionError, FailureStrategy, NodeError, NodeErrorKind,
};
pub use registry::RegistryError;
pub use store::StoreError;

/// Everything a submitter or the service setup can get back instead of a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] ParseError),

    #[error("configuration validation failed:\n{}", join_lines(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("run '{0}' is still in progress")]
    RunInProgress(RunId),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl From<Vec<ValidationError>> for PipelineError {
    fn from(errors: Vec<ValidationError>) -> Self {
        PipelineError::Validation(errors)
    }
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
