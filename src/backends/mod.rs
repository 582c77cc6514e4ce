// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Adapter implementations behind the operation registry.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process table and data shaping operations:
//! `dict_to_list`, `mock_csv_data`, `math_block`, `write_csv`.
//!
//! ## Model Service Backend
//! HTTP calls to the model hosting service plus dataset download:
//! `deploy_model`, `delete_model`, `model_inference`,
//! `import_from_google_drive`.
//!
//! ## Stub Backend (Test-Only)
//! Canned, failing, counting, slow and recording adapters for engine tests.
//! Not available in production builds.
//!
//! Storage operations such as `import_from_s3` or `export_to_s3` are left to
//! the deployment; register them on the [`OperationRegistry`] before
//! building the service.

pub mod local;
pub mod model_service;
#[cfg(test)]
pub mod stub;

use std::sync::Arc;

use crate::config::{ModelServiceConfig, OperationRegistry};
use crate::errors::PipelineError;
use local::LocalAdapterFactory;
use model_service::ModelServiceClient;

/// Registry with every built-in adapter.
pub fn builtin_registry(model_service: &ModelServiceConfig) -> Result<OperationRegistry, PipelineError> {
    let mut registry = OperationRegistry::new();
    LocalAdapterFactory::register_all(&mut registry)?;

    let client = Arc::new(ModelServiceClient::new(model_service)?);
    model_service::register_all(&mut registry, client)?;
    Ok(registry)
}
