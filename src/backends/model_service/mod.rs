// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Adapters backed by the remote model hosting service.

pub mod adapters;
pub mod client;

use std::sync::Arc;

pub use adapters::{DeleteModel, DeployModel, ImportFromGoogleDrive, ModelInference};
pub use client::{DownloadedFile, ModelServiceClient};

use crate::config::OperationRegistry;
use crate::errors::RegistryError;

/// Operation names served by this backend.
pub const OPERATIONS: [&str; 4] = [
    "deploy_model",
    "delete_model",
    "model_inference",
    "import_from_google_drive",
];

/// Register every model-service adapter, sharing one client.
pub fn register_all(
    registry: &mut OperationRegistry,
    client: Arc<ModelServiceClient>,
) -> Result<(), RegistryError> {
    registry.register("deploy_model", Arc::new(DeployModel::new(client.clone())))?;
    registry.register("delete_model", Arc::new(DeleteModel::new(client.clone())))?;
    registry.register("model_inference", Arc::new(ModelInference::new(client.clone())))?;
    registry.register(
        "import_from_google_drive",
        Arc::new(ImportFromGoogleDrive::new(client)),
    )?;
    Ok(())
}
