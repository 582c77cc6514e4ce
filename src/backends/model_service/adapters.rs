// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Value};
use std::io::{Cursor, Read};
use std::sync::Arc;
use zip::ZipArchive;

use super::client::ModelServiceClient;
use crate::errors::AdapterError;
use crate::traits::{json_type, string_param, Adapter, OperationSignature, Parameters};

/// `deploy_model(model)`
pub struct DeployModel {
    client: Arc<ModelServiceClient>,
}

impl DeployModel {
    pub fn new(client: Arc<ModelServiceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Adapter for DeployModel {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError> {
        let model = string_param(&params, "model")?;
        self.client.deploy(model).await
    }

    fn signature(&self) -> OperationSignature {
        OperationSignature::new(&["model"], "deployment")
    }
}

/// `delete_model(service_name | model)`
///
/// Given only `model`, the service deployed by `deploy_model` for it
/// (`<model>-service`) is deleted.
pub struct DeleteModel {
    client: Arc<ModelServiceClient>,
}

impl DeleteModel {
    pub fn new(client: Arc<ModelServiceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Adapter for DeleteModel {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError> {
        let service_name = if params.contains_key("service_name") {
            string_param(&params, "service_name")?.to_string()
        } else if params.contains_key("model") {
            format!("{}-service", string_param(&params, "model")?)
        } else {
            return Err(AdapterError::invalid(
                "service_name",
                "either 'service_name' or 'model' is required",
            ));
        };
        self.client.delete(&service_name).await
    }

    fn signature(&self) -> OperationSignature {
        OperationSignature::new(&[], "deletion").with_optional(&["service_name", "model"])
    }
}

/// `model_inference(model, data)`
pub struct ModelInference {
    client: Arc<ModelServiceClient>,
}

impl ModelInference {
    pub fn new(client: Arc<ModelServiceClient>) -> Self {
        Self { client }
    }
}

/// Base64 payloads for the inference endpoint.
///
/// Strings already are base64 text; anything else is sent as base64 JSON.
fn inference_payloads(data: &Value) -> Result<Vec<String>, AdapterError> {
    let items = match data {
        Value::Array(items) => items,
        other => {
            return Err(AdapterError::invalid(
                "data",
                format!("expected a list, got {}", json_type(other)),
            ))
        }
    };
    Ok(items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => BASE64.encode(other.to_string()),
        })
        .collect())
}

#[async_trait]
impl Adapter for ModelInference {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError> {
        let model = string_param(&params, "model")?;
        let data = params
            .get("data")
            .ok_or_else(|| AdapterError::invalid("data", "missing"))?;
        let payloads = inference_payloads(data)?;
        self.client.infer(model, payloads).await
    }

    fn signature(&self) -> OperationSignature {
        OperationSignature::new(&["model", "data"], "results")
    }
}

/// `import_from_google_drive(file_id)`
///
/// The download is a zip archive; the output maps each file's path inside
/// the archive to its base64 content. Directory entries are skipped.
pub struct ImportFromGoogleDrive {
    client: Arc<ModelServiceClient>,
}

impl ImportFromGoogleDrive {
    pub fn new(client: Arc<ModelServiceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Adapter for ImportFromGoogleDrive {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError> {
        let file_id = string_param(&params, "file_id")?;
        let file = self.client.download_drive_file(file_id).await?;

        let files = tokio::task::spawn_blocking(move || extract_archive(&file.content))
            .await
            .map_err(|e| AdapterError::Failed(format!("archive extraction did not complete: {}", e)))??;

        tracing::debug!(file_id, entries = files.len(), "Extracted dataset archive");
        Ok(Value::Object(files))
    }

    fn signature(&self) -> OperationSignature {
        OperationSignature::new(&["file_id"], "files")
    }
}

/// `{ "<path in archive>": "<base64 content>" }` for every file in a zip.
fn extract_archive(bytes: &[u8]) -> Result<Map<String, Value>, AdapterError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut files = Map::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let path = entry
            .enclosed_name()
            .map(|path| path.to_string_lossy().replace('\\', "/"))
            .ok_or_else(|| {
                AdapterError::Failed(format!(
                    "archive entry '{}' escapes the archive root",
                    entry.name()
                ))
            })?;

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        files.insert(path, Value::String(BASE64.encode(&content)));
    }
    Ok(files)
}
