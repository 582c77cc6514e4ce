// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! HTTP client for the model hosting service and dataset downloads.

use reqwest::{Client, Response};
use serde_json::{json, Value};

use crate::config::consts::GOOGLE_DRIVE_DOWNLOAD_URL;
use crate::config::ModelServiceConfig;
use crate::errors::AdapterError;

/// A downloaded file: its name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub name: String,
    pub content: Vec<u8>,
}

/// Thin wrapper over the model service's deploy/delete/infer endpoints.
///
/// One client is shared by every model-service adapter so they reuse the
/// same connection pool.
#[derive(Debug, Clone)]
pub struct ModelServiceClient {
    http: Client,
    endpoint: String,
    drive_url: String,
}

impl ModelServiceClient {
    pub fn new(config: &ModelServiceConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            drive_url: GOOGLE_DRIVE_DOWNLOAD_URL.to_string(),
        })
    }

    /// Point dataset downloads somewhere other than Google Drive.
    pub fn with_drive_url(mut self, url: impl Into<String>) -> Self {
        self.drive_url = url.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deploy `model` as the service `<model>-service`.
    pub async fn deploy(&self, model: &str) -> Result<Value, AdapterError> {
        let service_name = format!("{}-service", model);
        let response = self
            .http
            .post(format!("{}/deploy", self.endpoint))
            .form(&[("model_name", model), ("service_name", service_name.as_str())])
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn delete(&self, service_name: &str) -> Result<Value, AdapterError> {
        let response = self
            .http
            .post(format!("{}/delete", self.endpoint))
            .form(&[("service_name", service_name)])
            .send()
            .await?;
        read_json(response).await
    }

    /// Run inference on base64 `payloads`.
    pub async fn infer(&self, model: &str, payloads: Vec<String>) -> Result<Value, AdapterError> {
        let response = self
            .http
            .post(format!("{}/infer", self.endpoint))
            .query(&[("model_name", model)])
            .json(&json!({ "data": payloads }))
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn download_drive_file(&self, file_id: &str) -> Result<DownloadedFile, AdapterError> {
        let response = self
            .http
            .get(&self.drive_url)
            .query(&[("export", "download"), ("id", file_id)])
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let name = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or_else(|| file_id.to_string());
        let content = response.bytes().await?.to_vec();

        tracing::debug!(file_id, name = %name, bytes = content.len(), "Downloaded dataset file");
        Ok(DownloadedFile { name, content })
    }
}

async fn ensure_success(response: Response) -> Result<Response, AdapterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AdapterError::Remote {
        status: status.as_u16(),
        body,
    })
}

async fn read_json(response: Response) -> Result<Value, AdapterError> {
    let response = ensure_success(response).await?;
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text)
        .map_err(|e| AdapterError::Failed(format!("model service returned invalid JSON: {}", e)))
}

/// File name from a `Content-Disposition: attachment; filename="..."` header.
fn attachment_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_filename() {
        let cases = vec![
            ("attachment; filename=\"images.zip\"", Some("images.zip")),
            ("attachment;filename=data.csv", Some("data.csv")),
            ("inline", None),
            ("attachment; filename=\"\"", None),
        ];
        for (header, expected) in cases {
            assert_eq!(
                attachment_filename(header).as_deref(),
                expected,
                "header: {}",
                header
            );
        }
    }

    #[test]
    fn test_endpoint_is_normalized() {
        let config = ModelServiceConfig {
            endpoint: "http://model_api:8000/".into(),
            ..ModelServiceConfig::default()
        };
        let client = ModelServiceClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://model_api:8000");
    }
}
