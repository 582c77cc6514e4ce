// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_MODEL_SERVICE_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_RUN_STORE_DIR,
    FALLBACK_MAX_CONCURRENCY,
};
use crate::errors::{FailureStrategy, SettingsError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service settings: how runs are executed and where their state lives.
///
/// Every section is optional; an empty file yields the defaults.
///
/// # Example
/// ```yaml
/// strategy: level
/// failure_strategy: continue_on_error
/// executor_options:
///   max_concurrency: 4
///   timeout_seconds: 30
/// model_service:
///   endpoint: http://model_api:8000
///   request_timeout_seconds: 120
/// store:
///   backend: file
///   path: /var/lib/pipeline/runs
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub strategy: Strategy,
    pub failure_strategy: FailureStrategy,
    pub executor_options: ExecutorOptions,
    pub model_service: ModelServiceConfig,
    pub store: StoreConfig,
}

impl Settings {
    pub fn from_yaml_str(text: &str) -> Result<Self, SettingsError> {
        // serde_yaml reads an empty document as unit, not as an empty map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }
}

/// Execution strategy for a run.
///
/// * `Sequential` - one node at a time in resolved order
/// * `Level` - every node of a dependency level concurrently
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Sequential,
    Level,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
    /// Per adapter invocation.
    pub timeout_seconds: Option<u64>,
}

impl ExecutorOptions {
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_MAX_CONCURRENCY)
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelServiceConfig {
    pub endpoint: String,
    pub request_timeout_seconds: u64,
}

impl Default for ModelServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_MODEL_SERVICE_ENDPOINT.to_string(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

impl ModelServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory for the file backend.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from(DEFAULT_RUN_STORE_DIR),
        }
    }
}

/// Load settings from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, SettingsError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "yaml" | "yml" => Settings::from_yaml_str(&fs::read_to_string(path)?),
        "toml" => Settings::from_toml_str(&fs::read_to_string(path)?),
        _ => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
    }
}
