// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::adapters::*;
use crate::config::OperationRegistry;
use crate::errors::RegistryError;
use crate::traits::Adapter;

/// Factory for the local (in-process) adapters.
pub struct LocalAdapterFactory;

impl LocalAdapterFactory {
    /// Create the adapter registered under `operation`.
    pub fn create_adapter(operation: &str) -> Option<Arc<dyn Adapter>> {
        match operation {
            "dict_to_list" => Some(Arc::new(DictToList)),
            "mock_csv_data" => Some(Arc::new(MockCsvData)),
            "math_block" => Some(Arc::new(MathBlock)),
            "write_csv" => Some(Arc::new(WriteCsv)),
            _ => None,
        }
    }

    /// List all available local operations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec!["dict_to_list", "mock_csv_data", "math_block", "write_csv"]
    }

    /// Register every local adapter under its operation name.
    pub fn register_all(registry: &mut OperationRegistry) -> Result<(), RegistryError> {
        for name in Self::list_available_implementations() {
            if let Some(adapter) = Self::create_adapter(name) {
                registry.register(name, adapter)?;
            }
        }
        Ok(())
    }
}
