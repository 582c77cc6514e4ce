// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::RegistryError;
use crate::traits::{Adapter, OperationSignature};

/// Catalog mapping operation names to their adapters.
///
/// Built once at startup and shared read-only (`Arc<OperationRegistry>`) by
/// every run. Only the execution engine resolves names against it, so an
/// unknown operation fails the node that uses it rather than the submission.
///
/// ```
/// use std::sync::Arc;
/// use pipeline_resolver::backends::local::DictToList;
/// use pipeline_resolver::config::OperationRegistry;
///
/// let mut registry = OperationRegistry::new();
/// registry.register("dict_to_list", Arc::new(DictToList)).unwrap();
///
/// assert!(registry.contains("dict_to_list"));
/// assert!(registry.register("dict_to_list", Arc::new(DictToList)).is_err());
/// assert!(registry.resolve("export_to_s3").is_err());
/// ```
#[derive(Clone, Default)]
pub struct OperationRegistry(HashMap<String, Arc<dyn Adapter>>);

impl OperationRegistry {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Register `adapter` under `name`. Names are unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        adapter: Arc<dyn Adapter>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.0.contains_key(&name) {
            return Err(RegistryError::DuplicateOperation(name));
        }
        self.0.insert(name, adapter);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Adapter>, RegistryError> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownOperation(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `(name, signature)` pairs sorted by name.
    pub fn signatures(&self) -> Vec<(&str, OperationSignature)> {
        self.names()
            .into_iter()
            .filter_map(|name| self.0.get(name).map(|adapter| (name, adapter.signature())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operation_count", &self.0.len())
            .field("operations", &self.names())
            .finish()
    }
}
