// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::builtin_registry;
use crate::config::{OperationRegistry, Settings, StoreBackend, StoreConfig};
use crate::engine::{ExecutorFactory, RunOptions};
use crate::errors::{PipelineError, StoreError};
use crate::store::{FileRunStore, InMemoryRunStore, RunStore};
use crate::traits::DagExecutor;

/// Everything a [`PipelineService`](crate::service::PipelineService) runs on.
pub struct Runtime {
    pub registry: OperationRegistry,
    pub executor: Box<dyn DagExecutor>,
    pub store: Arc<dyn RunStore>,
    pub options: RunOptions,
}

impl Runtime {
    /// Replace the adapter catalog, e.g. to add deployment-specific operations.
    pub fn with_registry(mut self, registry: OperationRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("registry", &self.registry)
            .field("strategy", &self.executor.strategy_name())
            .field("max_concurrency", &self.executor.max_concurrency())
            .field("options", &self.options)
            .finish()
    }
}

/// Runtime builder - wires registry, executor and run store from settings.
///
/// # Examples
///
/// ```
/// use pipeline_resolver::config::{RuntimeBuilder, Settings, Strategy};
///
/// # #[tokio::main]
/// # async fn main() {
/// let settings = Settings { strategy: Strategy::Level, ..Settings::default() };
/// let runtime = RuntimeBuilder::from_settings(&settings).await.unwrap();
///
/// assert_eq!(runtime.executor.strategy_name(), "level");
/// assert!(runtime.registry.contains("dict_to_list"));
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub async fn from_settings(settings: &Settings) -> Result<Runtime, PipelineError> {
        let registry = builtin_registry(&settings.model_service)?;
        let executor = ExecutorFactory::from_settings(settings);
        let store = Self::build_store(&settings.store).await?;
        let options = RunOptions {
            failure_strategy: settings.failure_strategy,
            timeout: settings.executor_options.timeout(),
        };

        Ok(Runtime {
            registry,
            executor,
            store,
            options,
        })
    }

    pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn RunStore>, StoreError> {
        Ok(match config.backend {
            StoreBackend::Memory => Arc::new(InMemoryRunStore::new()),
            StoreBackend::File => Arc::new(FileRunStore::open(&config.path).await?),
        })
    }
}
