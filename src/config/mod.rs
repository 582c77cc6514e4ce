// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod entry_points;
mod loader;
mod operation_registry;
mod pipeline;
mod runtime;
mod validation;

pub mod consts;

pub use dependency_graph::DependencyGraph;
pub use entry_points::EntryPoints;
pub use loader::{
    load_settings, ExecutorOptions, ModelServiceConfig, Settings, StoreBackend, StoreConfig,
    Strategy,
};
pub use operation_registry::OperationRegistry;
pub use pipeline::{
    parse_payload, parse_pipeline, parse_pipeline_str, ExecutionNode, InputBinding,
    PipelineGraph, ID_KEY, OPERATION_KEY, PARAMETERS_KEY, RAW_INPUT_KEY, REF_KEY,
};
pub use runtime::{Runtime, RuntimeBuilder};
pub use validation::validate_pipeline_graph;
