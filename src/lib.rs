// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // operation adapters
pub mod config;     // payload parsing, registry, settings
pub mod engine;     // resolver and DAG executors
pub mod errors;     // error handling
pub mod observability;
pub mod service;    // submission and query front door
pub mod store;      // run status store
pub mod traits;     // unified abstractions
