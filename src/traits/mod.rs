// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod adapter;
pub mod executor;

pub use adapter::{json_type, number_param, string_param, Adapter, OperationSignature, Parameters};
pub use executor::DagExecutor;
