// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AdapterError;
use crate::traits::{json_type, Adapter, OperationSignature, Parameters};

/// Turns an object into the list of its values.
///
/// Values come out in key order (serde_json maps are sorted), which keeps
/// the output stable across runs. Lists pass through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DictToList;

#[async_trait]
impl Adapter for DictToList {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError> {
        match params.get("data") {
            Some(Value::Object(map)) => Ok(Value::Array(map.values().cloned().collect())),
            Some(Value::Array(items)) => Ok(Value::Array(items.clone())),
            Some(other) => Err(AdapterError::invalid(
                "data",
                format!("expected an object, got {}", json_type(other)),
            )),
            None => Err(AdapterError::invalid("data", "missing")),
        }
    }

    fn signature(&self) -> OperationSignature {
        OperationSignature::new(&["data"], "list")
    }
}
