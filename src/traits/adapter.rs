// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::AdapterError;

/// Resolved parameter values handed to an adapter.
pub type Parameters = Map<String, Value>;

/// Static description of what an adapter expects and produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSignature {
    /// Parameters that must be present after resolution.
    pub required: &'static [&'static str],
    /// Parameters the adapter understands but can do without.
    pub optional: &'static [&'static str],
    /// Human readable shape of the output (`"list"`, `"endpoint_ref"`, ...).
    pub returns: &'static str,
}

impl OperationSignature {
    pub const fn new(required: &'static [&'static str], returns: &'static str) -> Self {
        Self {
            required,
            optional: &[],
            returns,
        }
    }

    pub const fn with_optional(self, optional: &'static [&'static str]) -> Self {
        Self { optional, ..self }
    }

    /// First required parameter absent from `params`, if any.
    pub fn first_missing(&self, params: &Parameters) -> Option<&'static str> {
        self.required
            .iter()
            .copied()
            .find(|name| !params.contains_key(*name))
    }
}

/// An operation implementation.
///
/// Adapters are stateless from the engine's point of view: every side effect
/// (deploying a container, writing a file) is the adapter's own business.
#[async_trait]
pub trait Adapter: Send + Sync {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError>;

    fn signature(&self) -> OperationSignature;
}

/// Fetch a required string parameter.
pub fn string_param<'a>(params: &'a Parameters, name: &str) -> Result<&'a str, AdapterError> {
    match params.get(name) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(AdapterError::invalid(
            name,
            format!("expected a string, got {}", json_type(other)),
        )),
        None => Err(AdapterError::invalid(name, "missing")),
    }
}

/// Fetch a required numeric parameter, accepting numeric strings.
pub fn number_param(params: &Parameters, name: &str) -> Result<f64, AdapterError> {
    match params.get(name) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AdapterError::invalid(name, "number out of range")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AdapterError::invalid(name, format!("'{}' is not a number", s))),
        Some(other) => Err(AdapterError::invalid(
            name,
            format!("expected a number, got {}", json_type(other)),
        )),
        None => Err(AdapterError::invalid(name, "missing")),
    }
}

pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
