// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only adapters for exercising the engine without real backends.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::AdapterError;
use crate::traits::{Adapter, OperationSignature, Parameters};

const ANY: OperationSignature = OperationSignature::new(&[], "json");

/// Returns a fixed value.
pub struct StubAdapter {
    output: Value,
    signature: OperationSignature,
}

impl StubAdapter {
    pub fn returning(output: Value) -> Self {
        Self {
            output,
            signature: ANY,
        }
    }

    pub fn requiring(mut self, required: &'static [&'static str]) -> Self {
        self.signature = OperationSignature::new(required, "json");
        self
    }
}

#[async_trait]
impl Adapter for StubAdapter {
    async fn invoke(&self, _params: Parameters) -> Result<Value, AdapterError> {
        Ok(self.output.clone())
    }

    fn signature(&self) -> OperationSignature {
        self.signature
    }
}

/// Always fails with the given message.
pub struct FailingAdapter {
    message: String,
}

impl FailingAdapter {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Adapter for FailingAdapter {
    async fn invoke(&self, _params: Parameters) -> Result<Value, AdapterError> {
        Err(AdapterError::Failed(self.message.clone()))
    }

    fn signature(&self) -> OperationSignature {
        ANY
    }
}

/// Counts invocations; the counter is shared so tests can keep a handle.
pub struct CountingAdapter {
    calls: Arc<AtomicUsize>,
    output: Value,
}

impl CountingAdapter {
    pub fn new(output: Value) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                output,
            },
            calls,
        )
    }
}

#[async_trait]
impl Adapter for CountingAdapter {
    async fn invoke(&self, _params: Parameters) -> Result<Value, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }

    fn signature(&self) -> OperationSignature {
        ANY
    }
}

/// Sleeps before returning, for timeout and cancellation tests.
pub struct SlowAdapter {
    delay: Duration,
    output: Value,
}

impl SlowAdapter {
    pub fn new(delay: Duration, output: Value) -> Self {
        Self { delay, output }
    }
}

#[async_trait]
impl Adapter for SlowAdapter {
    async fn invoke(&self, _params: Parameters) -> Result<Value, AdapterError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.output.clone())
    }

    fn signature(&self) -> OperationSignature {
        ANY
    }
}

/// Records the parameters of every invocation and returns a fixed value.
pub struct RecordingAdapter {
    seen: Arc<Mutex<Vec<Parameters>>>,
    output: Value,
}

impl RecordingAdapter {
    pub fn new(output: Value) -> (Self, Arc<Mutex<Vec<Parameters>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                seen: seen.clone(),
                output,
            },
            seen,
        )
    }
}

#[async_trait]
impl Adapter for RecordingAdapter {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError> {
        self.seen
            .lock()
            .map_err(|_| AdapterError::Failed("recording lock poisoned".into()))?
            .push(params);
        Ok(self.output.clone())
    }

    fn signature(&self) -> OperationSignature {
        ANY
    }
}
