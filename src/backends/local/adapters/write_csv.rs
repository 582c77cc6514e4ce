// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

use crate::backends::local::Table;
use crate::config::consts::DEFAULT_CSV_OUTPUT_PATH;
use crate::errors::AdapterError;
use crate::traits::{string_param, Adapter, OperationSignature, Parameters};

/// Writes a table to disk as CSV and returns the path written.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteCsv;

#[async_trait]
impl Adapter for WriteCsv {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError> {
        let result = params
            .get("result")
            .ok_or_else(|| AdapterError::invalid("result", "missing"))?;
        let table = Table::from_param("result", result)?;

        let path = match params.get("path") {
            Some(_) => PathBuf::from(string_param(&params, "path")?),
            None => PathBuf::from(DEFAULT_CSV_OUTPUT_PATH),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, table.to_csv()).await?;

        tracing::debug!(path = %path.display(), rows = table.rows.len(), "Wrote CSV output");
        Ok(Value::String(path.to_string_lossy().into_owned()))
    }

    fn signature(&self) -> OperationSignature {
        OperationSignature::new(&["result"], "path").with_optional(&["path"])
    }
}
