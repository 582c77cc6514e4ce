// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backends::local::Table;
use crate::errors::AdapterError;
use crate::traits::{Adapter, OperationSignature, Parameters};

/// Fixed 3x3 table, handy as a pipeline source in demos and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCsvData;

impl MockCsvData {
    pub fn table() -> Table {
        Table::new(
            vec!["column1".into(), "column2".into(), "column3".into()],
            vec![
                vec![json!(1), json!(2), json!(3)],
                vec![json!(4), json!(5), json!(6)],
                vec![json!(7), json!(8), json!(9)],
            ],
        )
    }
}

#[async_trait]
impl Adapter for MockCsvData {
    async fn invoke(&self, _params: Parameters) -> Result<Value, AdapterError> {
        Ok(Self::table().into_value())
    }

    fn signature(&self) -> OperationSignature {
        OperationSignature::new(&[], "table")
    }
}
