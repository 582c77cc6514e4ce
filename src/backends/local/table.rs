// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tabular values passed between local adapters.
//!
//! A table travels as JSON `{"columns": [...], "rows": [[...], ...]}` so it
//! can be stored in a run snapshot like any other output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AdapterError;
use crate::traits::json_type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Read a table out of a resolved parameter.
    ///
    /// Every row must have exactly one cell per column.
    pub fn from_param(name: &str, value: &Value) -> Result<Self, AdapterError> {
        if !value.is_object() {
            return Err(AdapterError::invalid(
                name,
                format!("expected a table object, got {}", json_type(value)),
            ));
        }
        let table: Table = serde_json::from_value(value.clone())
            .map_err(|e| AdapterError::invalid(name, format!("malformed table: {}", e)))?;

        if let Some((index, row)) = table
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != table.columns.len())
        {
            return Err(AdapterError::invalid(
                name,
                format!(
                    "row {} has {} cells but the table has {} columns",
                    index,
                    row.len(),
                    table.columns.len()
                ),
            ));
        }
        Ok(table)
    }

    pub fn into_value(self) -> Value {
        serde_json::json!({ "columns": self.columns, "rows": self.rows })
    }

    /// Render as CSV with a header line. Cells containing a delimiter, quote
    /// or line break are quoted.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_record(&mut out, self.columns.iter().map(String::as_str));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            push_record(&mut out, cells.iter().map(String::as_str));
        }
        out
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_param_rejects_ragged_rows() {
        let err = Table::from_param(
            "data",
            &json!({"columns": ["a", "b"], "rows": [[1, 2], [3]]}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 cells"));

        let err = Table::from_param("data", &json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("got array"));
    }

    #[test]
    fn test_to_csv_quotes_when_needed() {
        let table = Table::new(
            vec!["name".into(), "note".into()],
            vec![
                vec![json!("plain"), json!(1.5)],
                vec![json!("a,b"), json!("say \"hi\"")],
                vec![Value::Null, json!(true)],
            ],
        );
        assert_eq!(
            table.to_csv(),
            "name,note\nplain,1.5\n\"a,b\",\"say \"\"hi\"\"\"\n,true\n"
        );
    }
}
