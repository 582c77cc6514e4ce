// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Number, Value};
use std::str::FromStr;

use crate::backends::local::Table;
use crate::errors::AdapterError;
use crate::traits::{number_param, string_param, Adapter, OperationSignature, Parameters};

/// Arithmetic applied cell-wise by [`MathBlock`].
///
/// Division and modulo follow floor semantics, so `mod` takes the sign of
/// the constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
}

impl Operand {
    pub fn apply(self, cell: f64, constant: f64) -> Option<f64> {
        let divides = matches!(self, Operand::TrueDiv | Operand::FloorDiv | Operand::Mod);
        if divides && constant == 0.0 {
            return None;
        }
        let result = match self {
            Operand::Add => cell + constant,
            Operand::Sub => cell - constant,
            Operand::Mul => cell * constant,
            Operand::TrueDiv => cell / constant,
            Operand::FloorDiv => (cell / constant).floor(),
            Operand::Mod => cell - constant * (cell / constant).floor(),
            Operand::Pow => cell.powf(constant),
        };
        result.is_finite().then_some(result)
    }
}

impl FromStr for Operand {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Operand::Add),
            "sub" => Ok(Operand::Sub),
            "mul" => Ok(Operand::Mul),
            "truediv" => Ok(Operand::TrueDiv),
            "floordiv" => Ok(Operand::FloorDiv),
            "mod" => Ok(Operand::Mod),
            "pow" => Ok(Operand::Pow),
            other => Err(AdapterError::invalid(
                "operand",
                format!(
                    "unknown operand '{}' (expected add, sub, mul, truediv, floordiv, mod or pow)",
                    other
                ),
            )),
        }
    }
}

/// Applies `operand` with `constant` to every numeric cell of a table.
///
/// Non-numeric cells are carried over untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathBlock;

#[async_trait]
impl Adapter for MathBlock {
    async fn invoke(&self, params: Parameters) -> Result<Value, AdapterError> {
        let operand: Operand = string_param(&params, "operand")?.parse()?;
        let constant = number_param(&params, "constant")?;
        let data = params
            .get("data")
            .ok_or_else(|| AdapterError::invalid("data", "missing"))?;
        let mut table = Table::from_param("data", data)?;

        for (r, row) in table.rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                let Some(value) = cell.as_f64() else {
                    continue;
                };
                let result = operand.apply(value, constant).ok_or_else(|| {
                    AdapterError::Failed(format!(
                        "{:?} of {} by {} at row {}, column {} has no finite result",
                        operand, value, constant, r, c
                    ))
                })?;
                *cell = Number::from_f64(result)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
            }
        }

        Ok(table.into_value())
    }

    fn signature(&self) -> OperationSignature {
        OperationSignature::new(&["data", "operand", "constant"], "table")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::MockCsvData;
    use serde_json::json;

    #[test]
    fn test_operands() {
        struct TestCase {
            operand: Operand,
            cell: f64,
            constant: f64,
            expected: Option<f64>,
        }

        let cases = vec![
            TestCase { operand: Operand::Add, cell: 1.0, constant: 10.0, expected: Some(11.0) },
            TestCase { operand: Operand::Sub, cell: 1.0, constant: 10.0, expected: Some(-9.0) },
            TestCase { operand: Operand::Mul, cell: 3.0, constant: 2.5, expected: Some(7.5) },
            TestCase { operand: Operand::TrueDiv, cell: 7.0, constant: 2.0, expected: Some(3.5) },
            TestCase { operand: Operand::FloorDiv, cell: -7.0, constant: 2.0, expected: Some(-4.0) },
            TestCase { operand: Operand::Mod, cell: -7.0, constant: 3.0, expected: Some(2.0) },
            TestCase { operand: Operand::Mod, cell: 7.0, constant: -3.0, expected: Some(-2.0) },
            TestCase { operand: Operand::Pow, cell: 2.0, constant: 3.0, expected: Some(8.0) },
            TestCase { operand: Operand::TrueDiv, cell: 1.0, constant: 0.0, expected: None },
            TestCase { operand: Operand::Mod, cell: 1.0, constant: 0.0, expected: None },
        ];

        for case in cases {
            assert_eq!(
                case.operand.apply(case.cell, case.constant),
                case.expected,
                "{:?}({}, {})",
                case.operand,
                case.cell,
                case.constant
            );
        }
    }

    #[tokio::test]
    async fn test_applies_to_numeric_cells() {
        let params = json!({
            "data": {"columns": ["n", "label"], "rows": [[1, "x"], [2.5, "y"]]},
            "operand": "mul",
            "constant": "2"
        })
        .as_object()
        .cloned()
        .unwrap();

        let output = MathBlock.invoke(params).await.unwrap();
        assert_eq!(
            output,
            json!({"columns": ["n", "label"], "rows": [[2.0, "x"], [5.0, "y"]]})
        );
    }

    #[tokio::test]
    async fn test_rejects_unknown_operand_and_zero_division() {
        let mut params = Parameters::new();
        params.insert("data".into(), MockCsvData::table().into_value());
        params.insert("operand".into(), json!("xor"));
        params.insert("constant".into(), json!(1));
        let err = MathBlock.invoke(params.clone()).await.unwrap_err();
        assert!(err.to_string().contains("unknown operand 'xor'"));

        params.insert("operand".into(), json!("truediv"));
        params.insert("constant".into(), json!(0));
        let err = MathBlock.invoke(params).await.unwrap_err();
        assert!(err.to_string().contains("no finite result"));
    }
}
