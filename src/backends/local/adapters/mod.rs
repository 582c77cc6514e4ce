// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod dict_to_list;
pub mod math_block;
pub mod mock_csv_data;
pub mod write_csv;

pub use dict_to_list::DictToList;
pub use math_block::{MathBlock, Operand};
pub use mock_csv_data::MockCsvData;
pub use write_csv::WriteCsv;
