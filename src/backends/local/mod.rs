// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod adapters;
pub mod factory;
pub mod table;

pub use adapters::*;
pub use factory::LocalAdapterFactory;
pub use table::Table;
