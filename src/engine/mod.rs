// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod context;
pub mod factory;
pub mod level_by_level;
pub mod priority_work_queue;
pub mod resolver;
mod run_state;
pub mod sequential;
#[cfg(test)]
mod integration_tests;

pub use context::{RunContext, RunOptions};
pub use factory::ExecutorFactory;
pub use level_by_level::LevelByLevelExecutor;
pub use resolver::{resolve_execution_plan, ExecutionPlan};
pub use sequential::SequentialExecutor;
