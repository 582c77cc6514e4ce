// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{Settings, Strategy};
use crate::engine::level_by_level::LevelByLevelExecutor;
use crate::engine::sequential::SequentialExecutor;
use crate::traits::DagExecutor;

/// Factory for creating DAG executors from settings
pub struct ExecutorFactory;

impl ExecutorFactory {
    pub fn from_settings(settings: &Settings) -> Box<dyn DagExecutor> {
        match settings.strategy {
            Strategy::Sequential => Box::new(SequentialExecutor::new()),
            Strategy::Level => Box::new(LevelByLevelExecutor::new(
                settings.executor_options.max_concurrency(),
            )),
        }
    }
}
