// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::PipelineGraph;

/// Nodes with no dependencies, in discovery order.
///
/// These are the nodes that can run as soon as a run starts.
///
/// ```
/// use pipeline_resolver::config::{parse_pipeline, EntryPoints};
/// use serde_json::json;
///
/// let graph = parse_pipeline(&json!({
///     "raw_input": [{
///         "operation": "dict_to_list",
///         "parameters": {"data": {"operation": "mock_csv_data"}}
///     }]
/// })).unwrap();
///
/// let entry_points = EntryPoints::from_pipeline(&graph);
/// assert_eq!(entry_points.0, vec!["mock_csv_data (2)".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPoints(pub Vec<String>);

impl EntryPoints {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_pipeline(graph: &PipelineGraph) -> Self {
        Self(
            graph
                .nodes()
                .iter()
                .filter(|node| node.dependencies.is_empty())
                .map(|node| node.id.clone())
                .collect(),
        )
    }

    pub fn add(&mut self, node_id: String) {
        self.0.push(node_id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for EntryPoints {
    fn from(entrypoints: Vec<String>) -> Self {
        Self(entrypoints)
    }
}

impl From<EntryPoints> for Vec<String> {
    fn from(value: EntryPoints) -> Self {
        value.0
    }
}
