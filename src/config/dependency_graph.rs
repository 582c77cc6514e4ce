// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::config::PipelineGraph;

/// Newtype wrapper for the forward edges of a pipeline: node id -> ids of
/// the nodes that consume its output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph(pub HashMap<String, Vec<String>>);

impl DependencyGraph {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Build the dependents map for every node in `graph`.
    ///
    /// Every node gets an entry, even when nothing consumes it. Dependents are
    /// listed in discovery order. References to unknown nodes are ignored;
    /// validation reports them.
    pub fn from_pipeline(graph: &PipelineGraph) -> Self {
        let mut dependents: HashMap<String, Vec<String>> = graph
            .nodes()
            .iter()
            .map(|node| (node.id.clone(), Vec::new()))
            .collect();

        for node in graph.nodes() {
            for dependency in &node.dependencies {
                if let Some(list) = dependents.get_mut(dependency) {
                    list.push(node.id.clone());
                }
            }
        }
        Self(dependents)
    }

    pub fn add_dependent(&mut self, node_id: &str, dependent: String) {
        self.0.entry(node_id.to_string()).or_default().push(dependent);
    }

    pub fn dependents(&self, node_id: &str) -> &[String] {
        self.0.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, Vec<String>>> for DependencyGraph {
    fn from(graph: HashMap<String, Vec<String>>) -> Self {
        Self(graph)
    }
}

impl From<DependencyGraph> for HashMap<String, Vec<String>> {
    fn from(graph: DependencyGraph) -> Self {
        graph.0
    }
}
