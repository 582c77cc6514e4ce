// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dependency resolver: turns a validated [`PipelineGraph`] into an
//! [`ExecutionPlan`].
//!
//! The order is Kahn's algorithm with the ready set drained in discovery
//! order, so flat configurations resolve to list order and every dependency
//! precedes its consumer. Levels group nodes by longest distance from an
//! entry point; every node in a level only depends on earlier levels.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::{validate_pipeline_graph, DependencyGraph, EntryPoints, PipelineGraph};
use crate::engine::priority_work_queue::{PriorityWorkQueue, PrioritizedTask};
use crate::errors::ValidationError;
use crate::observability::messages::engine::ExecutionPlanResolved;
use crate::observability::messages::StructuredLog;

/// Topological order plus dependency levels of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    pub order: Vec<String>,
    pub levels: Vec<Vec<String>>,
}

impl ExecutionPlan {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Level index of `node_id`.
    pub fn level_of(&self, node_id: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.iter().any(|id| id == node_id))
    }
}

/// Validate `graph` and compute its execution plan.
///
/// Fails with every dangling reference, or with the first cycle found.
pub fn resolve_execution_plan(graph: &PipelineGraph) -> Result<ExecutionPlan, Vec<ValidationError>> {
    validate_pipeline_graph(graph)?;

    let dependents = DependencyGraph::from_pipeline(graph);
    let mut in_degree: HashMap<&str, usize> = graph
        .nodes()
        .iter()
        .map(|node| (node.id.as_str(), node.dependencies.len()))
        .collect();

    let mut ready = PriorityWorkQueue::new();
    for id in EntryPoints::from_pipeline(graph).iter() {
        if let Some(node) = graph.get(id) {
            ready.push(PrioritizedTask::new(node.id.clone(), node.discovery_index));
        }
    }

    let mut order = Vec::with_capacity(graph.len());
    let mut depth: HashMap<String, usize> = HashMap::new();

    while let Some(id) = ready.pop() {
        let level = graph
            .get(&id)
            .map(|node| {
                node.dependencies
                    .iter()
                    .filter_map(|dep| depth.get(dep))
                    .map(|d| d + 1)
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        depth.insert(id.clone(), level);

        for dependent in dependents.dependents(&id) {
            if let Some(count) = in_degree.get_mut(dependent.as_str()) {
                *count -= 1;
                if *count == 0 {
                    if let Some(node) = graph.get(dependent) {
                        ready.push(PrioritizedTask::new(node.id.clone(), node.discovery_index));
                    }
                }
            }
        }
        order.push(id);
    }

    if order.len() != graph.len() {
        // Unreachable after validation; report what is left as a cycle.
        let stuck = graph
            .nodes()
            .iter()
            .filter(|node| !depth.contains_key(&node.id))
            .map(|node| node.id.clone())
            .collect();
        return Err(vec![ValidationError::CycleDetected { cycle: stuck }]);
    }

    let level_count = depth.values().max().map_or(0, |max| max + 1);
    let mut levels: Vec<Vec<String>> = vec![Vec::new(); level_count];
    for id in &order {
        if let Some(&level) = depth.get(id) {
            levels[level].push(id.clone());
        }
    }
    for level in &mut levels {
        level.sort_by_key(|id| graph.get(id).map_or(usize::MAX, |n| n.discovery_index));
    }

    ExecutionPlanResolved {
        node_count: order.len(),
        level_count: levels.len(),
    }
    .log();

    Ok(ExecutionPlan { order, levels })
}
