// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation of a parsed pipeline.
//!
//! Two checks run in order:
//!
//! 1. **Reference validation**: every dependency id names a node in the graph.
//! 2. **Cycle detection**: three-color DFS over the consumer -> dependency
//!    edges, reporting the offending path.
//!
//! Cycle detection needs a closed node set, so it only runs when every
//! reference resolved. All reference errors are accumulated so that a
//! generated configuration can be fixed in one round trip.
//!
//! ```rust
//! use pipeline_resolver::config::{parse_pipeline, validate_pipeline_graph};
//! use pipeline_resolver::errors::ValidationError;
//! use serde_json::json;
//!
//! let graph = parse_pipeline(&json!({
//!     "raw_input": [
//!         {"id": "a", "operation": "dict_to_list", "parameters": {"data": {"ref": "b"}}},
//!         {"id": "b", "operation": "dict_to_list", "parameters": {"data": {"ref": "a"}}}
//!     ]
//! })).unwrap();
//!
//! let errors = validate_pipeline_graph(&graph).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::CycleDetected {
//!         cycle: vec!["a".into(), "b".into(), "a".into()]
//!     }]
//! );
//! ```

use std::collections::HashMap;

use crate::config::PipelineGraph;
use crate::errors::ValidationError;

/// Validate references and acyclicity of `graph`.
pub fn validate_pipeline_graph(graph: &PipelineGraph) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(reference_errors) = validate_dependency_references(graph) {
        errors.extend(reference_errors);
    }

    if errors.is_empty() {
        if let Err(cycle_error) = validate_acyclic_graph(graph) {
            errors.push(cycle_error);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_dependency_references(graph: &PipelineGraph) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = graph
        .nodes()
        .iter()
        .flat_map(|node| {
            node.dependencies
                .iter()
                .filter(|dependency| !graph.contains(dependency))
                .map(|dependency| ValidationError::DanglingReference {
                    node_id: node.id.clone(),
                    missing_dependency: dependency.clone(),
                })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Report the first cycle found, starting DFS from nodes in discovery order.
fn validate_acyclic_graph(graph: &PipelineGraph) -> Result<(), ValidationError> {
    let edges: HashMap<&str, Vec<&str>> = graph
        .nodes()
        .iter()
        .map(|node| {
            (
                node.id.as_str(),
                node.dependencies.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let mut marks: HashMap<&str, Mark> = HashMap::new();

    for node in graph.nodes() {
        if marks.contains_key(node.id.as_str()) {
            continue;
        }
        if let Some(cycle) = dfs_cycle_detection(&node.id, &edges, &mut marks) {
            return Err(ValidationError::CycleDetected { cycle });
        }
    }
    Ok(())
}

/// Depth-first walk with an explicit stack, so long dependency chains do not
/// grow the call stack. Each frame is a node on the current path and the
/// index of the next dependency to visit.
fn dfs_cycle_detection<'a>(
    start: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
) -> Option<Vec<String>> {
    let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];
    marks.insert(start, Mark::InProgress);

    while let Some(frame) = stack.last_mut() {
        let (node, next_edge) = *frame;
        let Some(&next) = edges.get(node).and_then(|deps| deps.get(next_edge)) else {
            marks.insert(node, Mark::Done);
            stack.pop();
            continue;
        };
        frame.1 += 1;

        match marks.get(next) {
            None => {
                marks.insert(next, Mark::InProgress);
                stack.push((next, 0));
            }
            Some(Mark::InProgress) => {
                let from = stack.iter().position(|&(id, _)| id == next).unwrap_or(0);
                let mut cycle: Vec<String> =
                    stack[from..].iter().map(|(id, _)| id.to_string()).collect();
                cycle.push(next.to_string());
                return Some(cycle);
            }
            Some(Mark::Done) => {}
        }
    }
    None
}
