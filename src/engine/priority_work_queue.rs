// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready queue for topological scheduling.
//!
//! Nodes whose dependencies are satisfied are pushed here and popped in
//! discovery order, which makes the resolved order deterministic and keeps
//! top-level descriptors in their submitted order.
//!
//! ```rust
//! use pipeline_resolver::engine::priority_work_queue::{PriorityWorkQueue, PrioritizedTask};
//!
//! let mut queue = PriorityWorkQueue::new();
//! queue.push(PrioritizedTask::new("delete_model (3)".to_string(), 2));
//! queue.push(PrioritizedTask::new("deploy_model (1)".to_string(), 0));
//!
//! assert_eq!(queue.pop(), Some("deploy_model (1)".to_string()));
//! assert_eq!(queue.pop(), Some("delete_model (3)".to_string()));
//! assert_eq!(queue.pop(), None);
//! ```

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// A node ready for scheduling, ranked by its discovery index.
#[derive(Debug, Clone)]
pub struct PrioritizedTask {
    pub node_id: String,
    pub discovery_index: usize,
}

impl PrioritizedTask {
    pub fn new(node_id: String, discovery_index: usize) -> Self {
        Self {
            node_id,
            discovery_index,
        }
    }
}

impl PartialEq for PrioritizedTask {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}

impl Eq for PrioritizedTask {}

impl PartialOrd for PrioritizedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest discovered pops first.
        other
            .discovery_index
            .cmp(&self.discovery_index)
            .then_with(|| other.node_id.cmp(&self.node_id))
    }
}

/// Min-queue on discovery index that refuses duplicate node ids.
#[derive(Debug, Default)]
pub struct PriorityWorkQueue {
    heap: BinaryHeap<PrioritizedTask>,
    queued: HashSet<String>,
}

impl PriorityWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the node is already queued.
    pub fn push(&mut self, task: PrioritizedTask) -> bool {
        if !self.queued.insert(task.node_id.clone()) {
            return false;
        }
        self.heap.push(task);
        true
    }

    pub fn pop(&mut self) -> Option<String> {
        let task = self.heap.pop()?;
        self.queued.remove(&task.node_id);
        Some(task.node_id)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
