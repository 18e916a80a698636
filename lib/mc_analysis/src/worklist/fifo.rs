//! Round-robin scheduler.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::worklist::Worklist;
use petgraph::graph::NodeIndex;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct FifoWorklist {
    queue: VecDeque<NodeIndex>,
    insertions: u64,
}

impl FifoWorklist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Worklist for FifoWorklist {
    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn insert(&mut self, node: NodeIndex) {
        self.insertions += 1;
        if !self.queue.contains(&node) {
            self.queue.push_back(node);
        }
    }

    fn extract(&mut self) -> AnalysisResult<NodeIndex> {
        self.queue.pop_front().ok_or(AnalysisError::EmptyWorklist)
    }

    fn insertions(&self) -> u64 {
        self.insertions
    }
}
