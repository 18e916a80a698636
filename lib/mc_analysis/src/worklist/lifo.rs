//! Depth-first (stack) scheduler.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::worklist::Worklist;
use petgraph::graph::NodeIndex;

#[derive(Debug, Default)]
pub struct LifoWorklist {
    stack: Vec<NodeIndex>,
    insertions: u64,
}

impl LifoWorklist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Worklist for LifoWorklist {
    fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    fn insert(&mut self, node: NodeIndex) {
        self.insertions += 1;
        if !self.stack.contains(&node) {
            self.stack.push(node);
        }
    }

    fn extract(&mut self) -> AnalysisResult<NodeIndex> {
        self.stack.pop().ok_or(AnalysisError::EmptyWorklist)
    }

    fn insertions(&self) -> u64 {
        self.insertions
    }
}
