//! Worklist schedulers.
//!
//! A scheduler tracks the pending node set of one analysis run. `insert` is
//! idempotent with respect to the pending set, but the insertion counter
//! increments on every request; the counter is the observable used for
//! regression-testing extraction behavior.

mod fifo;
mod lifo;
mod natural;

pub use fifo::FifoWorklist;
pub use lifo::LifoWorklist;
pub use natural::NaturalOrderingWorklist;

use crate::dataflow::Direction;
use crate::errors::AnalysisResult;
use crate::graph::ProgramGraph;
use petgraph::graph::NodeIndex;
use std::fmt;

pub trait Worklist {
    fn is_empty(&self) -> bool;

    /// Requests a (re-)examination of `node`. No-op when already pending.
    fn insert(&mut self, node: NodeIndex);

    /// Picks the next node to examine.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::errors::AnalysisError::EmptyWorklist`] when
    /// nothing is pending.
    fn extract(&mut self) -> AnalysisResult<NodeIndex>;

    /// Total number of insertion requests, including rejected ones.
    fn insertions(&self) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorklistKind {
    Fifo,
    Lifo,
    NaturalOrdering,
}

impl WorklistKind {
    #[must_use]
    pub fn instantiate(self, graph: &ProgramGraph, direction: Direction) -> Box<dyn Worklist> {
        match self {
            Self::Fifo => Box::new(FifoWorklist::new()),
            Self::Lifo => Box::new(LifoWorklist::new()),
            Self::NaturalOrdering => Box::new(NaturalOrderingWorklist::new(graph, direction)),
        }
    }
}

impl fmt::Display for WorklistKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Fifo => write!(f, "fifo"),
            Self::Lifo => write!(f, "lifo"),
            Self::NaturalOrdering => write!(f, "natural"),
        }
    }
}
