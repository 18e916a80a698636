//! Generic dataflow machinery.
//!
//! An analysis is assembled from three independent pieces: a constraint type
//! implementing [`Lattice`], a transfer family implementing [`Transfer`]
//! (either directly, or through the kill/generate and monotone wrappers in
//! the submodules), and a worklist scheduler. The [`Analysis`] driver is
//! generic over all three and owns the fixed-point loop.

pub mod bitvector;
pub mod monotone;

use crate::errors::{AnalysisError, AnalysisResult};
use crate::graph::{EdgeView, ProgramGraph};
use crate::worklist::{Worklist, WorklistKind};
use petgraph::graph::NodeIndex;
use std::any;
use std::collections::BTreeMap;
use std::fmt;

/// Propagation direction of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// How constraints of converging paths are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOperator {
    Union,
    Intersection,
}

/// The constraint lattice contract.
///
/// `join` must be commutative, associative, idempotent and monotone. Each
/// analysis implements the one ordering test its join operator needs; the
/// other direction keeps the failing default. The driver never calls the
/// unimplemented direction, so hitting the default signals a mismatched
/// join operator.
pub trait Lattice: Clone + fmt::Display {
    /// Combines `other` into `self`.
    fn join(&mut self, other: &Self);

    /// Whether `self` already contains all information of `other`.
    ///
    /// # Errors
    ///
    /// The default implementation fails with
    /// [`AnalysisError::UnsupportedOrdering`].
    fn is_superset(&self, other: &Self) -> AnalysisResult<bool> {
        let _ = other;
        Err(AnalysisError::UnsupportedOrdering(any::type_name::<Self>()))
    }

    /// Whether all information of `self` is contained in `other`.
    ///
    /// # Errors
    ///
    /// The default implementation fails with
    /// [`AnalysisError::UnsupportedOrdering`].
    fn is_subset(&self, other: &Self) -> AnalysisResult<bool> {
        let _ = other;
        Err(AnalysisError::UnsupportedOrdering(any::type_name::<Self>()))
    }
}

/// A transfer-function family over some constraint type.
pub trait Transfer {
    type State: Lattice;

    fn direction(&self) -> Direction;

    fn join_operator(&self) -> JoinOperator;

    /// The constraint seeded at `node` before the run starts.
    fn initial_state(&self, graph: &ProgramGraph, node: NodeIndex) -> Self::State;

    /// Applies the effect of crossing `edge` to `state`.
    fn transfer(&self, edge: &EdgeView, state: &mut Self::State);
}

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    Running,
    Stable,
}

/// The fixed-point driver.
///
/// Repeatedly extracts a node from the scheduler, recomputes its constraint
/// from its neighbors in the propagation direction, and re-inserts the
/// downstream neighbors whenever the stored constraint grew. Termination
/// relies on finite lattice height and monotone transfer functions; the
/// driver itself enforces no step bound.
pub struct Analysis<'g, T: Transfer> {
    graph: &'g ProgramGraph,
    transfer: T,
    worklist: Box<dyn Worklist>,
    states: BTreeMap<NodeIndex, T::State>,
    phase: Phase,
}

impl<'g, T: Transfer> Analysis<'g, T> {
    #[must_use]
    pub fn new(graph: &'g ProgramGraph, transfer: T, scheduler: WorklistKind) -> Self {
        let worklist = scheduler.instantiate(graph, transfer.direction());
        Self {
            graph,
            transfer,
            worklist,
            states: BTreeMap::new(),
            phase: Phase::Uninitialized,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of scheduler insertion requests so far, seeds included.
    #[must_use]
    pub fn insertions(&self) -> u64 {
        self.worklist.insertions()
    }

    /// Seeds one constraint per node.
    pub fn initialize(&mut self) {
        self.states = self
            .graph
            .nodes()
            .map(|node| (node, self.transfer.initial_state(self.graph, node)))
            .collect();
        self.phase = Phase::Initialized;
    }

    /// Runs the worklist loop to the fixed point.
    ///
    /// # Errors
    ///
    /// Fails if called before [`Analysis::initialize`], or on a lattice
    /// ordering error, both of which signal an analysis-author bug.
    pub fn solve(&mut self) -> AnalysisResult<()> {
        if self.phase != Phase::Initialized {
            return Err(AnalysisError::NotInitialized);
        }
        let direction = self.transfer.direction();
        let join_operator = self.transfer.join_operator();

        for node in self.graph.nodes() {
            self.worklist.insert(node);
        }
        self.phase = Phase::Running;

        while !self.worklist.is_empty() {
            let node = self.worklist.extract()?;
            log::trace!("examining {}", self.graph.label(node));

            let incoming = match direction {
                Direction::Forward => self.graph.in_edges(node),
                Direction::Backward => self.graph.out_edges(node),
            };
            if incoming.is_empty() {
                continue;
            }

            let mut candidate: Option<T::State> = None;
            for edge in &incoming {
                let neighbor = match direction {
                    Direction::Forward => edge.source,
                    Direction::Backward => edge.target,
                };
                let Some(neighbor_state) = self.states.get(&neighbor) else {
                    continue;
                };
                let mut state = neighbor_state.clone();
                log::trace!("  transfer over '{}'", edge.action);
                self.transfer.transfer(edge, &mut state);
                match candidate.as_mut() {
                    None => candidate = Some(state),
                    Some(joined) => joined.join(&state),
                }
            }
            let Some(candidate) = candidate else {
                continue;
            };
            let Some(stored) = self.states.get_mut(&node) else {
                continue;
            };

            let stable = match join_operator {
                JoinOperator::Union => stored.is_superset(&candidate)?,
                JoinOperator::Intersection => stored.is_subset(&candidate)?,
            };
            if !stable {
                stored.join(&candidate);
                log::debug!("{} changed to {}", self.graph.label(node), stored);
                let downstream = match direction {
                    Direction::Forward => self.graph.out_edges(node),
                    Direction::Backward => self.graph.in_edges(node),
                };
                for edge in downstream {
                    let neighbor = match direction {
                        Direction::Forward => edge.target,
                        Direction::Backward => edge.source,
                    };
                    self.worklist.insert(neighbor);
                }
            }
        }

        self.phase = Phase::Stable;
        Ok(())
    }

    /// The stabilized node label to constraint mapping.
    ///
    /// # Errors
    ///
    /// Fails with [`AnalysisError::NotStable`] before the run completed.
    pub fn results(&self) -> AnalysisResult<BTreeMap<&str, &T::State>> {
        if self.phase != Phase::Stable {
            return Err(AnalysisError::NotStable);
        }
        Ok(self
            .graph
            .nodes()
            .filter_map(|node| {
                self.states
                    .get(&node)
                    .map(|state| (self.graph.label(node), state))
            })
            .collect())
    }

    /// The stabilized constraint at a single node.
    ///
    /// # Errors
    ///
    /// Fails before stabilization, or when `label` names no graph node.
    pub fn state_at(&self, label: &str) -> AnalysisResult<&T::State> {
        if self.phase != Phase::Stable {
            return Err(AnalysisError::NotStable);
        }
        let node = self
            .graph
            .node_by_label(label)
            .ok_or_else(|| AnalysisError::UnknownNode(label.to_string()))?;
        self.states
            .get(&node)
            .ok_or_else(|| AnalysisError::UnknownNode(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyses::LiveVariables;
    use crate::dataflow::bitvector::BitVectorFramework;
    use mc_syntax::parse_program;

    fn graph() -> ProgramGraph {
        ProgramGraph::from_program(&parse_program("int x; read x; write x;").unwrap())
    }

    #[test]
    fn solving_requires_initialization() {
        let graph = graph();
        let mut analysis =
            Analysis::new(&graph, BitVectorFramework(LiveVariables), WorklistKind::Fifo);
        assert!(matches!(analysis.solve(), Err(AnalysisError::NotInitialized)));
        assert_eq!(analysis.phase(), Phase::Uninitialized);
    }

    #[test]
    fn results_require_stabilization() {
        let graph = graph();
        let mut analysis =
            Analysis::new(&graph, BitVectorFramework(LiveVariables), WorklistKind::Fifo);
        analysis.initialize();
        assert!(matches!(analysis.results(), Err(AnalysisError::NotStable)));
        assert!(matches!(
            analysis.state_at("q1"),
            Err(AnalysisError::NotStable)
        ));
    }

    #[test]
    fn unknown_labels_are_reported() {
        let graph = graph();
        let mut analysis =
            Analysis::new(&graph, BitVectorFramework(LiveVariables), WorklistKind::Fifo);
        analysis.initialize();
        analysis.solve().unwrap();
        assert!(matches!(
            analysis.state_at("q42"),
            Err(AnalysisError::UnknownNode(label)) if label == "q42"
        ));
    }
}
