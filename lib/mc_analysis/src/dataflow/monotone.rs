//! Single-function monotone transfer family.
//!
//! Analyses whose per-action effect depends on the incoming state (sign
//! evaluation, strong liveness) cannot be split into state-independent kill
//! and generate halves. They implement one monotone `analyse` function and
//! are lifted into the [`Transfer`] contract by [`MonotoneFramework`].

use crate::dataflow::{Direction, JoinOperator, Lattice, Transfer};
use crate::graph::{EdgeView, ProgramGraph};
use petgraph::graph::NodeIndex;

pub trait MonotoneAnalysis {
    type State: Lattice;

    fn direction(&self) -> Direction;

    fn join_operator(&self) -> JoinOperator;

    fn initial_state(&self, graph: &ProgramGraph, node: NodeIndex) -> Self::State;

    /// Applies the full effect of crossing `edge` to `state`; must be
    /// monotone in `state` for the driver to terminate.
    fn analyse(&self, edge: &EdgeView, state: &mut Self::State);
}

pub struct MonotoneFramework<A>(pub A);

impl<A: MonotoneAnalysis> Transfer for MonotoneFramework<A> {
    type State = A::State;

    fn direction(&self) -> Direction {
        self.0.direction()
    }

    fn join_operator(&self) -> JoinOperator {
        self.0.join_operator()
    }

    fn initial_state(&self, graph: &ProgramGraph, node: NodeIndex) -> Self::State {
        self.0.initial_state(graph, node)
    }

    fn transfer(&self, edge: &EdgeView, state: &mut Self::State) {
        self.0.analyse(edge, state);
    }
}
