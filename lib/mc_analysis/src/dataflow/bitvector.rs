//! Kill/generate transfer family.
//!
//! Bit-vector analyses describe each action's effect as two state-independent
//! halves: first remove what the action invalidates, then add what it
//! produces. [`BitVectorFramework`] lifts such a pair into the generic
//! [`Transfer`] contract.

use crate::dataflow::{Direction, JoinOperator, Lattice, Transfer};
use crate::graph::{EdgeView, ProgramGraph};
use petgraph::graph::NodeIndex;

pub trait BitVectorAnalysis {
    type State: Lattice;

    fn direction(&self) -> Direction;

    fn join_operator(&self) -> JoinOperator;

    fn initial_state(&self, graph: &ProgramGraph, node: NodeIndex) -> Self::State;

    /// Removes from `state` the facts invalidated by crossing `edge`.
    fn kill(&self, edge: &EdgeView, state: &mut Self::State);

    /// Adds to `state` the facts produced by crossing `edge`.
    fn generate(&self, edge: &EdgeView, state: &mut Self::State);
}

pub struct BitVectorFramework<A>(pub A);

impl<A: BitVectorAnalysis> Transfer for BitVectorFramework<A> {
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
        self.0.kill(edge, state);
        self.0.generate(edge, state);
    }
}
