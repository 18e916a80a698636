//! Live variables.
//!
//! Backward may-analysis: an accessor is live at a node when some path to
//! the end reads it before overwriting it. Array writes are weak updates
//! and never kill.

use crate::actions::Action;
use crate::analyses::VariableSet;
use crate::dataflow::bitvector::BitVectorAnalysis;
use crate::dataflow::{Direction, JoinOperator};
use crate::graph::{EdgeView, ProgramGraph};
use mc_syntax::ast::RecordMember;
use petgraph::graph::NodeIndex;

pub struct LiveVariables;

impl BitVectorAnalysis for LiveVariables {
    type State = VariableSet;

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn join_operator(&self) -> JoinOperator {
        JoinOperator::Union
    }

    fn initial_state(&self, _graph: &ProgramGraph, _node: NodeIndex) -> Self::State {
        VariableSet::default()
    }

    fn kill(&self, edge: &EdgeView, state: &mut Self::State) {
        match edge.action {
            Action::IntDeclaration { name }
            | Action::ArrayDeclaration { name, .. }
            | Action::IntAssignment { name, .. }
            | Action::ReadVariable { name } => {
                state.0.remove(name);
            }
            Action::RecordDeclaration { name } | Action::RecordAssignment { name, .. } => {
                state.0.remove(&format!("{name}.{}", RecordMember::Fst));
                state.0.remove(&format!("{name}.{}", RecordMember::Snd));
            }
            Action::RecordMemberAssignment { name, member, .. }
            | Action::ReadRecordMember { name, member } => {
                state.0.remove(&format!("{name}.{member}"));
            }
            Action::ArrayAssignment { .. }
            | Action::ReadArray { .. }
            | Action::Write { .. }
            | Action::Condition { .. } => {}
        }
    }

    fn generate(&self, edge: &EdgeView, state: &mut Self::State) {
        match edge.action {
            Action::IntDeclaration { .. }
            | Action::ArrayDeclaration { .. }
            | Action::RecordDeclaration { .. }
            | Action::ReadVariable { .. }
            | Action::ReadRecordMember { .. } => {}
            Action::IntAssignment { value, .. }
            | Action::RecordMemberAssignment { value, .. }
            | Action::Write { value } => {
                state.0.append(&mut value.variables());
            }
            Action::ArrayAssignment { index, value, .. } => {
                state.0.append(&mut index.variables());
                state.0.append(&mut value.variables());
            }
            Action::RecordAssignment { first, second, .. } => {
                state.0.append(&mut first.variables());
                state.0.append(&mut second.variables());
            }
            Action::ReadArray { index, .. } => {
                state.0.append(&mut index.variables());
            }
            Action::Condition { value } => {
                state.0.append(&mut value.variables());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataflow::bitvector::BitVectorFramework;
    use crate::dataflow::Analysis;
    use crate::worklist::WorklistKind;
    use mc_syntax::parse_program;

    fn live_at(source: &str, label: &str) -> Vec<String> {
        let graph = ProgramGraph::from_program(&parse_program(source).unwrap());
        let mut analysis =
            Analysis::new(&graph, BitVectorFramework(LiveVariables), WorklistKind::Lifo);
        analysis.initialize();
        analysis.solve().unwrap();
        analysis
            .state_at(label)
            .unwrap()
            .0
            .iter()
            .cloned()
            .collect()
    }

    const ADD: &str = "int a; int b; int c; a := 3; read b; c := a + b; write c;";

    #[test]
    fn nothing_live_at_the_ends() {
        assert!(live_at(ADD, "q_start").is_empty());
        assert!(live_at(ADD, "q_end").is_empty());
    }

    #[test]
    fn operands_live_before_their_use() {
        assert_eq!(live_at(ADD, "q4"), ["a"]);
        assert_eq!(live_at(ADD, "q5"), ["a", "b"]);
        assert_eq!(live_at(ADD, "q6"), ["c"]);
    }

    #[test]
    fn loop_keeps_counter_live() {
        let fib = "int f2; int input; int current; f1 := 1; f2 := 1; read input; \
                   if (input == 0 | input == 1) { current := 1; } \
                   while (input > 1) { current := f1 + f2; f2 := f1; f1 := current; input := input - 1; } \
                   write current;";
        assert_eq!(live_at(fib, "q8"), ["current", "f1", "f2", "input"]);
    }
}
