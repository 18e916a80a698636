//! Faint variables, computed as their complement.
//!
//! A variable is faint when its value can only ever flow into other faint
//! variables; the constraint tracked here is the set of strongly live
//! accessors, everything outside it is faint. Unlike plain liveness the
//! right-hand side of an assignment only becomes live when the target
//! already is, which makes the transfer state-dependent and puts this
//! analysis in the monotone family.

use crate::actions::Action;
use crate::analyses::VariableSet;
use crate::dataflow::monotone::MonotoneAnalysis;
use crate::dataflow::{Direction, JoinOperator};
use crate::graph::{EdgeView, ProgramGraph};
use mc_syntax::ast::RecordMember;
use petgraph::graph::NodeIndex;

pub struct FaintVariables;

impl MonotoneAnalysis for FaintVariables {
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

    fn analyse(&self, edge: &EdgeView, state: &mut Self::State) {
        match edge.action {
            Action::IntDeclaration { name } | Action::ArrayDeclaration { name, .. } => {
                state.0.remove(name);
            }
            Action::RecordDeclaration { name } => {
                state.0.remove(&format!("{name}.{}", RecordMember::Fst));
                state.0.remove(&format!("{name}.{}", RecordMember::Snd));
            }
            Action::IntAssignment { name, value } => {
                if state.0.remove(name) {
                    state.0.append(&mut value.variables());
                }
            }
            // amalgamation: one live cell keeps the whole array live
            Action::ArrayAssignment { name, index, value } => {
                if state.0.contains(name) {
                    state.0.append(&mut index.variables());
                    state.0.append(&mut value.variables());
                }
            }
            Action::RecordAssignment {
                name,
                first,
                second,
            } => {
                if state.0.remove(&format!("{name}.{}", RecordMember::Fst)) {
                    state.0.append(&mut first.variables());
                }
                if state.0.remove(&format!("{name}.{}", RecordMember::Snd)) {
                    state.0.append(&mut second.variables());
                }
            }
            Action::RecordMemberAssignment {
                name,
                member,
                value,
            } => {
                if state.0.remove(&format!("{name}.{member}")) {
                    state.0.append(&mut value.variables());
                }
            }
            Action::ReadVariable { name } => {
                state.0.remove(name);
            }
            Action::ReadArray { name, index } => {
                if state.0.contains(name) {
                    state.0.append(&mut index.variables());
                }
            }
            Action::ReadRecordMember { name, member } => {
                state.0.remove(&format!("{name}.{member}"));
            }
            Action::Write { value } => {
                state.0.append(&mut value.variables());
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
    use crate::dataflow::monotone::MonotoneFramework;
    use crate::dataflow::Analysis;
    use crate::worklist::WorklistKind;
    use mc_syntax::parse_program;

    const FIB: &str = "int f1; int f2; int input; int current; f1 := 1; f2 := 1; read input; \
                       if (input == 0 | input == 1) { current := 1; } \
                       while (input > 1) { current := f1 + f2; f2 := f1; f1 := current; input := input - 1; } \
                       write current;";

    fn solved(kind: WorklistKind) -> (Vec<(String, Vec<String>)>, u64) {
        let graph = ProgramGraph::from_program(&parse_program(FIB).unwrap());
        let mut analysis = Analysis::new(&graph, MonotoneFramework(FaintVariables), kind);
        analysis.initialize();
        analysis.solve().unwrap();
        let results = analysis
            .results()
            .unwrap()
            .into_iter()
            .map(|(label, state)| (label.to_string(), state.0.iter().cloned().collect()))
            .collect();
        (results, analysis.insertions())
    }

    fn live(results: &[(String, Vec<String>)], label: &str) -> Vec<String> {
        results
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, names)| names.clone())
            .unwrap()
    }

    #[test]
    fn assignment_chain_only_live_when_consumed() {
        let (results, _) = solved(WorklistKind::Lifo);
        assert!(live(&results, "q_start").is_empty());
        assert!(live(&results, "q3").is_empty());
        assert_eq!(live(&results, "q4"), ["current"]);
        assert_eq!(live(&results, "q5"), ["current", "f1"]);
        assert_eq!(live(&results, "q6"), ["current", "f1", "f2"]);
        assert_eq!(live(&results, "q7"), ["current", "f1", "f2", "input"]);
        assert_eq!(live(&results, "q8"), ["f1", "f2", "input"]);
        assert_eq!(live(&results, "q9"), ["current", "f1", "f2", "input"]);
        assert_eq!(live(&results, "q10"), ["f1", "f2", "input"]);
        assert_eq!(live(&results, "q11"), ["current", "f1", "input"]);
        assert_eq!(live(&results, "q12"), ["current", "f2", "input"]);
        assert_eq!(live(&results, "q13"), ["current", "f1", "f2", "input"]);
        assert_eq!(live(&results, "q14"), ["current"]);
        assert!(live(&results, "q_end").is_empty());
    }

    #[test]
    fn stack_scheduler_insertion_count() {
        let (_, insertions) = solved(WorklistKind::Lifo);
        assert_eq!(insertions, 35);
    }

    #[test]
    fn unconsumed_assignment_leaves_operands_faint() {
        let source = "int a; int b; a := 1; b := a + 2;";
        let graph = ProgramGraph::from_program(&parse_program(source).unwrap());
        let mut analysis =
            Analysis::new(&graph, MonotoneFramework(FaintVariables), WorklistKind::Fifo);
        analysis.initialize();
        analysis.solve().unwrap();
        // b is never written out, so neither b nor a is ever strongly live
        for (_, state) in analysis.results().unwrap() {
            assert!(state.0.is_empty());
        }
    }
}
