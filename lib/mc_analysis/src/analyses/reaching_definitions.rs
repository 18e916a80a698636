//! Reaching definitions.
//!
//! For every node, which assignments may have produced the current value of
//! each accessor. A definition is identified by the edge that wrote it;
//! the pseudo-definition `(x, ?, q_start)` stands for "uninitialized at
//! program entry". Arrays are amalgamated: writing one cell neither kills
//! the other cells' definitions nor its own previous ones.

use crate::actions::Action;
use crate::dataflow::bitvector::BitVectorAnalysis;
use crate::dataflow::{Direction, JoinOperator, Lattice};
use crate::errors::AnalysisResult;
use crate::graph::{EdgeView, ProgramGraph, START_NODE};
use mc_syntax::ast::RecordMember;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One definition site: the written accessor and the defining edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Definition {
    pub variable: String,
    pub from: String,
    pub to: String,
}

impl Definition {
    fn new(variable: &str, from: &str, to: &str) -> Self {
        Self {
            variable: variable.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.variable, self.from, self.to)
    }
}

/// Accessor name to possible definition sites. Absent entries and empty
/// sets are interchangeable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefinitionMap(pub BTreeMap<String, BTreeSet<Definition>>);

impl Lattice for DefinitionMap {
    fn join(&mut self, other: &Self) {
        for (name, definitions) in &other.0 {
            if !definitions.is_empty() {
                self.0
                    .entry(name.clone())
                    .or_default()
                    .extend(definitions.iter().cloned());
            }
        }
    }

    fn is_superset(&self, other: &Self) -> AnalysisResult<bool> {
        Ok(other.0.iter().all(|(name, definitions)| {
            self.0
                .get(name)
                .is_some_and(|mine| definitions.is_subset(mine))
        }))
    }
}

impl fmt::Display for DefinitionMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (name, definitions) in &self.0 {
            if definitions.is_empty() {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{name}: {{")?;
            for (i, definition) in definitions.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{definition}")?;
            }
            write!(f, "}}")?;
        }
        write!(f, "}}")
    }
}

pub struct ReachingDefinitions;

impl ReachingDefinitions {
    fn strong_kill(state: &mut DefinitionMap, name: &str) {
        state.0.remove(name);
    }

    fn define(state: &mut DefinitionMap, name: &str, edge: &EdgeView) {
        state
            .0
            .entry(name.to_string())
            .or_default()
            .insert(Definition::new(name, edge.from, edge.to));
    }
}

impl BitVectorAnalysis for ReachingDefinitions {
    type State = DefinitionMap;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn join_operator(&self) -> JoinOperator {
        JoinOperator::Union
    }

    fn initial_state(&self, graph: &ProgramGraph, node: NodeIndex) -> Self::State {
        let mut state = DefinitionMap::default();
        if node == graph.start() {
            for name in graph.variable_names() {
                state
                    .0
                    .entry(name.clone())
                    .or_default()
                    .insert(Definition::new(name, "?", START_NODE));
            }
        }
        state
    }

    fn kill(&self, edge: &EdgeView, state: &mut Self::State) {
        match edge.action {
            Action::IntDeclaration { .. }
            | Action::RecordDeclaration { .. }
            | Action::Condition { .. }
            | Action::Write { .. } => {}
            // amalgamation: array writes are weak updates
            Action::ArrayAssignment { .. } | Action::ReadArray { .. } => {}
            Action::ArrayDeclaration { name, .. }
            | Action::IntAssignment { name, .. }
            | Action::ReadVariable { name } => Self::strong_kill(state, name),
            Action::RecordAssignment { name, .. } => {
                Self::strong_kill(state, &format!("{name}.{}", RecordMember::Fst));
                Self::strong_kill(state, &format!("{name}.{}", RecordMember::Snd));
            }
            Action::RecordMemberAssignment { name, member, .. }
            | Action::ReadRecordMember { name, member } => {
                Self::strong_kill(state, &format!("{name}.{member}"));
            }
        }
    }

    fn generate(&self, edge: &EdgeView, state: &mut Self::State) {
        match edge.action {
            Action::IntDeclaration { .. }
            | Action::RecordDeclaration { .. }
            | Action::Condition { .. }
            | Action::Write { .. } => {}
            Action::ArrayDeclaration { name, .. }
            | Action::IntAssignment { name, .. }
            | Action::ArrayAssignment { name, .. }
            | Action::ReadVariable { name }
            | Action::ReadArray { name, .. } => {
                Self::define(state, name, edge);
            }
            Action::RecordAssignment { name, .. } => {
                Self::define(state, &format!("{name}.{}", RecordMember::Fst), edge);
                Self::define(state, &format!("{name}.{}", RecordMember::Snd), edge);
            }
            Action::RecordMemberAssignment { name, member, .. }
            | Action::ReadRecordMember { name, member } => {
                Self::define(state, &format!("{name}.{member}"), edge);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::worklist::WorklistKind;
    use crate::{reaching_definitions, ProgramGraph};
    use mc_syntax::parse_program;

    const ADD: &str = "int a; int b; int c; a := 3; read b; c := a + b; write c;";

    const FIB: &str = "int f2; int input; int current; f1 := 1; f2 := 1; read input; \
                       if (input == 0 | input == 1) { current := 1; } \
                       while (input > 1) { current := f1 + f2; f2 := f1; f1 := current; input := input - 1; } \
                       write current;";

    fn graph(source: &str) -> ProgramGraph {
        ProgramGraph::from_program(&parse_program(source).unwrap())
    }

    #[test]
    fn straight_line_definitions_at_exit() {
        let graph = graph(ADD);
        let analysis = reaching_definitions(&graph, WorklistKind::Lifo).unwrap();
        assert_eq!(
            analysis.state_at("q_end").unwrap().to_string(),
            "{a: {(a, q3, q4)}, b: {(b, q4, q5)}, c: {(c, q5, q6)}}"
        );
    }

    #[test]
    fn loop_merges_definitions_at_exit() {
        let graph = graph(FIB);
        let analysis = reaching_definitions(&graph, WorklistKind::Fifo).unwrap();
        assert_eq!(
            analysis.state_at("q_end").unwrap().to_string(),
            "{current: {(current, ?, q_start), (current, q7, q8), (current, q9, q10)}, \
             f1: {(f1, q11, q12), (f1, q3, q4)}, \
             f2: {(f2, q10, q11), (f2, q4, q5)}, \
             input: {(input, q12, q8), (input, q5, q6)}}"
        );
    }

    #[test]
    fn stack_scheduler_insertion_count_is_deterministic() {
        for _ in 0..2 {
            let graph = graph(FIB);
            let analysis = reaching_definitions(&graph, WorklistKind::Lifo).unwrap();
            assert_eq!(analysis.insertions(), 70);
        }
    }

    #[test]
    fn scheduler_insertion_counts_on_straight_line_code() {
        let graph = graph(ADD);
        let lifo = reaching_definitions(&graph, WorklistKind::Lifo).unwrap();
        assert_eq!(lifo.insertions(), 19);
        let fifo = reaching_definitions(&graph, WorklistKind::Fifo).unwrap();
        assert_eq!(fifo.insertions(), 14);
        let natural = reaching_definitions(&graph, WorklistKind::NaturalOrdering).unwrap();
        assert_eq!(natural.insertions(), 14);
    }

    #[test]
    fn schedulers_agree_on_the_fixed_point() {
        let graph = graph(FIB);
        let lifo = reaching_definitions(&graph, WorklistKind::Lifo).unwrap();
        let fifo = reaching_definitions(&graph, WorklistKind::Fifo).unwrap();
        let natural = reaching_definitions(&graph, WorklistKind::NaturalOrdering).unwrap();
        let lifo = lifo.results().unwrap();
        let fifo = fifo.results().unwrap();
        let natural = natural.results().unwrap();
        assert_eq!(lifo, fifo);
        assert_eq!(lifo, natural);
    }
}
