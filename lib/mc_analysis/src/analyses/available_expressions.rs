//! Available expressions.
//!
//! Forward must-analysis: a binary expression is available at a node when
//! every path from the start evaluates it and none of its accessors has
//! been written since the last evaluation. The universe of candidate
//! expressions is fixed per program graph, so the constraint type carries
//! the intersection join and only the subset ordering.

use crate::actions::Action;
use crate::dataflow::bitvector::BitVectorAnalysis;
use crate::dataflow::{Direction, JoinOperator, Lattice};
use crate::errors::AnalysisResult;
use crate::graph::{EdgeView, ProgramGraph};
use mc_syntax::ast::{ArithmeticExpression, RecordMember};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A set of non-trivial arithmetic expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpressionSet(pub BTreeSet<ArithmeticExpression>);

impl Lattice for ExpressionSet {
    fn join(&mut self, other: &Self) {
        self.0.retain(|expr| other.0.contains(expr));
    }

    fn is_subset(&self, other: &Self) -> AnalysisResult<bool> {
        Ok(self.0.is_subset(&other.0))
    }
}

impl fmt::Display for ExpressionSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, expr) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{expr}")?;
        }
        write!(f, "}}")
    }
}

pub struct AvailableExpressions {
    universe: ExpressionSet,
}

impl AvailableExpressions {
    /// Collects the expression universe of `graph`: every binary
    /// subexpression occurring in any edge action.
    #[must_use]
    pub fn new(graph: &ProgramGraph) -> Self {
        let mut universe = ExpressionSet::default();
        for edge in graph.edges_iter() {
            for expr in used_expressions(edge.action) {
                universe.0.insert(expr);
            }
        }
        Self { universe }
    }

    #[must_use]
    pub fn universe(&self) -> &ExpressionSet {
        &self.universe
    }
}

/// Accessors written by an action.
fn modified(action: &Action) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    match action {
        Action::IntDeclaration { name }
        | Action::ArrayDeclaration { name, .. }
        | Action::IntAssignment { name, .. }
        | Action::ArrayAssignment { name, .. }
        | Action::ReadVariable { name }
        | Action::ReadArray { name, .. } => {
            names.insert(name.clone());
        }
        Action::RecordDeclaration { name } | Action::RecordAssignment { name, .. } => {
            names.insert(format!("{name}.{}", RecordMember::Fst));
            names.insert(format!("{name}.{}", RecordMember::Snd));
        }
        Action::RecordMemberAssignment { name, member, .. }
        | Action::ReadRecordMember { name, member } => {
            names.insert(format!("{name}.{member}"));
        }
        Action::Write { .. } | Action::Condition { .. } => {}
    }
    names
}

/// Binary subexpressions evaluated by an action.
fn used_expressions(action: &Action) -> BTreeSet<ArithmeticExpression> {
    match action {
        Action::IntDeclaration { .. }
        | Action::ArrayDeclaration { .. }
        | Action::RecordDeclaration { .. }
        | Action::ReadVariable { .. }
        | Action::ReadRecordMember { .. } => BTreeSet::new(),
        Action::IntAssignment { value, .. }
        | Action::RecordMemberAssignment { value, .. }
        | Action::Write { value } => value.subexpressions(),
        Action::ArrayAssignment { index, value, .. } => {
            let mut exprs = index.subexpressions();
            exprs.append(&mut value.subexpressions());
            exprs
        }
        Action::RecordAssignment { first, second, .. } => {
            let mut exprs = first.subexpressions();
            exprs.append(&mut second.subexpressions());
            exprs
        }
        Action::ReadArray { index, .. } => index.subexpressions(),
        Action::Condition { value } => value.subexpressions(),
    }
}

impl BitVectorAnalysis for AvailableExpressions {
    type State = ExpressionSet;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn join_operator(&self) -> JoinOperator {
        JoinOperator::Intersection
    }

    fn initial_state(&self, graph: &ProgramGraph, node: NodeIndex) -> Self::State {
        if node == graph.start() {
            ExpressionSet::default()
        } else {
            self.universe.clone()
        }
    }

    fn kill(&self, edge: &EdgeView, state: &mut Self::State) {
        let written = modified(edge.action);
        if written.is_empty() {
            return;
        }
        state
            .0
            .retain(|expr| expr.variables().is_disjoint(&written));
    }

    fn generate(&self, edge: &EdgeView, state: &mut Self::State) {
        let written = modified(edge.action);
        for expr in used_expressions(edge.action) {
            if expr.variables().is_disjoint(&written) {
                state.0.insert(expr);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataflow::bitvector::BitVectorFramework;
    use crate::dataflow::Analysis;
    use crate::errors::AnalysisError;
    use crate::worklist::WorklistKind;
    use mc_syntax::parse_program;

    const PROGRAM: &str = "int x; int y; int a; int b; read a; read b; x := a + b; \
                           while (a + b > y) { y := a + b; a := a + 1; } write y;";

    fn solved(kind: WorklistKind) -> (Vec<(String, ExpressionSet)>, u64) {
        let graph = ProgramGraph::from_program(&parse_program(PROGRAM).unwrap());
        let transfer = BitVectorFramework(AvailableExpressions::new(&graph));
        let mut analysis = Analysis::new(&graph, transfer, kind);
        analysis.initialize();
        analysis.solve().unwrap();
        let results = analysis
            .results()
            .unwrap()
            .into_iter()
            .map(|(label, state)| (label.to_string(), state.clone()))
            .collect();
        (results, analysis.insertions())
    }

    fn rendered(results: &[(String, ExpressionSet)], label: &str) -> String {
        results
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, state)| state.to_string())
            .unwrap()
    }

    #[test]
    fn universe_holds_every_binary_subexpression() {
        let graph = ProgramGraph::from_program(&parse_program(PROGRAM).unwrap());
        let analysis = AvailableExpressions::new(&graph);
        assert_eq!(analysis.universe().to_string(), "{(a + 1), (a + b)}");
    }

    #[test]
    fn loop_head_invalidated_by_counter_update() {
        let (results, _) = solved(WorklistKind::Lifo);
        assert_eq!(rendered(&results, "q_start"), "{}");
        assert_eq!(rendered(&results, "q7"), "{}");
        assert_eq!(rendered(&results, "q8"), "{(a + b)}");
        assert_eq!(rendered(&results, "q9"), "{(a + b)}");
        assert_eq!(rendered(&results, "q10"), "{(a + b)}");
        assert_eq!(rendered(&results, "q_end"), "{(a + b)}");
    }

    #[test]
    fn stack_scheduler_insertion_count() {
        let (_, insertions) = solved(WorklistKind::Lifo);
        assert_eq!(insertions, 25);
    }

    #[test]
    fn expression_sets_only_order_by_subset() {
        let set = ExpressionSet::default();
        assert!(set.is_subset(&set).unwrap());
        assert!(matches!(
            set.is_superset(&set),
            Err(AnalysisError::UnsupportedOrdering(_))
        ));
    }
}
