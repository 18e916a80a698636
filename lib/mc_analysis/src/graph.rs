//! Program graph construction.
//!
//! A program graph is the control-flow view of a MicroC program: nodes are
//! program points named `q_start`, `q1`, .., `qN`, `q_end`, and each edge
//! carries the [`Action`] executed when control crosses it. Straight-line
//! statements chain through fresh nodes; `if` forks on a condition and its
//! negation; `while` emits a back edge from the last body node to the loop
//! head. The graph is built once and never mutated afterwards.

use crate::actions::Action;
use mc_syntax::ast::{ReadTarget, RecordMember, Statement};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::BTreeSet;

pub const START_NODE: &str = "q_start";
pub const END_NODE: &str = "q_end";
pub const NODE_PREFIX: &str = "q";

/// A borrowed view of one program graph edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'g> {
    pub source: NodeIndex,
    pub target: NodeIndex,
    /// Label of the source node.
    pub from: &'g str,
    /// Label of the target node.
    pub to: &'g str,
    pub action: &'g Action,
}

#[derive(Debug)]
pub struct ProgramGraph {
    inner: DiGraph<String, Action>,
    /// All nodes in label order: `q_start`, `q1`, .., `qN`, `q_end`.
    nodes: Vec<NodeIndex>,
    start: NodeIndex,
    end: NodeIndex,
    variables: BTreeSet<String>,
}

impl ProgramGraph {
    #[must_use]
    pub fn from_program(program: &[Statement]) -> Self {
        let mut builder = GraphBuilder::new();
        builder.block(program, builder.start, Some(builder.end));
        builder.finish()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Nodes in label order, `q_start` first and `q_end` last.
    #[inline]
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }

    #[must_use]
    pub fn label(&self, node: NodeIndex) -> &str {
        &self.inner[node]
    }

    #[must_use]
    pub fn node_by_label(&self, label: &str) -> Option<NodeIndex> {
        self.nodes.iter().copied().find(|n| self.inner[*n] == label)
    }

    #[must_use]
    pub fn start(&self) -> NodeIndex {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NodeIndex {
        self.end
    }

    /// Names of all variables written somewhere in the program, record
    /// members amalgamated as `r.fst` / `r.snd`. Used to seed constraints.
    #[must_use]
    pub fn variable_names(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// Incoming edges of `node`, in edge creation order.
    #[must_use]
    pub fn in_edges(&self, node: NodeIndex) -> Vec<EdgeView> {
        self.edges(node, Direction::Incoming)
    }

    /// Outgoing edges of `node`, in edge creation order.
    #[must_use]
    pub fn out_edges(&self, node: NodeIndex) -> Vec<EdgeView> {
        self.edges(node, Direction::Outgoing)
    }

    pub fn edges_iter(&self) -> impl Iterator<Item = EdgeView> + '_ {
        self.inner.edge_references().map(|edge| EdgeView {
            source: edge.source(),
            target: edge.target(),
            from: &self.inner[edge.source()],
            to: &self.inner[edge.target()],
            action: edge.weight(),
        })
    }

    fn edges(&self, node: NodeIndex, direction: Direction) -> Vec<EdgeView> {
        // edges_directed iterates most-recently-added first
        let mut refs: Vec<_> = self.inner.edges_directed(node, direction).collect();
        refs.sort_by_key(|edge| edge.id());
        refs.into_iter()
            .map(|edge| EdgeView {
                source: edge.source(),
                target: edge.target(),
                from: &self.inner[edge.source()],
                to: &self.inner[edge.target()],
                action: edge.weight(),
            })
            .collect()
    }

    #[must_use]
    pub fn to_dot(&self) -> String {
        let body = Dot::with_attr_getters(
            &self.inner,
            &[Config::GraphContentOnly, Config::EdgeNoLabel],
            &|_, edge| {
                let color = match edge.weight() {
                    Action::Condition { .. } => "blue",
                    _ => "black",
                };
                format!("color={},xlabel=\"{}\"", color, edge.weight())
            },
            &|_, node| {
                if *node.1 == START_NODE || *node.1 == END_NODE {
                    String::from("shape=box")
                } else {
                    String::from("shape=circle")
                }
            },
        );
        format!("digraph {{\n  rankdir=TB;\n{body}}}")
    }
}

struct GraphBuilder {
    graph: DiGraph<String, Action>,
    start: NodeIndex,
    end: NodeIndex,
    fresh: Vec<NodeIndex>,
    variables: BTreeSet<String>,
}

impl GraphBuilder {
    fn new() -> Self {
        let mut graph = DiGraph::new();
        let start = graph.add_node(START_NODE.to_string());
        let end = graph.add_node(END_NODE.to_string());
        Self {
            graph,
            start,
            end,
            fresh: Vec::new(),
            variables: BTreeSet::new(),
        }
    }

    fn finish(self) -> ProgramGraph {
        let mut nodes = Vec::with_capacity(self.graph.node_count());
        nodes.push(self.start);
        nodes.extend(&self.fresh);
        nodes.push(self.end);
        ProgramGraph {
            inner: self.graph,
            nodes,
            start: self.start,
            end: self.end,
            variables: self.variables,
        }
    }

    fn fresh(&mut self) -> NodeIndex {
        let label = format!("{}{}", NODE_PREFIX, self.fresh.len() + 1);
        let node = self.graph.add_node(label);
        self.fresh.push(node);
        node
    }

    fn target(&mut self, to: Option<NodeIndex>) -> NodeIndex {
        to.unwrap_or_else(|| self.fresh())
    }

    /// Builds a statement sequence from `from`; the last statement lands on
    /// `to` when one is supplied. Returns the sequence's final node.
    fn block(&mut self, stmts: &[Statement], from: NodeIndex, to: Option<NodeIndex>) -> NodeIndex {
        let mut current = from;
        for (i, stmt) in stmts.iter().enumerate() {
            let target = if i == stmts.len() - 1 { to } else { None };
            current = self.statement(stmt, current, target);
        }
        current
    }

    fn statement(&mut self, stmt: &Statement, from: NodeIndex, to: Option<NodeIndex>) -> NodeIndex {
        match stmt {
            Statement::If {
                condition,
                then_branch,
                else_branch: None,
            } => {
                let branch = self.fresh();
                self.edge(from, branch, Action::Condition {
                    value: condition.clone(),
                });
                let after = self.block(then_branch, branch, to);
                self.edge(from, after, Action::Condition {
                    value: condition.negated(),
                });
                after
            }
            Statement::If {
                condition,
                then_branch,
                else_branch: Some(else_branch),
            } => {
                let then_entry = self.fresh();
                self.edge(from, then_entry, Action::Condition {
                    value: condition.clone(),
                });
                let after = self.block(then_branch, then_entry, to);
                let else_entry = self.fresh();
                self.edge(from, else_entry, Action::Condition {
                    value: condition.negated(),
                });
                self.block(else_branch, else_entry, Some(after));
                after
            }
            Statement::While { condition, body } => {
                let body_entry = self.fresh();
                self.edge(from, body_entry, Action::Condition {
                    value: condition.clone(),
                });
                // the last body statement loops back to the head
                self.block(body, body_entry, Some(from));
                let after = self.target(to);
                self.edge(from, after, Action::Condition {
                    value: condition.negated(),
                });
                after
            }
            simple => {
                let action = self.action(simple);
                let target = self.target(to);
                self.edge(from, target, action);
                target
            }
        }
    }

    fn action(&mut self, stmt: &Statement) -> Action {
        match stmt {
            Statement::IntDeclaration { name } => {
                self.variables.insert(name.clone());
                Action::IntDeclaration { name: name.clone() }
            }
            Statement::ArrayDeclaration { name, size } => {
                self.variables.insert(name.clone());
                Action::ArrayDeclaration {
                    name: name.clone(),
                    size: *size,
                }
            }
            Statement::RecordDeclaration { name } => {
                self.record_variables(name);
                Action::RecordDeclaration { name: name.clone() }
            }
            Statement::IntAssignment { name, value } => {
                self.variables.insert(name.clone());
                Action::IntAssignment {
                    name: name.clone(),
                    value: value.clone(),
                }
            }
            Statement::ArrayAssignment { name, index, value } => {
                self.variables.insert(name.clone());
                Action::ArrayAssignment {
                    name: name.clone(),
                    index: index.clone(),
                    value: value.clone(),
                }
            }
            Statement::RecordAssignment {
                name,
                first,
                second,
            } => {
                self.record_variables(name);
                Action::RecordAssignment {
                    name: name.clone(),
                    first: first.clone(),
                    second: second.clone(),
                }
            }
            Statement::RecordMemberAssignment {
                name,
                member,
                value,
            } => {
                self.variables.insert(format!("{name}.{member}"));
                Action::RecordMemberAssignment {
                    name: name.clone(),
                    member: *member,
                    value: value.clone(),
                }
            }
            Statement::Read(ReadTarget::Variable(name)) => {
                self.variables.insert(name.clone());
                Action::ReadVariable { name: name.clone() }
            }
            Statement::Read(ReadTarget::Array(name, index)) => {
                self.variables.insert(name.clone());
                Action::ReadArray {
                    name: name.clone(),
                    index: index.clone(),
                }
            }
            Statement::Read(ReadTarget::RecordMember(name, member)) => {
                self.variables.insert(format!("{name}.{member}"));
                Action::ReadRecordMember {
                    name: name.clone(),
                    member: *member,
                }
            }
            Statement::Write(value) => Action::Write {
                value: value.clone(),
            },
            Statement::If { .. } | Statement::While { .. } => {
                unreachable!("control statements are expanded by the builder")
            }
        }
    }

    fn record_variables(&mut self, name: &str) {
        self.variables.insert(format!("{name}.{}", RecordMember::Fst));
        self.variables.insert(format!("{name}.{}", RecordMember::Snd));
    }

    fn edge(&mut self, from: NodeIndex, to: NodeIndex, action: Action) {
        self.graph.add_edge(from, to, action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_syntax::parse_program;

    fn graph(source: &str) -> ProgramGraph {
        ProgramGraph::from_program(&parse_program(source).unwrap())
    }

    #[test]
    fn declaration_and_assignment() {
        let graph = graph("int x; x := 2;");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph
            .edges_iter()
            .any(|e| matches!(e.action, Action::IntDeclaration { .. })));
    }

    #[test]
    fn fibonacci_graph_shape() {
        let graph = graph(
            "int f2; int input; int current; f1 := 1; f2 := 1; read input; \
             if (input == 0 | input == 1) { current := 1; } \
             while (input > 1) { current := f1 + f2; f2 := f1; f1 := current; input := input - 1; } \
             write current;",
        );
        assert_eq!(graph.node_count(), 15);
        assert_eq!(graph.edge_count(), 16);
        for i in 1..=13 {
            let label = format!("{NODE_PREFIX}{i}");
            assert!(graph.node_by_label(&label).is_some(), "missing {label}");
        }
        assert!(graph.node_by_label(END_NODE).is_some());
        assert!(graph
            .edges_iter()
            .any(|e| matches!(e.action, Action::Condition { .. })));
    }

    #[test]
    fn sum_array_graph_shape() {
        let graph = graph(
            "int[6] n; int x; int r; n[0] := 2; n[1] := 7; n[2] := 1; n[3] := 9; \
             n[4] := 2; n[5] := 5; x := 0; r := 0; \
             while (x < 6) { r := r + n[x]; x := x + 1; }",
        );
        assert_eq!(graph.node_count(), 15);
        assert_eq!(graph.edge_count(), 15);
        assert!(graph
            .edges_iter()
            .any(|e| matches!(e.action, Action::ArrayAssignment { .. })));
    }

    #[test]
    fn record_sort_graph_shape() {
        let graph = graph(
            "{ int fst; int snd } r; int isUnchanged; r := (3, 1); \
             if (r.fst > r.snd) { tmp := r.fst; r.fst := r.snd; r.snd := tmp; isUnchanged := 0; } \
             else { isUnchanged := 1; } write isUnchanged;",
        );
        assert_eq!(
            graph
                .edges_iter()
                .filter(|e| matches!(e.action, Action::RecordAssignment { .. }))
                .count(),
            1
        );
        assert_eq!(
            graph
                .edges_iter()
                .filter(|e| matches!(e.action, Action::Condition { .. }))
                .count(),
            2
        );
        // the after-node of the if-else is the single join point
        assert_eq!(
            graph
                .nodes()
                .filter(|n| graph.in_edges(*n).len() == 2)
                .count(),
            1
        );
    }

    #[test]
    fn while_back_edge_targets_loop_head() {
        let graph = graph("int x; while (x < 6) { x := x + 1; } write x;");
        let head = graph.node_by_label("q1").unwrap();
        let back = graph
            .in_edges(head)
            .into_iter()
            .find(|e| matches!(e.action, Action::IntAssignment { .. }))
            .expect("back edge");
        assert_eq!(graph.label(back.source), "q2");
    }

    #[test]
    fn variable_names_include_assignment_targets_and_members() {
        let graph = graph("{ int fst; int snd } r; x := 1; r.fst := x;");
        let names = graph.variable_names();
        assert!(names.contains("x"));
        assert!(names.contains("r.fst"));
        assert!(names.contains("r.snd"));
    }
}
