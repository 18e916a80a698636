//! Loop-aware scheduler based on reverse-postorder numbering.
//!
//! The scheduler numbers all nodes in reverse postorder along the
//! propagation direction, detects natural loops from back edges, and groups
//! nodes into components (the innermost loop body containing the node, or a
//! singleton). A pending node becomes ready once no component feeding into
//! its own from upstream still has pending work; ready nodes are then
//! drained in reverse postorder before the next batch is selected. On an
//! acyclic graph this degenerates to one full reverse-postorder sweep per
//! propagation wave.

use crate::dataflow::Direction;
use crate::errors::{AnalysisError, AnalysisResult};
use crate::graph::ProgramGraph;
use crate::worklist::Worklist;
use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeSet, HashMap, VecDeque};

pub struct NaturalOrderingWorklist {
    /// Reverse-postorder number per node, indexed by `NodeIndex::index`.
    rpo: Vec<usize>,
    /// Component id per node.
    component_of: Vec<usize>,
    /// Component id to member node indices.
    components: Vec<BTreeSet<usize>>,
    /// Component id to ids of upstream components feeding into it.
    ancestors: Vec<BTreeSet<usize>>,
    /// Nodes selected for the current wave, in reverse postorder.
    visit: VecDeque<NodeIndex>,
    /// Nodes awaiting selection into a wave.
    pending: BTreeSet<NodeIndex>,
    insertions: u64,
}

impl NaturalOrderingWorklist {
    #[must_use]
    pub fn new(graph: &ProgramGraph, direction: Direction) -> Self {
        let n = graph.node_count();
        let (successors, predecessors) = flow_adjacency(graph, direction);
        let root = match direction {
            Direction::Forward => graph.start(),
            Direction::Backward => graph.end(),
        };
        let rpo = reverse_postorder(&successors, root.index(), n);
        let loops = natural_loops(&successors, &predecessors, &rpo);
        let (component_of, components) = components(n, &loops);
        let ancestors = component_ancestors(&components, &component_of, &predecessors, &rpo);
        Self {
            rpo,
            component_of,
            components,
            ancestors,
            visit: VecDeque::new(),
            pending: BTreeSet::new(),
            insertions: 0,
        }
    }

    /// Whether every upstream component of `component` is free of pending
    /// work, transitively.
    fn ancestor_chain_clear(&self, component: usize) -> bool {
        let mut visited = FixedBitSet::with_capacity(self.components.len());
        let mut stack: Vec<usize> = self.ancestors[component].iter().copied().collect();
        while let Some(ancestor) = stack.pop() {
            if visited.contains(ancestor) {
                continue;
            }
            visited.insert(ancestor);
            let blocked = self
                .pending
                .iter()
                .any(|node| self.components[ancestor].contains(&node.index()));
            if blocked {
                return false;
            }
            stack.extend(self.ancestors[ancestor].iter().copied());
        }
        true
    }
}

impl Worklist for NaturalOrderingWorklist {
    fn is_empty(&self) -> bool {
        self.visit.is_empty() && self.pending.is_empty()
    }

    fn insert(&mut self, node: NodeIndex) {
        self.insertions += 1;
        if !self.visit.contains(&node) {
            self.pending.insert(node);
        }
    }

    fn extract(&mut self) -> AnalysisResult<NodeIndex> {
        if let Some(node) = self.visit.pop_front() {
            return Ok(node);
        }
        if self.pending.is_empty() {
            return Err(AnalysisError::EmptyWorklist);
        }
        let mut ready: Vec<NodeIndex> = self
            .pending
            .iter()
            .copied()
            .filter(|node| self.ancestor_chain_clear(self.component_of[node.index()]))
            .collect();
        if ready.is_empty() {
            // irreducible flow, fall back to the lowest-numbered node
            if let Some(node) = self
                .pending
                .iter()
                .copied()
                .min_by_key(|node| self.rpo[node.index()])
            {
                ready.push(node);
            }
        }
        ready.sort_by_key(|node| self.rpo[node.index()]);
        for node in &ready {
            self.pending.remove(node);
        }
        let mut wave = ready.into_iter();
        let head = wave.next().ok_or(AnalysisError::EmptyWorklist)?;
        self.visit.extend(wave);
        Ok(head)
    }

    fn insertions(&self) -> u64 {
        self.insertions
    }
}

/// Adjacency oriented along the propagation direction, edge targets in
/// creation order.
fn flow_adjacency(graph: &ProgramGraph, direction: Direction) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let n = graph.node_count();
    let mut successors = vec![Vec::new(); n];
    let mut predecessors = vec![Vec::new(); n];
    for edge in graph.edges_iter() {
        let (from, to) = match direction {
            Direction::Forward => (edge.source.index(), edge.target.index()),
            Direction::Backward => (edge.target.index(), edge.source.index()),
        };
        successors[from].push(to);
        predecessors[to].push(from);
    }
    (successors, predecessors)
}

/// Iterative depth-first numbering; nodes unreachable from the root are
/// numbered after all reachable ones.
fn reverse_postorder(successors: &[Vec<usize>], root: usize, n: usize) -> Vec<usize> {
    let mut visited = FixedBitSet::with_capacity(n);
    let mut postorder = Vec::with_capacity(n);
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    visited.insert(root);
    while let Some((node, child)) = stack.last_mut() {
        let node = *node;
        if let Some(&next) = successors[node].get(*child) {
            *child += 1;
            if !visited.contains(next) {
                visited.insert(next);
                stack.push((next, 0));
            }
        } else {
            stack.pop();
            postorder.push(node);
        }
    }
    let mut rpo = vec![0; n];
    let mut number = postorder.len();
    for node in &postorder {
        rpo[*node] = number;
        number -= 1;
    }
    let mut overflow = postorder.len() + 1;
    for node in 0..n {
        if !visited.contains(node) {
            rpo[node] = overflow;
            overflow += 1;
        }
    }
    rpo
}

/// Natural loop bodies keyed by header: for every back edge (an edge whose
/// target does not follow its source in reverse postorder), the body is the
/// target plus everything reaching the source without passing the header.
fn natural_loops(
    successors: &[Vec<usize>],
    predecessors: &[Vec<usize>],
    rpo: &[usize],
) -> HashMap<usize, BTreeSet<usize>> {
    let mut loops: HashMap<usize, BTreeSet<usize>> = HashMap::new();
    for (from, targets) in successors.iter().enumerate() {
        for &to in targets {
            if rpo[to] <= rpo[from] {
                let body = loops.entry(to).or_default();
                body.insert(to);
                let mut work = vec![from];
                while let Some(node) = work.pop() {
                    if body.insert(node) {
                        work.extend(predecessors[node].iter().copied());
                    }
                }
            }
        }
    }
    loops
}

/// Assigns each node its innermost containing loop body, or a singleton.
/// Identical bodies share one component id.
fn components(
    n: usize,
    loops: &HashMap<usize, BTreeSet<usize>>,
) -> (Vec<usize>, Vec<BTreeSet<usize>>) {
    let mut ids: HashMap<BTreeSet<usize>, usize> = HashMap::new();
    let mut components: Vec<BTreeSet<usize>> = Vec::new();
    let mut component_of = vec![0; n];
    for node in 0..n {
        let innermost = loops
            .values()
            .filter(|body| body.contains(&node))
            .min_by_key(|body| body.len());
        let set = match innermost {
            Some(body) => body.clone(),
            None => BTreeSet::from([node]),
        };
        let id = *ids.entry(set.clone()).or_insert_with(|| {
            components.push(set);
            components.len() - 1
        });
        component_of[node] = id;
    }
    (component_of, components)
}

/// Upstream components: for each member, components of flow predecessors
/// outside the member's component that precede it in reverse postorder.
fn component_ancestors(
    components: &[BTreeSet<usize>],
    component_of: &[usize],
    predecessors: &[Vec<usize>],
    rpo: &[usize],
) -> Vec<BTreeSet<usize>> {
    components
        .iter()
        .enumerate()
        .map(|(id, body)| {
            let mut upstream = BTreeSet::new();
            for &member in body {
                for &pred in &predecessors[member] {
                    if !body.contains(&pred) && rpo[pred] < rpo[member] {
                        let pred_component = component_of[pred];
                        if pred_component != id {
                            upstream.insert(pred_component);
                        }
                    }
                }
            }
            upstream
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_syntax::parse_program;

    fn graph(source: &str) -> ProgramGraph {
        ProgramGraph::from_program(&parse_program(source).unwrap())
    }

    #[test]
    fn straight_line_drains_in_reverse_postorder() {
        let graph = graph("int a; int b; a := 3; read b; write a + b;");
        let mut worklist = NaturalOrderingWorklist::new(&graph, Direction::Forward);
        for node in graph.nodes() {
            worklist.insert(node);
        }
        let mut order = Vec::new();
        while !worklist.is_empty() {
            order.push(graph.label(worklist.extract().unwrap()).to_string());
        }
        assert_eq!(order, ["q_start", "q1", "q2", "q3", "q4", "q_end"]);
    }

    #[test]
    fn loop_body_forms_one_component() {
        let graph = graph("int x; while (x < 6) { x := x + 1; } write x;");
        let worklist = NaturalOrderingWorklist::new(&graph, Direction::Forward);
        // q1 is the loop head, q2 the single body node
        let head = graph.node_by_label("q1").unwrap().index();
        let body = graph.node_by_label("q2").unwrap().index();
        assert_eq!(worklist.component_of[head], worklist.component_of[body]);
        let after = graph.node_by_label("q3").unwrap().index();
        assert_ne!(worklist.component_of[head], worklist.component_of[after]);
    }

    #[test]
    fn loop_nodes_wait_for_upstream_work() {
        let graph = graph("int x; read x; while (x > 0) { x := x - 1; } write x;");
        let mut worklist = NaturalOrderingWorklist::new(&graph, Direction::Forward);
        for node in graph.nodes() {
            worklist.insert(node);
        }
        // the first extraction wave must start at q_start, not inside the loop
        let first = worklist.extract().unwrap();
        assert_eq!(graph.label(first), "q_start");
    }

    #[test]
    fn extract_on_empty_fails() {
        let graph = graph("int x;");
        let mut worklist = NaturalOrderingWorklist::new(&graph, Direction::Forward);
        assert!(matches!(
            worklist.extract(),
            Err(AnalysisError::EmptyWorklist)
        ));
    }
}
