//! Detection of signs.
//!
//! Forward monotone analysis over per-accessor sign sets. Declarations
//! zero-initialize, `read` widens to all signs, integer assignment replaces
//! the target's signs with the abstract evaluation of its right-hand side,
//! and array assignment widens (amalgamation). An accessor absent from the
//! map is bottom: evaluating it yields the empty sign set.

use crate::actions::Action;
use crate::dataflow::monotone::MonotoneAnalysis;
use crate::dataflow::{Direction, JoinOperator, Lattice};
use crate::errors::AnalysisResult;
use crate::graph::{EdgeView, ProgramGraph};
use mc_syntax::ast::{ArithmeticExpression, ArithmeticOperator, RecordMember};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    #[must_use]
    pub fn of(n: i64) -> Self {
        match n {
            _ if n < 0 => Self::Negative,
            0 => Self::Zero,
            _ => Self::Positive,
        }
    }

    fn flipped(self) -> Self {
        match self {
            Self::Negative => Self::Positive,
            Self::Zero => Self::Zero,
            Self::Positive => Self::Negative,
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Negative => write!(f, "-"),
            Self::Zero => write!(f, "0"),
            Self::Positive => write!(f, "+"),
        }
    }
}

pub type SignSet = BTreeSet<Sign>;

fn all_signs() -> SignSet {
    SignSet::from([Sign::Negative, Sign::Zero, Sign::Positive])
}

/// Accessor name to possible signs. Absent entries and empty sets are
/// interchangeable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignMap(pub BTreeMap<String, SignSet>);

impl SignMap {
    fn get(&self, name: &str) -> SignSet {
        self.0.get(name).cloned().unwrap_or_default()
    }

    fn set(&mut self, name: &str, signs: SignSet) {
        if signs.is_empty() {
            self.0.remove(name);
        } else {
            self.0.insert(name.to_string(), signs);
        }
    }

    fn widen(&mut self, name: &str, signs: SignSet) {
        let mut merged = self.get(name);
        merged.extend(signs);
        self.set(name, merged);
    }
}

impl Lattice for SignMap {
    fn join(&mut self, other: &Self) {
        for (name, signs) in &other.0 {
            if !signs.is_empty() {
                self.0
                    .entry(name.clone())
                    .or_default()
                    .extend(signs.iter().copied());
            }
        }
    }

    fn is_superset(&self, other: &Self) -> AnalysisResult<bool> {
        Ok(other
            .0
            .iter()
            .all(|(name, signs)| signs.is_subset(&self.get(name))))
    }
}

impl fmt::Display for SignMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (name, signs) in &self.0 {
            if signs.is_empty() {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{name}: {{")?;
            for (i, sign) in signs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{sign}")?;
            }
            write!(f, "}}")?;
        }
        write!(f, "}}")
    }
}

/// Abstract evaluation of an arithmetic expression under a sign map.
#[must_use]
pub fn eval(state: &SignMap, expr: &ArithmeticExpression) -> SignSet {
    match expr {
        ArithmeticExpression::Number(n) => SignSet::from([Sign::of(*n)]),
        ArithmeticExpression::Variable(x) => state.get(x),
        ArithmeticExpression::ArrayAccess(a, _) => state.get(a),
        ArithmeticExpression::RecordAccess(r, member) => state.get(&format!("{r}.{member}")),
        ArithmeticExpression::Binary(lhs, op, rhs) => {
            combine(*op, &eval(state, lhs), &eval(state, rhs))
        }
    }
}

fn combine(op: ArithmeticOperator, lhs: &SignSet, rhs: &SignSet) -> SignSet {
    let mut result = SignSet::new();
    for &a in lhs {
        for &b in rhs {
            result.extend(combine_one(op, a, b));
        }
    }
    result
}

fn combine_one(op: ArithmeticOperator, a: Sign, b: Sign) -> SignSet {
    match op {
        ArithmeticOperator::Add => add(a, b),
        ArithmeticOperator::Subtract => add(a, b.flipped()),
        ArithmeticOperator::Multiply => match (a, b) {
            (Sign::Zero, _) | (_, Sign::Zero) => SignSet::from([Sign::Zero]),
            _ if a == b => SignSet::from([Sign::Positive]),
            _ => SignSet::from([Sign::Negative]),
        },
        ArithmeticOperator::Divide => match (a, b) {
            // division by zero contributes nothing
            (_, Sign::Zero) => SignSet::new(),
            (Sign::Zero, _) => SignSet::from([Sign::Zero]),
            // integer division truncates towards zero
            _ if a == b => SignSet::from([Sign::Zero, Sign::Positive]),
            _ => SignSet::from([Sign::Negative, Sign::Zero]),
        },
        ArithmeticOperator::Modulo => match (a, b) {
            (_, Sign::Zero) => SignSet::new(),
            (Sign::Zero, _) => SignSet::from([Sign::Zero]),
            // remainder follows the dividend
            _ => SignSet::from([Sign::Zero, a]),
        },
    }
}

fn add(a: Sign, b: Sign) -> SignSet {
    match (a, b) {
        (Sign::Zero, other) | (other, Sign::Zero) => SignSet::from([other]),
        _ if a == b => SignSet::from([a]),
        _ => all_signs(),
    }
}

pub struct DetectionOfSigns;

impl MonotoneAnalysis for DetectionOfSigns {
    type State = SignMap;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn join_operator(&self) -> JoinOperator {
        JoinOperator::Union
    }

    fn initial_state(&self, graph: &ProgramGraph, node: NodeIndex) -> Self::State {
        let mut state = SignMap::default();
        if node == graph.start() {
            for name in graph.variable_names() {
                state.set(name, SignSet::from([Sign::Zero]));
            }
        }
        state
    }

    fn analyse(&self, edge: &EdgeView, state: &mut Self::State) {
        match edge.action {
            Action::IntDeclaration { name } | Action::ArrayDeclaration { name, .. } => {
                state.set(name, SignSet::from([Sign::Zero]));
            }
            Action::RecordDeclaration { name } => {
                let zero = SignSet::from([Sign::Zero]);
                state.set(&format!("{name}.{}", RecordMember::Fst), zero.clone());
                state.set(&format!("{name}.{}", RecordMember::Snd), zero);
            }
            Action::IntAssignment { name, value } => {
                let signs = eval(state, value);
                state.set(name, signs);
            }
            Action::ArrayAssignment { name, value, .. } => {
                let signs = eval(state, value);
                state.widen(name, signs);
            }
            Action::RecordAssignment {
                name,
                first,
                second,
            } => {
                let first_signs = eval(state, first);
                let second_signs = eval(state, second);
                state.set(&format!("{name}.{}", RecordMember::Fst), first_signs);
                state.set(&format!("{name}.{}", RecordMember::Snd), second_signs);
            }
            Action::RecordMemberAssignment {
                name,
                member,
                value,
            } => {
                let signs = eval(state, value);
                state.set(&format!("{name}.{member}"), signs);
            }
            Action::ReadVariable { name } | Action::ReadArray { name, .. } => {
                state.widen(name, all_signs());
            }
            Action::ReadRecordMember { name, member } => {
                state.widen(&format!("{name}.{member}"), all_signs());
            }
            Action::Write { .. } | Action::Condition { .. } => {}
        }
    }
}
