//! MicroC abstract syntax tree definitions.
//!
//! A program is a statement sequence; declarations are ordinary statements
//! and may appear anywhere. All types implement a total order so that
//! expressions can be stored in ordered sets by the analyses.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Record member selector. MicroC records have exactly two integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RecordMember {
    Fst,
    Snd,
}

impl fmt::Display for RecordMember {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Fst => write!(f, "fst"),
            Self::Snd => write!(f, "snd"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Subtract => write!(f, "-"),
            Self::Multiply => write!(f, "*"),
            Self::Divide => write!(f, "/"),
            Self::Modulo => write!(f, "%"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RelationalOperator {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::LessThan => write!(f, "<"),
            Self::LessOrEqual => write!(f, "<="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterOrEqual => write!(f, ">="),
            Self::Equal => write!(f, "=="),
            Self::NotEqual => write!(f, "!="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BooleanOperator {
    And,
    Or,
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::And => write!(f, "&"),
            Self::Or => write!(f, "|"),
        }
    }
}

/// Arithmetic expressions over integers, arrays and record members.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ArithmeticExpression {
    Number(i64),
    Variable(String),
    ArrayAccess(String, Box<ArithmeticExpression>),
    RecordAccess(String, RecordMember),
    Binary(
        Box<ArithmeticExpression>,
        ArithmeticOperator,
        Box<ArithmeticExpression>,
    ),
}

impl ArithmeticExpression {
    /// Names of all accessors read by this expression, record members
    /// amalgamated as `r.fst` / `r.snd`; an array access contributes both
    /// the array name and the variables of its index.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(x) => {
                names.insert(x.clone());
            }
            Self::ArrayAccess(a, index) => {
                names.insert(a.clone());
                index.collect_variables(names);
            }
            Self::RecordAccess(r, member) => {
                names.insert(format!("{r}.{member}"));
            }
            Self::Binary(lhs, _, rhs) => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
        }
    }

    /// All non-trivial (binary) subexpressions, this expression included
    /// when it is itself binary.
    #[must_use]
    pub fn subexpressions(&self) -> BTreeSet<ArithmeticExpression> {
        let mut exprs = BTreeSet::new();
        self.collect_subexpressions(&mut exprs);
        exprs
    }

    fn collect_subexpressions(&self, exprs: &mut BTreeSet<ArithmeticExpression>) {
        match self {
            Self::Binary(lhs, _, rhs) => {
                exprs.insert(self.clone());
                lhs.collect_subexpressions(exprs);
                rhs.collect_subexpressions(exprs);
            }
            Self::ArrayAccess(_, index) => index.collect_subexpressions(exprs),
            Self::Number(_) | Self::Variable(_) | Self::RecordAccess(_, _) => {}
        }
    }
}

impl fmt::Display for ArithmeticExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Variable(x) => write!(f, "{x}"),
            Self::ArrayAccess(a, index) => write!(f, "{a}[{index}]"),
            Self::RecordAccess(r, member) => write!(f, "{r}.{member}"),
            Self::Binary(lhs, op, rhs) => write!(f, "({lhs} {op} {rhs})"),
        }
    }
}

/// Boolean expressions: comparisons combined with `&`, `|` and `!`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BooleanExpression {
    Relation(
        ArithmeticExpression,
        RelationalOperator,
        ArithmeticExpression,
    ),
    Binary(
        Box<BooleanExpression>,
        BooleanOperator,
        Box<BooleanExpression>,
    ),
    Not(Box<BooleanExpression>),
}

impl BooleanExpression {
    /// The negation of this expression, as emitted on the fall-through
    /// branch of `if` and `while` statements.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self::Not(Box::new(self.clone()))
    }

    /// Names of all accessors read by this expression.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        match self {
            Self::Relation(lhs, _, rhs) => {
                let mut names = lhs.variables();
                names.append(&mut rhs.variables());
                names
            }
            Self::Binary(lhs, _, rhs) => {
                let mut names = lhs.variables();
                names.append(&mut rhs.variables());
                names
            }
            Self::Not(inner) => inner.variables(),
        }
    }

    /// All non-trivial arithmetic subexpressions of the comparisons inside
    /// this expression.
    #[must_use]
    pub fn subexpressions(&self) -> BTreeSet<ArithmeticExpression> {
        match self {
            Self::Relation(lhs, _, rhs) => {
                let mut exprs = lhs.subexpressions();
                exprs.append(&mut rhs.subexpressions());
                exprs
            }
            Self::Binary(lhs, _, rhs) => {
                let mut exprs = lhs.subexpressions();
                exprs.append(&mut rhs.subexpressions());
                exprs
            }
            Self::Not(inner) => inner.subexpressions(),
        }
    }
}

impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Relation(lhs, op, rhs) => write!(f, "{lhs} {op} {rhs}"),
            Self::Binary(lhs, op, rhs) => write!(f, "({lhs} {op} {rhs})"),
            Self::Not(inner) => write!(f, "!({inner})"),
        }
    }
}

/// Target of a `read` statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ReadTarget {
    Variable(String),
    Array(String, ArithmeticExpression),
    RecordMember(String, RecordMember),
}

impl fmt::Display for ReadTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Variable(x) => write!(f, "{x}"),
            Self::Array(a, index) => write!(f, "{a}[{index}]"),
            Self::RecordMember(r, member) => write!(f, "{r}.{member}"),
        }
    }
}

/// MicroC statements, declarations included.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Statement {
    IntDeclaration {
        name: String,
    },
    ArrayDeclaration {
        name: String,
        size: u32,
    },
    RecordDeclaration {
        name: String,
    },
    IntAssignment {
        name: String,
        value: ArithmeticExpression,
    },
    ArrayAssignment {
        name: String,
        index: ArithmeticExpression,
        value: ArithmeticExpression,
    },
    RecordAssignment {
        name: String,
        first: ArithmeticExpression,
        second: ArithmeticExpression,
    },
    RecordMemberAssignment {
        name: String,
        member: RecordMember,
        value: ArithmeticExpression,
    },
    Read(ReadTarget),
    Write(ArithmeticExpression),
    If {
        condition: BooleanExpression,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
    },
    While {
        condition: BooleanExpression,
        body: Vec<Statement>,
    },
}
