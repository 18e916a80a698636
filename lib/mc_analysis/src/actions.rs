//! Edge actions of the program graph.
//!
//! Every edge of a program graph carries exactly one action, the elementary
//! step executed when control crosses the edge. The variant set is closed:
//! each transfer function matches on it exhaustively, so adding a statement
//! kind to the language surfaces as compile errors in every analysis.

use mc_syntax::ast::{ArithmeticExpression, BooleanExpression, RecordMember};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
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
    ReadVariable {
        name: String,
    },
    ReadArray {
        name: String,
        index: ArithmeticExpression,
    },
    ReadRecordMember {
        name: String,
        member: RecordMember,
    },
    Write {
        value: ArithmeticExpression,
    },
    Condition {
        value: BooleanExpression,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::IntDeclaration { name } => write!(f, "int {name};"),
            Self::ArrayDeclaration { name, size } => write!(f, "int[{size}] {name};"),
            Self::RecordDeclaration { name } => write!(f, "{{ int fst; int snd }} {name};"),
            Self::IntAssignment { name, value } => write!(f, "{name} := {value};"),
            Self::ArrayAssignment { name, index, value } => {
                write!(f, "{name}[{index}] := {value};")
            }
            Self::RecordAssignment {
                name,
                first,
                second,
            } => write!(f, "{name} := ({first}, {second});"),
            Self::RecordMemberAssignment {
                name,
                member,
                value,
            } => write!(f, "{name}.{member} := {value};"),
            Self::ReadVariable { name } => write!(f, "read {name};"),
            Self::ReadArray { name, index } => write!(f, "read {name}[{index}];"),
            Self::ReadRecordMember { name, member } => write!(f, "read {name}.{member};"),
            Self::Write { value } => write!(f, "write {value};"),
            Self::Condition { value } => write!(f, "{value}"),
        }
    }
}
