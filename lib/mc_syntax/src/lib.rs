//! MicroC front-end.
//!
//! This crate contains the MicroC abstract syntax tree types and the text
//! parsers that produce them. It is the entry point of every analysis
//! pipeline: source text comes in, a statement sequence comes out, and the
//! `mc_analysis` crate turns that sequence into a program graph.

#![forbid(unsafe_code)]

pub mod ast;
pub mod errors;
pub mod parsers;

pub use crate::ast::{
    ArithmeticExpression, ArithmeticOperator, BooleanExpression, BooleanOperator, ReadTarget,
    RecordMember, RelationalOperator, Statement,
};
pub use crate::errors::{SyntaxError, SyntaxResult};
pub use crate::parsers::parse_program;
