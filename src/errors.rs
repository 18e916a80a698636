//! Global error handling.
//!
//! Each sub-crate of the project defines its own error type. Their types
//! can be unified, for example in a main function, when winding results at
//! the top-level.

use mc_analysis::errors::AnalysisError;
use mc_syntax::errors::SyntaxError;
use std::io;
use thiserror::Error;

/// An alias for result that can be a [`McError`].
pub type McResult<T> = Result<T, McError>;

/// The main error type for error winding at the top-level.
/// It mainly consists of transparent wrappers over error types that
/// are defined in dependencies.
#[derive(Debug, Error)]
pub enum McError {
    /// Custom error for reporting bad command line arguments usage.
    #[error("bad arguments: {0}")]
    BadArguments(String),

    /// Error that can be returned from [I/O operations](std::io).
    #[error(transparent)]
    IO(#[from] io::Error),

    /// Error that can be returned from regex compilation.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Error that can be returned from JSON serialization.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error that can be returned from [`mc_syntax`] parsing functions.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Error that can be returned from [`mc_analysis`] functions.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
