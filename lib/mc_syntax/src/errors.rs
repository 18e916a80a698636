//! Syntax errors definition.

use thiserror::Error;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("parse error near '{0}'")]
    Parse(String),

    #[error("unexpected end of input")]
    Incomplete,
}
