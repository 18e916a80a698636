//! Analysis errors definition.

use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("constraint type '{0}' does not implement this ordering direction")]
    UnsupportedOrdering(&'static str),

    #[error("extract called on an empty worklist")]
    EmptyWorklist,

    #[error("analysis has not been initialized")]
    NotInitialized,

    #[error("analysis has not reached a fixed point yet")]
    NotStable,

    #[error("unknown node: {0}")]
    UnknownNode(String),
}
