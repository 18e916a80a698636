//! This crate provides the program graph construction and the dataflow
//! analyses for the `MicroC` project.

#![forbid(unsafe_code)]

pub mod actions;
pub mod analyses;
pub mod dataflow;
pub mod errors;
pub mod graph;
pub mod worklist;

pub use crate::actions::Action;
pub use crate::errors::{AnalysisError, AnalysisResult};
pub use crate::graph::ProgramGraph;
pub use crate::worklist::WorklistKind;

use crate::analyses::{
    AvailableExpressions, DetectionOfSigns, FaintVariables, LiveVariables, ReachingDefinitions,
};
use crate::dataflow::bitvector::BitVectorFramework;
use crate::dataflow::monotone::MonotoneFramework;
use crate::dataflow::{Analysis, Transfer};

fn solve<T: Transfer>(
    graph: &ProgramGraph,
    transfer: T,
    scheduler: WorklistKind,
) -> AnalysisResult<Analysis<'_, T>> {
    let mut analysis = Analysis::new(graph, transfer, scheduler);
    analysis.initialize();
    analysis.solve()?;
    Ok(analysis)
}

/// Solves reaching definitions over `graph`.
///
/// # Errors
///
/// Propagates driver failures, see [`dataflow::Analysis::solve`].
pub fn reaching_definitions(
    graph: &ProgramGraph,
    scheduler: WorklistKind,
) -> AnalysisResult<Analysis<'_, BitVectorFramework<ReachingDefinitions>>> {
    solve(graph, BitVectorFramework(ReachingDefinitions), scheduler)
}

/// Solves live variables over `graph`.
///
/// # Errors
///
/// Propagates driver failures, see [`dataflow::Analysis::solve`].
pub fn live_variables(
    graph: &ProgramGraph,
    scheduler: WorklistKind,
) -> AnalysisResult<Analysis<'_, BitVectorFramework<LiveVariables>>> {
    solve(graph, BitVectorFramework(LiveVariables), scheduler)
}

/// Solves available expressions over `graph`.
///
/// # Errors
///
/// Propagates driver failures, see [`dataflow::Analysis::solve`].
pub fn available_expressions(
    graph: &ProgramGraph,
    scheduler: WorklistKind,
) -> AnalysisResult<Analysis<'_, BitVectorFramework<AvailableExpressions>>> {
    let transfer = BitVectorFramework(AvailableExpressions::new(graph));
    solve(graph, transfer, scheduler)
}

/// Solves detection of signs over `graph`.
///
/// # Errors
///
/// Propagates driver failures, see [`dataflow::Analysis::solve`].
pub fn detection_of_signs(
    graph: &ProgramGraph,
    scheduler: WorklistKind,
) -> AnalysisResult<Analysis<'_, MonotoneFramework<DetectionOfSigns>>> {
    solve(graph, MonotoneFramework(DetectionOfSigns), scheduler)
}

/// Solves faint variables over `graph`.
///
/// # Errors
///
/// Propagates driver failures, see [`dataflow::Analysis::solve`].
pub fn faint_variables(
    graph: &ProgramGraph,
    scheduler: WorklistKind,
) -> AnalysisResult<Analysis<'_, MonotoneFramework<FaintVariables>>> {
    solve(graph, MonotoneFramework(FaintVariables), scheduler)
}
