//! The shipped analyses.
//!
//! Each submodule pairs a constraint type with a transfer family
//! implementation. Reaching definitions, live variables and available
//! expressions are kill/generate analyses; detection of signs and faint
//! variables need state-dependent transfers and use the monotone family.

pub mod available_expressions;
pub mod detection_of_signs;
pub mod faint_variables;
pub mod live_variables;
pub mod reaching_definitions;

pub use available_expressions::AvailableExpressions;
pub use detection_of_signs::DetectionOfSigns;
pub use faint_variables::FaintVariables;
pub use live_variables::LiveVariables;
pub use reaching_definitions::ReachingDefinitions;

use crate::dataflow::Lattice;
use crate::errors::AnalysisResult;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A plain set of accessor names, the constraint of the liveness analyses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableSet(pub BTreeSet<String>);

impl Lattice for VariableSet {
    fn join(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    fn is_superset(&self, other: &Self) -> AnalysisResult<bool> {
        Ok(other.0.is_subset(&self.0))
    }
}

impl fmt::Display for VariableSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
        }
        write!(f, "}}")
    }
}
