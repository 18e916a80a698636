//! # `MicroC` Analyses
//!
//! `microc` is the main crate of the `MicroC` static analysis project. The
//! project is subdivided into multiple crates, `microc` acts as entry point
//! by reexporting important structs and functions from those sub-crates.
//! Most of the reexports are done within the `microc::prelude` namespace.
//!
//! ## Library basics
//!
//! A `MicroC` source text is parsed into a statement list, turned into a
//! program graph, and then analysed by one of the shipped dataflow
//! analyses:
//!
//! ```rust
//! use microc::prelude::*;
//!
//! let program = parse_program("int x; read x; write x + 1;")?;
//! let graph = ProgramGraph::from_program(&program);
//! let analysis = microc::analysis::reaching_definitions(&graph, WorklistKind::Fifo)?;
//! println!("at exit: {}", analysis.state_at("q_end")?);
//! # Ok::<(), McError>(())
//! ```
//!
//! ## Sub-crates
//!
//! The `MicroC` project is divided into several crates. Some of them are
//! (completely or partially) re-exported as parts of [`prelude`]. Here is a
//! list of those sub-crates:
//!
//!  - [`mc_syntax`] contains the `MicroC` grammar definitions, the parser
//!    and the abstract syntax tree,
//!  - [`mc_analysis`] contains the program graph construction and all the
//!    analysis algorithms: the constraint lattices, the transfer families,
//!    the worklist schedulers and the fixed-point driver.

mod errors;

pub mod cli;
pub mod mc_dataflow;
pub mod mc_graph;

pub use mc_analysis as analysis;
pub use mc_syntax as syntax;

/// Reexport module of commonly used structures and functions from `MicroC`
/// project sub-crates:
///
/// ```rust
/// use microc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{McError, McResult};

    pub use mc_analysis::graph::ProgramGraph;
    pub use mc_analysis::worklist::WorklistKind;
    pub use mc_analysis::{analyses, dataflow};

    pub use mc_syntax::{parse_program, Statement};

    use clap::ArgMatches;

    pub fn init_logger(args: &ArgMatches) {
        let env = env_logger::Env::new()
            .filter_or("MC_LOG", "info")
            .write_style("MC_LOG_STYLE");

        let mut builder = env_logger::Builder::from_env(env);
        if args.get_flag("verbose") {
            builder.filter_level(log::LevelFilter::Trace);
        } else if args.get_flag("debug") {
            builder.filter_level(log::LevelFilter::Debug);
        }
        if args.get_flag("ecslog") {
            builder.format(ecs_logger::format);
        }
        builder.init();
    }
}
