//! Main `MicroC` binary command line arguments options.
//!
//! This module declares a function to build `clap` command line arguments
//! parser, so that it can be used from other places than the main binary,
//! such as from bash completion file generator.

use clap::{value_parser, Arg, ArgAction, Command};
use clap_complete::Shell;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

fn arg_debug() -> Arg {
    Arg::new("debug")
        .short('d')
        .long("debug")
        .action(ArgAction::SetTrue)
        .help("Activate debug mode")
}

fn arg_verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Activate verbose mode")
}

fn arg_ecslog() -> Arg {
    Arg::new("ecslog")
        .short('e')
        .long("ecslog")
        .action(ArgAction::SetTrue)
        .help("Output logs in ECS format")
}

fn arg_input() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .action(ArgAction::Set)
        .required(true)
        .help("Input MicroC source file")
}

fn arg_output(help: &str) -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .action(ArgAction::Set)
        .help(help.to_string())
}

fn arg_filter_node() -> Arg {
    Arg::new("filter-node")
        .long("filter-node")
        .action(ArgAction::Set)
        .help("Node label(s) regex filter")
}

#[must_use]
pub fn microc() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author(AUTHORS)
        .about(DESCRIPTION)
        .subcommand(graph())
        .subcommand(analyse())
        .subcommand(
            Command::new("gen-completions")
                .about("Generates completions file")
                .arg(
                    Arg::new("shell")
                        .short('s')
                        .long("shell")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(Shell))
                        .required(true)
                        .help("Shell type for completion generation"),
                ),
        )
}

#[must_use]
pub fn graph() -> Command {
    Command::new("graph")
        .bin_name("mc-graph")
        .version(VERSION)
        .author(AUTHORS)
        .about("Builds the program graph of a MicroC program")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(arg_output("Output dot file"))
}

#[must_use]
pub fn analyse() -> Command {
    Command::new("analyse")
        .bin_name("mc-analyse")
        .version(VERSION)
        .author(AUTHORS)
        .about("Runs a dataflow analysis onto a MicroC program")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(
            Arg::new("analysis")
                .short('a')
                .long("analysis")
                .action(ArgAction::Set)
                .value_parser([
                    "reaching-definitions",
                    "live-variables",
                    "available-expressions",
                    "detection-of-signs",
                    "faint-variables",
                ])
                .required(true)
                .help("Analysis to run"),
        )
        .arg(
            Arg::new("worklist")
                .short('w')
                .long("worklist")
                .action(ArgAction::Set)
                .value_parser(["fifo", "lifo", "natural"])
                .default_value("fifo")
                .help("Worklist scheduler"),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Output results as JSON"),
        )
        .arg(arg_filter_node())
}
