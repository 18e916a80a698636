use clap::ArgMatches;
use clap_complete::{generate, Shell};
use microc::prelude::*;
use microc::{cli, mc_dataflow, mc_graph};
use std::io;

fn main() -> McResult<()> {
    let args = cli::microc().get_matches();

    match &args.subcommand() {
        Some(("graph", cmd_args)) => mc_graph::run(cmd_args),
        Some(("analyse", cmd_args)) => mc_dataflow::run(cmd_args),
        Some(("gen-completions", sub_args)) => subcommand_gen_completions(sub_args),
        Some((subcommand, _)) => Err(McError::BadArguments(format!(
            "unknown subcommand '{subcommand}'"
        ))),
        None => Err(McError::BadArguments("missing subcommand".to_string())),
    }
}

fn subcommand_gen_completions(sub_args: &ArgMatches) -> McResult<()> {
    let generator = *sub_args
        .get_one::<Shell>("shell")
        .ok_or_else(|| McError::BadArguments("--shell needed".to_string()))?;
    let mut cmd = cli::microc();
    let cmd_name = cmd.get_name().to_string();
    generate(generator, &mut cmd, cmd_name, &mut io::stdout());
    Ok(())
}
