use microc::prelude::McResult;
use microc::{cli, mc_graph};

fn main() -> McResult<()> {
    let args = cli::graph().get_matches();
    mc_graph::run(&args)
}
