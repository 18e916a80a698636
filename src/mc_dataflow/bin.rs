use microc::prelude::McResult;
use microc::{cli, mc_dataflow};

fn main() -> McResult<()> {
    let args = cli::analyse().get_matches();
    mc_dataflow::run(&args)
}
