use crate::prelude::*;
use clap::ArgMatches;
use std::fs;
use std::fs::File;
use std::io::Write;

pub fn run(args: &ArgMatches) -> McResult<()> {
    init_logger(args);

    let input_fname = args
        .get_one::<String>("input")
        .ok_or_else(|| McError::BadArguments("--input needed".to_string()))?;
    let source = fs::read_to_string(input_fname)?;
    let program = parse_program(&source)?;
    let graph = ProgramGraph::from_program(&program);

    log::info!(
        "program graph contains {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    if let Some(dot_filename) = &args.get_one::<String>("output") {
        let mut file = File::create(dot_filename)?;
        file.write_all(graph.to_dot().as_bytes())?;
        log::info!("dot output written in {:?}", dot_filename);
    } else {
        println!("{}", graph.to_dot());
    }

    Ok(())
}
