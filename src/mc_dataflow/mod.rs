use crate::analysis;
use crate::prelude::*;
use clap::ArgMatches;
use mc_analysis::dataflow::{Analysis, Transfer};
use regex::Regex;
use serde::Serialize;
use std::fs;

pub fn run(args: &ArgMatches) -> McResult<()> {
    init_logger(args);

    let input_fname = args
        .get_one::<String>("input")
        .ok_or_else(|| McError::BadArguments("--input needed".to_string()))?;
    let source = fs::read_to_string(input_fname)?;
    let program = parse_program(&source)?;
    let graph = ProgramGraph::from_program(&program);

    let scheduler = match args.get_one::<String>("worklist").map(String::as_str) {
        Some("lifo") => WorklistKind::Lifo,
        Some("natural") => WorklistKind::NaturalOrdering,
        _ => WorklistKind::Fifo,
    };

    let json = args.get_flag("json");
    let filter = args
        .get_one::<String>("filter-node")
        .map(|pattern| Regex::new(pattern))
        .transpose()?;

    let name = args
        .get_one::<String>("analysis")
        .ok_or_else(|| McError::BadArguments("--analysis needed".to_string()))?;
    log::info!("running {name} with {scheduler} scheduler");

    match name.as_str() {
        "reaching-definitions" => {
            let analysis = analysis::reaching_definitions(&graph, scheduler)?;
            report(&graph, &analysis, json, filter.as_ref())
        }
        "live-variables" => {
            let analysis = analysis::live_variables(&graph, scheduler)?;
            report(&graph, &analysis, json, filter.as_ref())
        }
        "available-expressions" => {
            let analysis = analysis::available_expressions(&graph, scheduler)?;
            report(&graph, &analysis, json, filter.as_ref())
        }
        "detection-of-signs" => {
            let analysis = analysis::detection_of_signs(&graph, scheduler)?;
            report(&graph, &analysis, json, filter.as_ref())
        }
        "faint-variables" => {
            let analysis = analysis::faint_variables(&graph, scheduler)?;
            report(&graph, &analysis, json, filter.as_ref())
        }
        other => Err(McError::BadArguments(format!("unknown analysis '{other}'"))),
    }
}

/// Prints the stabilized constraints in graph node order.
fn report<T>(
    graph: &ProgramGraph,
    analysis: &Analysis<T>,
    json: bool,
    filter: Option<&Regex>,
) -> McResult<()>
where
    T: Transfer,
    T::State: Serialize,
{
    log::info!("stabilized after {} worklist insertions", analysis.insertions());

    let mut entries = Vec::new();
    for node in graph.nodes() {
        let label = graph.label(node);
        if filter.is_some_and(|pattern| !pattern.is_match(label)) {
            continue;
        }
        entries.push((label, analysis.state_at(label)?));
    }

    if json {
        let rendered = entries
            .into_iter()
            .map(|(label, state)| {
                Ok(serde_json::json!({
                    "node": label,
                    "state": serde_json::to_value(state)?,
                }))
            })
            .collect::<McResult<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        for (label, state) in entries {
            println!("{label}: {state}");
        }
    }

    Ok(())
}
