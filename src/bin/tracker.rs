//! Tracker Logic - Command Line Interface
//!
//! Loads a world dump, applies item and check overrides and answers
//! reachability queries from the terminal.

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracker_logic::compiler::compile;
use tracker_logic::dnf::Dnf;
use tracker_logic::error::TrackerError;
use tracker_logic::expression::{BooleanExpression, Item, Op};
use tracker_logic::graph::{Fact, RequirementGraph};
use tracker_logic::solver::{solve, Overrides};
use tracker_logic::worker::AnalysisWorker;
use tracker_logic::world::RawWorld;

#[derive(Parser, Debug)]
#[command(name = "tracker")]
#[command(about = "Reachability queries against a randomized world dump", long_about = None)]
struct Args {
    /// World dump JSON file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Grant an item fact (may be given multiple times)
    #[arg(short = 'i', long = "item", value_name = "NAME")]
    items: Vec<String>,

    /// Mark a check as collected (may be given multiple times)
    #[arg(short = 'c', long = "check", value_name = "ID")]
    checks: Vec<String>,

    /// Print a minimized requirement explanation for one check and exit
    #[arg(short = 'e', long = "explain", value_name = "ID")]
    explain: Option<String>,

    /// Print graph statistics instead of the check list
    #[arg(short = 's', long = "stats")]
    stats: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), TrackerError> {
    let dump = fs::read_to_string(&args.input)?;
    let raw: RawWorld = serde_json::from_str(&dump)?;
    let output = compile(&raw)?;
    for warning in &output.warnings {
        eprintln!("warning: {}", warning);
    }
    let graph = output.graph;

    let mut overrides = Overrides::new();
    for item in &args.items {
        overrides.insert(lookup(&graph, "item", item)?, Dnf::always());
    }
    for check in &args.checks {
        overrides.insert(lookup(&graph, "check", check)?, Dnf::always());
    }

    if args.stats {
        print_stats(&graph);
        return Ok(());
    }

    if let Some(check) = &args.explain {
        let fact = lookup(&graph, "check", check)?;
        let worker = AnalysisWorker::spawn(&graph);
        worker.analyze(fact);
        let analysis = worker
            .recv()
            .ok_or_else(|| std::io::Error::other("analysis worker exited unexpectedly"))?;
        println!("{}", format_expression(&analysis.expression));
        return Ok(());
    }

    let bits = solve(&graph, &[&overrides], None);
    for (region, checks) in &graph.checks_by_region {
        println!("{}:", region);
        for check_id in checks {
            let in_logic = graph
                .fact(check_id)
                .is_some_and(|fact| bits.test(fact));
            let marker = if in_logic { "x" } else { " " };
            let name = graph
                .checks
                .get(check_id)
                .map_or_else(|| check_id.as_ref(), |check| check.name.as_str());
            println!("  [{}] {}", marker, name);
        }
    }

    let completed = graph.completed_dungeons(|check| args.checks.iter().any(|c| c == check));
    if !completed.is_empty() {
        println!("Completed dungeons:");
        for dungeon in completed {
            println!("  {}", dungeon);
        }
    }
    Ok(())
}

fn lookup(graph: &RequirementGraph, kind: &'static str, name: &str) -> Result<Fact, TrackerError> {
    graph.fact(name).ok_or_else(|| TrackerError::UnknownName {
        kind,
        name: name.to_string(),
    })
}

fn print_stats(graph: &RequirementGraph) {
    let num_cubes: usize = graph
        .requirements
        .iter()
        .map(|dnf| dnf.conjunctions().len())
        .sum();
    println!("Graph statistics:");
    println!("  facts:        {}", graph.num_facts());
    println!("  cubes:        {}", num_cubes);
    println!("  areas:        {}", graph.area_graph.areas.len());
    println!("  checks:       {}", graph.checks.len());
    println!("  hint regions: {}", graph.regions.len());
}

/// Renders an expression in the requirement language's infix syntax.
fn format_expression(expr: &BooleanExpression) -> String {
    if expr.is_trivially_true() {
        return "True".to_string();
    }
    if expr.is_trivially_false() {
        return "False".to_string();
    }
    let separator = match expr.op {
        Op::And => " & ",
        Op::Or => " | ",
    };
    expr.items
        .iter()
        .map(|item| match item {
            Item::Term(name) => name.to_string(),
            Item::Expr(inner) => format!("({})", format_expression(inner)),
        })
        .collect::<Vec<_>>()
        .join(separator)
}
