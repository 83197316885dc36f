//! Generate command - explore the reachable state space of a board

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::{ProgressObserver, TraceObserver},
    cli::{
        config::{CatalogArgs, CommonArgs},
        output,
    },
    export::dot,
    world::{Generator, RuleCatalog, StateGraph},
};

#[derive(Parser, Debug)]
#[command(about = "Generate the transition graph of a board")]
pub struct GenerateArgs {
    #[command(flatten)]
    pub board: CatalogArgs,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Render the graph in Graphviz DOT format
    #[arg(long)]
    pub dot: Option<PathBuf>,

    /// Write the graph statistics as JSON
    #[arg(long)]
    pub stats_json: Option<PathBuf>,

    /// Print the effective catalog as JSON and exit
    #[arg(long)]
    pub print_catalog: bool,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let catalog = args.board.load()?;
    if args.print_catalog {
        println!("{}", catalog.to_json_string()?);
        return Ok(());
    }

    output::print_section("State-space generation");
    output::print_catalog(&catalog);

    let graph = build_graph(&catalog, &args.common)?;
    output::print_graph_stats(&graph.stats());

    if let Some(path) = &args.dot {
        dot::write_file(&graph, path)?;
        println!("\nDOT graph written to {}", path.display());
    }
    if let Some(path) = &args.stats_json {
        let json = serde_json::to_string_pretty(&graph.stats())?;
        fs::write(path, json)
            .with_context(|| format!("writing statistics to {}", path.display()))?;
        println!("Statistics written to {}", path.display());
    }
    Ok(())
}

/// Generate the graph for the resolved catalog with the requested observers.
pub fn build_graph(catalog: &RuleCatalog, common: &CommonArgs) -> Result<StateGraph> {
    let mut generator = Generator::new(catalog)?;
    if !common.no_progress {
        generator = generator.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &common.trace {
        generator = generator.with_observer(Box::new(TraceObserver::to_file(path)?));
    } else if common.verbose {
        generator = generator.with_observer(Box::new(TraceObserver::stderr()));
    }
    let graph = generator
        .generate(catalog.initial_state())
        .context("generating state space")?;
    Ok(graph)
}
