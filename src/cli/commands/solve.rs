//! Solve command - run value iteration on a decision graph

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};

use crate::{
    adapters::{ProgressObserver, TraceObserver},
    cli::{
        commands::generate::build_graph,
        config::{CatalogArgs, CommonArgs},
        output,
    },
    export::policy_csv,
    mdp::{InitialValues, MdpGraph, SolverConfig, ValueIteration},
    scenarios,
};

/// Source of the decision graph to solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphSource {
    /// The seven-state study/party example
    StudyParty,
    /// The state space generated from the board options
    Board,
}

#[derive(Parser, Debug)]
#[command(about = "Compute values and a greedy policy by value iteration")]
pub struct SolveArgs {
    /// Graph to solve when no --graph file is given
    #[arg(long, value_enum, default_value_t = GraphSource::StudyParty)]
    pub source: GraphSource,

    /// JSON decision graph; takes precedence over --source
    #[arg(long)]
    pub graph: Option<PathBuf>,

    #[command(flatten)]
    pub board: CatalogArgs,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Discount factor γ in (0, 1]
    #[arg(long, short = 'g', default_value_t = 0.5)]
    pub discount: f64,

    /// Convergence threshold θ
    #[arg(long, short = 't', default_value_t = 0.01)]
    pub threshold: f64,

    /// Give up after this many sweeps
    #[arg(long, default_value_t = 10_000)]
    pub max_sweeps: usize,

    /// Draw initial values uniformly with this seed instead of starting at zero
    #[arg(long)]
    pub seed: Option<u64>,

    /// Lower bound of seeded initial values
    #[arg(long, default_value_t = 0.0)]
    pub low: f64,

    /// Upper bound of seeded initial values
    #[arg(long, default_value_t = 100.0)]
    pub high: f64,

    /// Number of states to print
    #[arg(long, default_value_t = 20)]
    pub show: usize,

    /// Write the policy as CSV
    #[arg(long)]
    pub policy_csv: Option<PathBuf>,

    /// Write the Q-table as CSV
    #[arg(long)]
    pub q_csv: Option<PathBuf>,

    /// Write the whole solution as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl SolveArgs {
    fn solver_config(&self) -> SolverConfig {
        let mut config =
            SolverConfig::new(self.discount, self.threshold).with_max_sweeps(self.max_sweeps);
        if let Some(seed) = self.seed {
            config = config.with_initial_values(InitialValues::Uniform {
                seed,
                low: self.low,
                high: self.high,
            });
        }
        config
    }

    fn load_graph(&self) -> Result<MdpGraph> {
        if let Some(path) = &self.graph {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading decision graph {}", path.display()))?;
            return MdpGraph::from_json_str(&json)
                .with_context(|| format!("parsing decision graph {}", path.display()));
        }
        match self.source {
            GraphSource::StudyParty => Ok(scenarios::study_party()),
            GraphSource::Board => {
                let catalog = self.board.load()?;
                Ok(build_graph(&catalog, &self.common)?.to_mdp())
            }
        }
    }
}

pub fn execute(args: SolveArgs) -> Result<()> {
    let config = args.solver_config();
    config.validate()?;

    output::print_section("Value iteration");
    let graph = args.load_graph()?;
    if graph.is_empty() {
        return Err(anyhow!("decision graph has no states"));
    }
    output::print_kv("States", &output::format_number(graph.len()));
    output::print_kv("Outcomes", &output::format_number(graph.outcome_count()));
    output::print_kv("Discount", &config.discount.to_string());
    output::print_kv("Threshold", &config.threshold.to_string());

    let mut solver = ValueIteration::new(config);
    if !args.common.no_progress {
        solver = solver.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.common.trace {
        solver = solver.with_observer(Box::new(TraceObserver::to_file(path)?));
    } else if args.common.verbose {
        solver = solver.with_observer(Box::new(TraceObserver::stderr()));
    }
    let solution = solver.solve(&graph).context("running value iteration")?;
    output::print_solution(&solution, args.show);

    if let Some(path) = &args.policy_csv {
        let rows = policy_csv::export_policy(&solution, path)?;
        println!("\nPolicy ({rows} rows) written to {}", path.display());
    }
    if let Some(path) = &args.q_csv {
        let rows = policy_csv::export_q_table(&solution, path)?;
        println!("Q-table ({rows} rows) written to {}", path.display());
    }
    if let Some(path) = &args.json {
        fs::write(path, solution.to_json_string()?)
            .with_context(|| format!("writing solution to {}", path.display()))?;
        println!("Solution written to {}", path.display());
    }
    Ok(())
}
