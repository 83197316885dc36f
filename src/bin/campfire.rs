//! campfire CLI - state-space generation and value iteration
//!
//! This CLI provides:
//! - Exhaustive generation of a board's reachable state space
//! - Value iteration over generated or hand-built decision graphs

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "campfire")]
#[command(version, about = "Probabilistic state-space generator and MDP solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the transition graph of a board
    Generate(campfire::cli::commands::generate::GenerateArgs),

    /// Solve a decision graph by value iteration
    Solve(Box<campfire::cli::commands::solve::SolveArgs>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => campfire::cli::commands::generate::execute(args),
        Commands::Solve(args) => campfire::cli::commands::solve::execute(*args),
    }
}
