//! Shared configuration for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, ValueEnum};

use crate::{
    scenarios,
    world::{FinalDeliveryGate, RuleCatalog},
};

/// Built-in rule catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoardScenario {
    /// 3x3 board with one log cell and one stone cell
    Tiny,
}

/// Final-delivery gate as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GateArg {
    AtLeastOneLog,
    Quota,
}

impl From<GateArg> for FinalDeliveryGate {
    fn from(gate: GateArg) -> Self {
        match gate {
            GateArg::AtLeastOneLog => FinalDeliveryGate::AtLeastOneLog,
            GateArg::Quota => FinalDeliveryGate::Quota,
        }
    }
}

/// Where the rule catalog comes from, plus overrides applied on top of it
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// JSON rule catalog; takes precedence over --scenario
    #[arg(long, short = 'c')]
    pub catalog: Option<PathBuf>,

    /// Built-in catalog used when no file is given
    #[arg(long, value_enum, default_value_t = BoardScenario::Tiny)]
    pub scenario: BoardScenario,

    /// Override the time budget
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Override the satiety budget
    #[arg(long)]
    pub max_satiety: Option<f64>,

    /// Abort once this many states have been generated
    #[arg(long)]
    pub max_states: Option<usize>,

    /// Enable fast-pace movement
    #[arg(long)]
    pub fast_pace: bool,

    /// Gate for the final fuel delivery
    #[arg(long, value_enum)]
    pub gate: Option<GateArg>,
}

impl CatalogArgs {
    /// Resolve the catalog and apply the command-line overrides.
    pub fn load(&self) -> Result<RuleCatalog> {
        let mut catalog = match &self.catalog {
            Some(path) => RuleCatalog::from_json_file(path)
                .with_context(|| format!("loading rule catalog {}", path.display()))?,
            None => match self.scenario {
                BoardScenario::Tiny => scenarios::tiny_board(),
            },
        };

        if let Some(max_time) = self.max_time {
            catalog = catalog.with_max_time(max_time);
        }
        if let Some(max_satiety) = self.max_satiety {
            catalog = catalog.with_max_satiety(max_satiety);
        }
        if let Some(limit) = self.max_states {
            if limit == 0 {
                return Err(anyhow!("--max-states must be positive"));
            }
            catalog = catalog.with_max_states(limit);
        }
        if self.fast_pace {
            catalog = catalog.with_fast_pace(true);
        }
        if let Some(gate) = self.gate {
            catalog = catalog.with_final_delivery_gate(gate.into());
        }

        catalog.validate()?;
        Ok(catalog)
    }
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Hide progress spinners
    #[arg(long)]
    pub no_progress: bool,

    /// Trace terminal states and sweeps to stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Write the event trace to a file instead of stderr
    #[arg(long)]
    pub trace: Option<PathBuf>,
}
