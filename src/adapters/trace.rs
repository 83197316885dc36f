//! Line-oriented event trace

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{
    Error, Result,
    identifiers::StateId,
    ports::Observer,
    world::{FailureReason, GraphStats, State},
};

/// Observer writing one line per event to any writer.
///
/// Expansion lines can be verbose on large boards, so they are only written
/// when `with_expansions(true)` is set; terminal and summary events are
/// always traced.
pub struct TraceObserver {
    writer: Box<dyn Write + Send>,
    expansions: bool,
}

impl TraceObserver {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            expansions: false,
        }
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Trace into a freshly created file.
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create trace file {}", path.display()),
            source,
        })?;
        Ok(Self::new(Box::new(BufWriter::new(file))))
    }

    pub fn with_expansions(mut self, enabled: bool) -> Self {
        self.expansions = enabled;
        self
    }

    fn line(&mut self, line: std::fmt::Arguments<'_>) -> Result<()> {
        self.writer.write_fmt(line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Observer for TraceObserver {
    fn on_generation_start(&mut self, initial: &State) -> Result<()> {
        self.line(format_args!("start {initial}"))
    }

    fn on_state_expanded(&mut self, id: StateId, state: &State, edges: usize) -> Result<()> {
        if self.expansions {
            self.line(format_args!("expand {id} edges={edges} {state}"))?;
        }
        Ok(())
    }

    fn on_accepting(&mut self, id: StateId, state: &State) -> Result<()> {
        self.line(format_args!("accept {id} {state}"))
    }

    fn on_failing(&mut self, id: StateId, state: &State, reason: FailureReason) -> Result<()> {
        self.line(format_args!("fail {id} {reason:?} {state}"))
    }

    fn on_generation_end(&mut self, stats: &GraphStats) -> Result<()> {
        self.line(format_args!(
            "done states={} accepting={} failing={} transitions={}",
            stats.total_states, stats.accepting_states, stats.failing_states, stats.transitions
        ))?;
        self.writer.flush()?;
        Ok(())
    }

    fn on_sweep(&mut self, sweep: usize, delta: f64) -> Result<()> {
        self.line(format_args!("sweep {sweep} delta={delta}"))
    }

    fn on_solve_end(&mut self, sweeps: usize, final_delta: f64) -> Result<()> {
        self.line(format_args!("converged sweeps={sweeps} delta={final_delta}"))?;
        self.writer.flush()?;
        Ok(())
    }
}
