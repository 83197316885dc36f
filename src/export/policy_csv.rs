//! CSV export of value-iteration results

use std::{fs::File, io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, mdp::Solution};

/// One row of the policy export: a state, its value and its greedy action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub state: String,
    pub value: f64,
    /// Empty for accepting states and states without actions
    pub action: Option<String>,
}

/// One row of the Q-table export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QValueRecord {
    pub state: String,
    pub action: String,
    pub q_value: f64,
    pub greedy: bool,
}

/// Policy rows in state-name order.
pub fn policy_records(solution: &Solution) -> Vec<PolicyRecord> {
    solution
        .values
        .iter()
        .map(|(state, &value)| PolicyRecord {
            state: state.to_string(),
            value,
            action: solution.action_for(state.as_str()).map(ToString::to_string),
        })
        .collect()
}

/// Q-table rows in state then action order.
pub fn q_value_records(solution: &Solution) -> Vec<QValueRecord> {
    solution
        .q_table
        .iter()
        .map(|(state, action, q_value)| QValueRecord {
            state: state.to_string(),
            action: action.to_string(),
            q_value,
            greedy: solution.action_for(state.as_str()) == Some(action),
        })
        .collect()
}

/// Write the policy as CSV with a header row.
pub fn write_policy<W: Write>(solution: &Solution, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in policy_records(solution) {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the full Q-table as CSV with a header row.
pub fn write_q_table<W: Write>(solution: &Solution, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in q_value_records(solution) {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the policy CSV to `path`, returning the number of rows.
pub fn export_policy<P: AsRef<Path>>(solution: &Solution, path: P) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create policy CSV {}", path.display()),
        source,
    })?;
    write_policy(solution, file)?;
    Ok(solution.values.len())
}

/// Write the Q-table CSV to `path`, returning the number of rows.
pub fn export_q_table<P: AsRef<Path>>(solution: &Solution, path: P) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create Q-table CSV {}", path.display()),
        source,
    })?;
    write_q_table(solution, file)?;
    Ok(solution.q_table.size())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::{MdpGraph, SolverConfig, ValueIteration};

    fn solution() -> Solution {
        let graph = MdpGraph::builder()
            .state("a")
            .state("b")
            .outcome("a", "go", "b", 1.0, 1.0)
            .outcome("a", "stay", "a", 1.0, 0.0)
            .accepting("b")
            .build()
            .unwrap();
        ValueIteration::new(SolverConfig::default())
            .solve(&graph)
            .unwrap()
    }

    #[test]
    fn policy_csv_has_header_and_row_per_state() {
        let mut buffer = Vec::new();
        write_policy(&solution(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["state,value,action", "a,1.0,go", "b,0.0,"]);
    }

    #[test]
    fn q_table_marks_greedy_action() {
        let records = q_value_records(&solution());
        assert_eq!(records.len(), 2);
        assert!(records[0].greedy && records[0].action == "go");
        assert!(!records[1].greedy && records[1].action == "stay");
        assert!((records[1].q_value - 0.5).abs() < 1e-12);
    }
}
