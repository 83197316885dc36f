//! Output formatting for the CLI

use crate::{
    mdp::Solution,
    world::{GraphStats, RuleCatalog},
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a ratio as a percentage with two decimals
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

pub fn print_catalog(catalog: &RuleCatalog) {
    print_subsection("Rule catalog");
    print_kv(
        "Board",
        &format!("{}x{}", catalog.board_width, catalog.board_height),
    );
    print_kv("Start", &catalog.start.to_string());
    print_kv("Delivery zone", &catalog.delivery_zone.to_string());
    print_kv("Filling station", &catalog.filling_station.to_string());
    print_kv("Max satiety", &catalog.max_satiety.to_string());
    print_kv("Max time", &catalog.max_time.to_string());
    print_kv("Fast pace", &catalog.fast_pace.to_string());
    print_kv("Final gate", &format!("{:?}", catalog.final_delivery_gate));
}

/// Print state counts and the winning, losing and final ratios
pub fn print_graph_stats(stats: &GraphStats) {
    print_subsection("State space");
    print_kv("States", &format_number(stats.total_states));
    print_kv("Transitions", &format_number(stats.transitions));
    print_kv("Accepting", &format_number(stats.accepting_states));
    print_kv("Failing", &format_number(stats.failing_states));
    print_kv("Winning ratio", &format_ratio(stats.winning_ratio()));
    print_kv("Losing ratio", &format_ratio(stats.losing_ratio()));
    print_kv("Final ratio", &format_ratio(stats.final_ratio()));
}

/// Print convergence figures and the first `limit` values and actions
pub fn print_solution(solution: &Solution, limit: usize) {
    print_subsection("Value iteration");
    print_kv("Sweeps", &solution.sweeps.to_string());
    print_kv("Final delta", &format!("{:.6}", solution.final_delta));
    print_kv("States", &format_number(solution.values.len()));

    print_subsection("Values and policy");
    for (state, value) in solution.values.iter().take(limit) {
        let action = solution
            .action_for(state.as_str())
            .map(|a| a.as_str())
            .unwrap_or("-");
        println!("  {:20} {:>12.6}  {}", state.as_str(), value, action);
    }
    if solution.values.len() > limit {
        println!("  ... {} more", solution.values.len() - limit);
    }
}
