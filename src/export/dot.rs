//! Graphviz rendering of transition graphs

use std::{
    fmt::Write as _,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    Error, Result,
    identifiers::StateId,
    world::StateGraph,
};

/// Render the whole graph as a DOT digraph.
///
/// Accepting states are drawn as green double circles, failing states as red
/// boxes and the initial state in bold. Edges carry the action name, the
/// probability and the reward.
pub fn render(graph: &StateGraph) -> String {
    let mut out = String::new();
    out.push_str("digraph campfire {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=ellipse, fontsize=10];\n");
    for (id, state) in graph.states() {
        let _ = writeln!(
            out,
            "  {id} [label=\"{id}\\n{}\"{}];",
            escape(&state.summary()),
            node_style(graph, id)
        );
    }
    for (id, _) in graph.states() {
        for edge in graph.edges(id) {
            let transition = &edge.transition;
            let _ = writeln!(
                out,
                "  {id} -> {} [label=\"{} p={:.4} r={:.2}\"];",
                edge.target,
                escape(transition.action_name().as_str()),
                transition.probability,
                transition.feedback
            );
        }
    }
    out.push_str("}\n");
    out
}

/// Write the DOT rendering to `writer`.
pub fn write<W: Write>(graph: &StateGraph, writer: &mut W) -> Result<()> {
    writer.write_all(render(graph).as_bytes())?;
    Ok(())
}

/// Write the DOT rendering to a file at `path`.
pub fn write_file<P: AsRef<Path>>(graph: &StateGraph, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create DOT file {}", path.display()),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write(graph, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn node_style(graph: &StateGraph, id: StateId) -> String {
    let mut style = String::new();
    if graph.is_accepting(id) {
        style.push_str(", shape=doublecircle, color=green");
    } else if graph.is_failing(id) {
        style.push_str(", shape=box, color=red");
    }
    if id == graph.initial() {
        style.push_str(", style=bold");
    }
    style
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
