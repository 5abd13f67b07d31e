// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line commands over snapshot files.

use crate::error::Result;
use crate::settings::{AppSettings, SnapshotFormat};
use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use uuid::Uuid;
use vecspace_graph::catalog::{kinds, UnaryOperator};
use vecspace_graph::{
    Context, GraphEvent, Node, NodeData, NodeId, PortId, SubscriptionTarget, Value,
};

/// Build, inspect, convert and edit reactive graph snapshots
#[derive(Debug, Parser)]
#[command(name = "vecspace", author, version, about, long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Write the sample graph
    Demo {
        /// Destination file
        out: PathBuf,
    },
    /// Print a snapshot's nodes and values
    Inspect {
        /// Snapshot file
        snapshot: PathBuf,
    },
    /// Re-encode a snapshot (format from the extension)
    Convert {
        /// Source file
        input: PathBuf,
        /// Destination file
        output: PathBuf,
    },
    /// Set an input and save the snapshot back
    Set {
        /// Snapshot file, rewritten in place
        snapshot: PathBuf,
        /// Input port to write
        #[arg(value_parser = parse_port_id)]
        port: PortId,
        /// New value
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

fn parse_port_id(text: &str) -> std::result::Result<PortId, uuid::Error> {
    Uuid::parse_str(text).map(PortId)
}

impl Command {
    /// File this command writes, if any
    pub fn written_file(&self) -> Option<&Path> {
        match self {
            Self::Demo { out } => Some(out.as_path()),
            Self::Inspect { .. } => None,
            Self::Convert { output, .. } => Some(output.as_path()),
            Self::Set { snapshot, .. } => Some(snapshot.as_path()),
        }
    }
}

/// Execute a command, writing its report to `out`
pub fn run(command: &Command, settings: &mut AppSettings, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Demo { out: path } => {
            let context = demo_graph()?;
            write_context(&context, path, settings)?;
            writeln!(
                out,
                "wrote {} nodes and {} connections to {}",
                context.node_count(),
                context.connection_count(),
                path.display()
            )?;
        }
        Command::Inspect { snapshot } => {
            let context = read_context(snapshot, settings)?;
            print_context(&context, out)?;
        }
        Command::Convert { input, output } => {
            let context = read_context(input, settings)?;
            write_context(&context, output, settings)?;
            writeln!(out, "converted {} to {}", input.display(), output.display())?;
        }
        Command::Set { snapshot, port, value } => {
            let mut context = read_context(snapshot, settings)?;
            let changes = set_and_observe(&mut context, *port, *value)?;
            write_context(&context, snapshot, settings)?;
            for (port, value) in changes {
                writeln!(out, "{} = {value}", port_label(&context, port))?;
            }
        }
    }

    if let Some(path) = command.written_file() {
        settings.add_recent_file(path.to_path_buf());
    }
    Ok(())
}

/// Sample graph: a squared constant, and a symmetric matrix built from three
/// row vectors feeding its eigen decomposition.
pub fn demo_graph() -> vecspace_graph::Result<Context> {
    let mut context = Context::new();

    let constant = context.create_node_with_data(kinds::CONSTANT, NodeData::at(0.0, 0.0))?;
    let square = context.create_node_with_data(kinds::UNARY_OPERATOR, NodeData::at(200.0, 0.0))?;
    context.set_input_value(constant, "x", 5.0)?;
    context.set_input_value(square, "operator", UnaryOperator::Square)?;
    link(&mut context, constant, "result", square, "x")?;

    let matrix = context.create_node_with_data(kinds::MATRIX, NodeData::at(200.0, 200.0))?;
    let rows = [("m1", [2.0, 1.0, 0.0]), ("m2", [1.0, 3.0, 1.0]), ("m3", [0.0, 1.0, 4.0])];
    for (i, (input, [x, y, z])) in rows.into_iter().enumerate() {
        let position = NodeData::at(0.0, 150.0 + 100.0 * i as f32);
        let row = context.create_node_with_data(kinds::VECTOR, position)?;
        context.set_input_value(row, "x", x)?;
        context.set_input_value(row, "y", y)?;
        context.set_input_value(row, "z", z)?;
        link(&mut context, row, "result", matrix, input)?;
    }

    let values = context.create_node_with_data(kinds::EIGENVALUES, NodeData::at(400.0, 150.0))?;
    let vectors = context.create_node_with_data(kinds::EIGENVECTORS, NodeData::at(400.0, 300.0))?;
    link(&mut context, matrix, "result", values, "matrix")?;
    link(&mut context, matrix, "result", vectors, "matrix")?;

    tracing::debug!(nodes = context.node_count(), "demo graph built");
    Ok(context)
}

fn link(
    context: &mut Context,
    from: NodeId,
    output: &str,
    to: NodeId,
    input: &str,
) -> vecspace_graph::Result<()> {
    let from_port = context.output(from, output)?;
    let to_port = context.input(to, input)?;
    context.create_connection(from_port, to_port)?;
    Ok(())
}

/// Decode a snapshot file
pub fn read_context(path: &Path, settings: &AppSettings) -> Result<Context> {
    let text = std::fs::read_to_string(path)?;
    let context = match settings.format_for(path) {
        SnapshotFormat::Ron => Context::from_ron(&text)?,
        SnapshotFormat::Json => Context::from_json(&text)?,
    };
    tracing::info!(path = %path.display(), nodes = context.node_count(), "snapshot loaded");
    Ok(context)
}

/// Encode a context in the given format
pub fn encode(context: &Context, format: SnapshotFormat, pretty: bool) -> Result<String> {
    let text = match (format, pretty) {
        (SnapshotFormat::Ron, true) => context.to_ron()?,
        (SnapshotFormat::Json, true) => context.to_json()?,
        (SnapshotFormat::Ron, false) => ron::to_string(&context.snapshot())?,
        (SnapshotFormat::Json, false) => serde_json::to_string(&context.snapshot())?,
    };
    Ok(text)
}

/// Write a snapshot file, choosing the format from its extension
pub fn write_context(context: &Context, path: &Path, settings: &AppSettings) -> Result<()> {
    let format = settings.format_for(path);
    std::fs::write(path, encode(context, format, settings.pretty)?)?;
    tracing::info!(path = %path.display(), format = format.extension(), "snapshot written");
    Ok(())
}

/// Set one input and collect every value change it caused, in order
pub fn set_and_observe(
    context: &mut Context,
    port: PortId,
    value: f64,
) -> Result<Vec<(PortId, Value)>> {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let subscription = context.subscribe(SubscriptionTarget::All, move |event| {
        if let GraphEvent::ValueChanged { port, value, .. } = event {
            sink.borrow_mut().push((*port, value.clone()));
        }
    });

    let result = context.set_input(port, value);
    context.unsubscribe(subscription);
    result?;

    Ok(changes.take())
}

fn port_label(context: &Context, port: PortId) -> String {
    let Some(found) = context.port(port) else {
        return port.to_string();
    };
    let kind = context.node(found.node()).map_or("?", Node::kind);
    format!("{kind}.{} ({})", found.name(), found.node())
}

/// Print nodes producers first, with every port's id and value
pub fn print_context(context: &Context, out: &mut impl Write) -> Result<()> {
    writeln!(out, "context {}", context.id())?;
    for node_id in context.topological_order() {
        let Some(node) = context.node(node_id) else {
            continue;
        };
        match &node.data.label {
            Some(label) => writeln!(out, "{} {node_id} \"{label}\"", node.kind())?,
            None => writeln!(out, "{} {node_id}", node.kind())?,
        }
        for (name, port) in node.inputs() {
            let source = if port.is_connected(context) { " <-" } else { "" };
            writeln!(out, "  in  {name} = {}{source}  [{}]", port.value(), port.id())?;
        }
        for (name, port) in node.outputs() {
            writeln!(out, "  out {name} = {}  [{}]", port.value(), port.id())?;
        }
    }
    Ok(())
}
