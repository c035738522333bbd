//! Text trace output for the CLI frontend.
//!
//! Drives a [`Simulator`] with a synthetic wall clock and writes one row per
//! step: the simulated time followed by the display char of every watched
//! signal.

use std::io::{self, Write};

use crate::circuit::NodeId;
use crate::components::ComponentKind;
use crate::error::{GatewaveError, Result};
use crate::Simulator;

/// Default distance between trace rows, in milliseconds.
pub const DEFAULT_STEP: u64 = 50;

/// What to run and what to print.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// Last simulated instant to print (inclusive)
    pub until: u64,
    /// Milliseconds between rows
    pub step: u64,
    /// Signals to watch: a component name, or `component.pin`.
    /// Empty means every `PROBE` in the circuit.
    pub probes: Vec<String>,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            until: 1000,
            step: DEFAULT_STEP,
            probes: Vec::new(),
        }
    }
}

/// A watched signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub node: NodeId,
}

/// Resolve the signals named in `probes`.
///
/// A bare component name watches a probe's input or the first output of any
/// other component.
pub fn resolve_columns(simulator: &Simulator, probes: &[String]) -> Result<Vec<Column>> {
    let circuit = simulator.circuit();

    if probes.is_empty() {
        return Ok(circuit
            .components()
            .filter(|c| c.is_live() && matches!(c.kind, ComponentKind::Probe(_)))
            .filter_map(|c| {
                c.inputs.first().map(|node| Column {
                    label: c.name.clone(),
                    node: *node,
                })
            })
            .collect());
    }

    probes
        .iter()
        .map(|label| {
            let node = match label.split_once('.') {
                Some((component, pin)) => circuit.pin(component, pin)?,
                None => {
                    let component = circuit.component_by_name(label)?;
                    let node = match component.kind {
                        ComponentKind::Probe(_) => component.inputs.first(),
                        _ => component.outputs.first(),
                    };
                    *node.ok_or_else(|| GatewaveError::UnknownPin {
                        component: label.clone(),
                        pin: "out".to_string(),
                    })?
                }
            };
            Ok(Column {
                label: label.clone(),
                node,
            })
        })
        .collect()
}

fn output_error(e: io::Error) -> GatewaveError {
    GatewaveError::TraceOutputError {
        message: e.to_string(),
    }
}

/// Run the simulation from 0 to `options.until` and write the trace.
pub fn write_trace<W: Write>(simulator: &mut Simulator, options: &TraceOptions, out: &mut W) -> Result<()> {
    let columns = resolve_columns(simulator, &options.probes)?;
    let step = options.step.max(1);

    let header: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    writeln!(out, "{:>8}  {}", "time", header.join(" ")).map_err(output_error)?;

    let mut wall = 0;
    simulator.tick(wall)?;
    loop {
        let mut row = String::with_capacity(columns.len() * 2);
        for (i, column) in columns.iter().enumerate() {
            let value = simulator.node_value(column.node)?;
            // Pad each char to its column's width
            let width = column.label.chars().count().max(1);
            if i > 0 {
                row.push(' ');
            }
            row.push_str(&format!("{:<width$}", value.to_display_char(), width = width));
        }
        writeln!(out, "{:>8}  {}", simulator.adjusted_time().as_millis(), row.trim_end())
            .map_err(output_error)?;

        if wall >= options.until {
            break;
        }
        wall = (wall + step).min(options.until);
        simulator.tick(wall)?;
    }

    out.flush().map_err(output_error)
}

/// Write the trace to stdout.
pub fn print_trace(simulator: &mut Simulator, options: &TraceOptions) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_trace(simulator, options, &mut out)
}
