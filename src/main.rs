//! Gatewave - Digital Logic Circuit Simulator
//!
//! Loads a netlist, runs it on a simulated clock and prints a text trace of
//! the watched signals.
//!
//! # Usage
//!
//! ```bash
//! gatewave counter.gw --until 2000 --step 100 --probe q0 --probe q1
//! RUST_LOG=gatewave_core=debug gatewave latch.gw --dump
//! ```

use std::path::PathBuf;

use clap::Parser;
use gatewave_core::{
    circuit::{validate_circuit, Circuit},
    dsl,
    engine::SimulatorConfig,
    error::Result,
    trace::{print_trace, TraceOptions, DEFAULT_STEP},
    Simulator,
};
use tracing_subscriber::EnvFilter;

/// Digital logic circuit simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Last simulated instant to trace, in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    until: u64,

    /// Milliseconds between trace rows
    #[arg(short, long, default_value_t = DEFAULT_STEP)]
    step: u64,

    /// Signal to trace: a component name or `component.pin` (repeatable)
    #[arg(short, long = "probe", value_name = "SIGNAL")]
    probes: Vec<String>,

    /// Print the normalized netlist instead of running it
    #[arg(long)]
    dump: bool,

    /// Cap on recomputes per settle sweep
    #[arg(long, default_value_t = gatewave_core::engine::DEFAULT_MAX_RECALCS)]
    max_recalcs: usize,

    /// Log engine activity at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "gatewave_core=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse the netlist
    let ast = dsl::parse_file(&args.circuit_file)?;

    // Build the circuit
    let circuit = Circuit::from_ast(ast)?;

    // Validate
    validate_circuit(&circuit)?;

    if args.dump {
        print!("{}", dsl::write(&circuit));
        return Ok(());
    }

    // Create simulator
    let config = SimulatorConfig::new().with_max_recalcs_per_sweep(args.max_recalcs);
    let mut simulator = Simulator::with_config(circuit, config)?;

    // Print the trace
    let options = TraceOptions {
        until: args.until,
        step: args.step,
        probes: args.probes,
    };
    print_trace(&mut simulator, &options)?;

    Ok(())
}
