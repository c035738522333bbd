//! # Gatewave Core
//!
//! An event-driven digital logic circuit simulator.
//!
//! This library provides:
//! - A four-valued logic model (`0`, `1`, `X`, `Z`) with hardware dominance rules
//! - A node/wire connectivity graph with forced-value overrides
//! - A logical-time event scheduler for clocks and wire propagation delay
//! - Gates, tri-state buffers, buses, multiplexers, flip-flops, registers,
//!   shift registers, clocks, switches and probes
//! - A line-oriented netlist language for loading and saving circuits
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`logic`] - The four-valued logic type and its combination rules
//! - [`circuit`] - Circuit graph representation and validation
//! - [`timeline`] - Time-ordered event queue
//! - [`components`] - Component models and their recompute functions
//! - [`engine`] - The simulator: stale queue, propagation, delivery, clocks
//! - [`dsl`] - Parser and writer for the netlist language
//! - [`trace`] - Text trace output (CLI only)
//!
//! ## Usage
//!
//! ```
//! use gatewave_core::{dsl, Circuit, LogicValue, Simulator};
//! use gatewave_core::timeline::SimTime;
//!
//! let ast = dsl::parse("CLOCK clk period=100\nTFF t\nCONST one\n\
//!                       .wire one out t t\n.wire clk out t clk\n")?;
//! let mut sim = Simulator::new(Circuit::from_ast(ast)?)?;
//! let q = sim.circuit().pin("t", "q")?;
//!
//! sim.run_until(SimTime(250))?;
//! assert_eq!(sim.node_value(q)?, LogicValue::False);
//! # Ok::<(), gatewave_core::GatewaveError>(())
//! ```
//!
//! ## Simulation Method
//!
//! Components are recomputed only when marked stale: by an edit, by a value
//! delivered to one of their inputs, or by their own scheduled wake. A
//! recompute whose visible output changes pushes the value down every
//! outgoing wire, synchronously for zero-delay wires and through the
//! timeline otherwise. Waves settle completely before control returns to
//! the caller.

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod logic;
pub mod timeline;

#[cfg(feature = "cli")]
pub mod trace;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use engine::Simulator;
pub use error::{GatewaveError, Result};
pub use logic::LogicValue;
