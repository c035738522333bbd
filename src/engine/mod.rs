//! Event-driven simulation engine.
//!
//! The [`Simulator`] owns a [`Circuit`](crate::circuit::Circuit) and a
//! [`Timeline`](crate::timeline::Timeline) of [`SimEvent`]s and keeps every
//! live component's outputs consistent with its inputs.
//!
//! ## Recalculation protocol
//!
//! ```text
//!  edit / delivery ──► mark_stale(component) ──► stale queue (FIFO, deduplicated)
//!                                                     │
//!                              recompute_stale() ◄────┘
//!                                     │
//!                     ComponentKind::recalc(inputs, now)
//!                                     │
//!            output visible value changed? ──► every outgoing wire:
//!                                                 delay 0 → deliver now
//!                                                 delay d → Deliver event at now + d
//! ```
//!
//! A component is clean once its recompute has run and stale while it sits
//! in the queue. Readers ([`Simulator::node_value`],
//! [`Simulator::component_value`]) settle the queue first, so they never
//! observe a stale cached value.
//!
//! Clocks return the instant of their next edge from `recalc`; the engine
//! keeps exactly one pending [`SimEvent::Wake`] per component and cancels the
//! previous one when re-arming.

mod simulator;

pub use simulator::{SimEvent, Simulator, SimulatorConfig};

/// Default cap on recomputes per settle sweep.
pub const DEFAULT_MAX_RECALCS: usize = 10_000;

/// Default delay for wires created without an explicit one, in milliseconds.
pub const DEFAULT_WIRE_DELAY: u64 = 0;
