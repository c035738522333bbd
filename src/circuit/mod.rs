//! Circuit graph representation and validation.
//!
//! This module provides the connectivity graph of a logic circuit. The
//! [`Circuit`] struct owns every component, node and wire; cross-references
//! are ids into its arenas rather than pointers, which keeps the cyclic
//! component ↔ node ↔ wire relationships free of ownership cycles.

mod graph;
mod node;
mod types;
mod validate;
mod wire;

pub use graph::Circuit;
pub use node::Node;
pub use types::*;
pub use validate::validate_circuit;
pub use wire::Wire;
