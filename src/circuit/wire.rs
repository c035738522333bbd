//! Directed connections between nodes.

use super::types::{NodeId, WireId};

/// A directed edge from one output node to one input node.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub id: WireId,
    /// Driving output node
    pub from: NodeId,
    /// Driven input node
    pub to: NodeId,
    /// Propagation delay in milliseconds (0 delivers in the same pass)
    pub delay: u64,
    /// Cosmetic color tag carried for the presentation layer
    pub color: Option<String>,
    alive: bool,
}

impl Wire {
    pub(crate) fn new(id: WireId, from: NodeId, to: NodeId, delay: u64, color: Option<String>) -> Self {
        Self {
            id,
            from,
            to,
            delay,
            color,
            alive: true,
        }
    }

    /// False once the wire has been disconnected.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }
}
