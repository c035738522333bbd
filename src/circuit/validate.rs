//! Circuit validation.

use crate::error::{GatewaveError, Result};

use super::{Circuit, Lifecycle};

/// Validate the registry and wiring invariants of a circuit.
///
/// Checks:
/// - Every live wire runs from a registered output node to a registered input node
/// - Each input node's incoming wire points back at it, and no input has two drivers
/// - Every output node's outgoing wires are live and start at it
/// - Every non-dead component's nodes are registered and owned by it
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    for wire in circuit.wires() {
        let from = circuit.node(wire.from).map_err(|_| {
            GatewaveError::topology(format!("wire {} starts at unregistered node {}", wire.id, wire.from))
        })?;
        let to = circuit.node(wire.to).map_err(|_| {
            GatewaveError::topology(format!("wire {} ends at unregistered node {}", wire.id, wire.to))
        })?;
        if !from.is_output() || !to.is_input() {
            return Err(GatewaveError::topology(format!(
                "wire {} must run from an output to an input",
                wire.id
            )));
        }
        if to.incoming() != Some(wire.id) {
            return Err(GatewaveError::topology(format!(
                "input {} has more than one driver (wire {})",
                wire.to, wire.id
            )));
        }
    }

    for node in circuit.nodes() {
        if let Some(wire) = node.incoming() {
            let wire = circuit.wire(wire)?;
            if !wire.is_alive() || wire.to != node.id {
                return Err(GatewaveError::topology(format!(
                    "input {} refers to wire {} which does not drive it",
                    node.id, wire.id
                )));
            }
        }
        for wire in node.outgoing() {
            let wire = circuit.wire(*wire)?;
            if !wire.is_alive() || wire.from != node.id {
                return Err(GatewaveError::topology(format!(
                    "output {} lists wire {} which it does not drive",
                    node.id, wire.id
                )));
            }
        }
    }

    for component in circuit.components() {
        if component.lifecycle() == Lifecycle::Dead {
            continue;
        }
        for node in component.inputs.iter().chain(component.outputs.iter()) {
            let owned = circuit.node(*node).map(|n| n.owner == component.id).unwrap_or(false);
            if !owned {
                return Err(GatewaveError::topology(format!(
                    "component '{}' refers to node {} which it does not own",
                    component.name, node
                )));
            }
        }
    }

    Ok(())
}
