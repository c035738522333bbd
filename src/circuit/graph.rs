//! Circuit graph structure.
//!
//! Components, nodes and wires are stored in arenas owned by [`Circuit`] and
//! refer to each other by id. The node table doubles as the id → node
//! registry used to resolve references; it belongs to one circuit, so
//! independent circuits never share it.

use std::collections::HashMap;

use tracing::debug;

use super::node::Node;
use super::types::{ComponentId, Lifecycle, NodeId, NodeKind, WireId};
use super::wire::Wire;
use crate::components::{Component, ComponentKind};
use crate::dsl::{NetlistAst, PinRef};
use crate::error::{GatewaveError, Result};
use crate::logic::LogicValue;

/// A circuit: components, their nodes, and the wires between them.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    /// All components ever added, indexed by `ComponentId`
    components: Vec<Component>,

    /// Names of non-dead components
    names: HashMap<String, ComponentId>,

    /// Node registry (id → node)
    nodes: HashMap<NodeId, Node>,

    /// All wires ever created, indexed by `WireId`
    wires: Vec<Wire>,

    /// Next unused node id
    next_node: u32,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a circuit from a parsed netlist.
    ///
    /// Every component is placed. Wires, forced values and color overrides
    /// are applied in file order.
    pub fn from_ast(ast: NetlistAst) -> Result<Self> {
        let mut circuit = Circuit::new();

        for def in &ast.components {
            let kind = ComponentKind::from_def(def)?;
            let id = circuit.add_component(def.name.clone(), kind)?;
            let x = def.int("x", 0)?;
            let y = def.int("y", 0)?;
            let component = circuit.component_mut(id)?;
            component.position = (
                i32::try_from(x).map_err(|_| def.invalid("x", "out of range"))?,
                i32::try_from(y).map_err(|_| def.invalid("y", "out of range"))?,
            );
            circuit.place(id)?;
        }

        for wire in ast.wires {
            let from = circuit.resolve(&wire.from, NodeKind::Output)?;
            let to = circuit.resolve(&wire.to, NodeKind::Input)?;
            circuit.connect(from, to, wire.delay.unwrap_or(0), wire.color)?;
        }

        for force in ast.forces {
            let node = circuit.resolve_any(&force.target)?;
            circuit.node_mut(node)?.set_forced(Some(force.value));
        }

        for color in ast.colors {
            let node = circuit.resolve_any(&color.target)?;
            circuit.node_mut(node)?.color = Some(color.color);
        }

        Ok(circuit)
    }

    // ============ Components ============

    /// Add an unplaced component and register one node per pin.
    pub fn add_component(&mut self, name: impl Into<String>, kind: ComponentKind) -> Result<ComponentId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(GatewaveError::DuplicateComponent { name });
        }

        let id = ComponentId(self.components.len());
        let input_count = kind.input_names().len();
        let mut node_ids = self.free_node_ids(input_count + kind.output_names().len())?;
        let outputs = node_ids.split_off(input_count);
        let inputs = node_ids;
        for (pin, node) in inputs.iter().enumerate() {
            self.nodes.insert(*node, Node::new(*node, NodeKind::Input, id, pin));
        }
        for (pin, node) in outputs.iter().enumerate() {
            self.nodes.insert(*node, Node::new(*node, NodeKind::Output, id, pin));
        }

        debug!(component = %id, %name, kind = kind.component_type().keyword(), "Component added");
        self.names.insert(name.clone(), id);
        self.components.push(Component::new(id, name, kind, inputs, outputs));
        Ok(id)
    }

    /// Move an unplaced component into the running circuit.
    ///
    /// Placing a live component is a no-op; dead components cannot come back.
    pub fn place(&mut self, id: ComponentId) -> Result<()> {
        let component = self.component_mut(id)?;
        match component.lifecycle() {
            Lifecycle::Unplaced => {
                component.set_lifecycle(Lifecycle::Live);
                Ok(())
            }
            Lifecycle::Live => Ok(()),
            Lifecycle::Dead => Err(GatewaveError::ComponentNotLive { component: id }),
        }
    }

    /// Destroy a component: sever every attached wire and unregister its nodes.
    ///
    /// Returns the input nodes of other components that lost their driver.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Vec<NodeId>> {
        let component = self.component(id)?;
        if component.lifecycle() == Lifecycle::Dead {
            return Ok(Vec::new());
        }
        let inputs = component.inputs.clone();
        let outputs = component.outputs.clone();

        for node in &inputs {
            if let Some(wire) = self.node(*node)?.incoming() {
                self.disconnect(wire)?;
            }
        }

        let mut orphaned = Vec::new();
        for node in &outputs {
            let outgoing = self.node(*node)?.outgoing().to_vec();
            for wire in outgoing {
                orphaned.push(self.disconnect(wire)?);
            }
        }

        for node in inputs.iter().chain(outputs.iter()) {
            if let Some(mut removed) = self.nodes.remove(node) {
                removed.kill();
            }
        }

        let component = self.component_mut(id)?;
        component.set_lifecycle(Lifecycle::Dead);
        let name = component.name.clone();
        self.names.remove(&name);
        debug!(component = %id, %name, "Component removed");
        Ok(orphaned)
    }

    /// Get a component by id.
    pub fn component(&self, id: ComponentId) -> Result<&Component> {
        self.components
            .get(id.0)
            .ok_or(GatewaveError::NoSuchComponent { component: id })
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component> {
        self.components
            .get_mut(id.0)
            .ok_or(GatewaveError::NoSuchComponent { component: id })
    }

    /// Every component ever added (including dead ones), in id order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Find a non-dead component by name.
    pub fn find_component(&self, name: &str) -> Option<ComponentId> {
        self.names.get(name).copied()
    }

    /// Get a non-dead component by name.
    pub fn component_by_name(&self, name: &str) -> Result<&Component> {
        let id = self
            .find_component(name)
            .ok_or_else(|| GatewaveError::ComponentNotFound {
                component: name.to_string(),
            })?;
        self.component(id)
    }

    // ============ Nodes ============

    /// Claim `count` unregistered node ids.
    ///
    /// Ids taken by [`reassign_node_id`](Self::reassign_node_id) are skipped.
    /// Nothing is claimed if the id space runs out.
    fn free_node_ids(&mut self, count: usize) -> Result<Vec<NodeId>> {
        let mut ids = Vec::with_capacity(count);
        let mut cursor = Some(self.next_node);
        while ids.len() < count {
            let raw = cursor.ok_or(GatewaveError::NodeIdsExhausted)?;
            cursor = raw.checked_add(1);
            let id = NodeId(raw);
            if !self.nodes.contains_key(&id) {
                ids.push(id);
            }
        }
        // At the top of the id space the cursor stays put; the taken check
        // above then reports exhaustion on the next claim.
        self.next_node = cursor.unwrap_or(u32::MAX);
        Ok(ids)
    }

    /// Look up a registered node.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(GatewaveError::NodeNotFound { node: id })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or(GatewaveError::NodeNotFound { node: id })
    }

    /// True if `id` is registered.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Every registered node, sorted by id.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by_key(|node| node.id);
        nodes
    }

    /// Node id of `component.pin`.
    pub fn pin(&self, component: &str, pin: &str) -> Result<NodeId> {
        self.component_by_name(component)?.pin(pin)
    }

    /// Owner name and pin name of a node.
    pub fn pin_label(&self, node: NodeId) -> Result<(&str, String)> {
        let node = self.node(node)?;
        let component = self.component(node.owner)?;
        let names = match node.kind {
            NodeKind::Input => component.kind.input_names(),
            NodeKind::Output => component.kind.output_names(),
        };
        let pin = names.get(node.pin).cloned().unwrap_or_else(|| node.pin.to_string());
        Ok((component.name.as_str(), pin))
    }

    /// Visible values of a component's input nodes, in pin order.
    pub fn input_values(&self, id: ComponentId) -> Result<Vec<LogicValue>> {
        self.component(id)?
            .inputs
            .iter()
            .map(|node| self.node(*node).map(Node::value))
            .collect()
    }

    /// Give a node a new id, updating every reference to it.
    ///
    /// Fails without changing anything if `new` is already registered.
    pub fn reassign_node_id(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        if old == new {
            return self.node(old).map(|_| ());
        }
        if self.nodes.contains_key(&new) {
            return Err(GatewaveError::DuplicateNodeId { node: new });
        }
        let mut node = self
            .nodes
            .remove(&old)
            .ok_or(GatewaveError::NodeNotFound { node: old })?;
        node.id = new;

        if let Some(component) = self.components.get_mut(node.owner.0) {
            let pins = match node.kind {
                NodeKind::Input => &mut component.inputs,
                NodeKind::Output => &mut component.outputs,
            };
            if let Some(slot) = pins.get_mut(node.pin) {
                *slot = new;
            }
        }
        if let Some(wire) = node.incoming() {
            self.wires[wire.0].to = new;
        }
        for wire in node.outgoing() {
            self.wires[wire.0].from = new;
        }

        self.nodes.insert(new, node);
        debug!(%old, %new, "Node id reassigned");
        Ok(())
    }

    // ============ Wires ============

    /// Get a wire by id (live or not).
    pub fn wire(&self, id: WireId) -> Result<&Wire> {
        self.wires.get(id.0).ok_or(GatewaveError::WireNotFound { wire: id })
    }

    /// Every live wire, in creation order.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.iter().filter(|wire| wire.is_alive())
    }

    /// Create a wire from an output node to an unwired input node.
    ///
    /// Fails without changing anything if `to` already has a live incoming
    /// wire. Value delivery is the caller's job.
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        delay: u64,
        color: Option<String>,
    ) -> Result<WireId> {
        let source = self.node(from)?;
        if !source.is_output() {
            return Err(GatewaveError::WrongNodeKind {
                node: from,
                expected: NodeKind::Output,
            });
        }
        let target = self.node(to)?;
        if !target.is_input() {
            return Err(GatewaveError::WrongNodeKind {
                node: to,
                expected: NodeKind::Input,
            });
        }
        if let Some(wire) = target.incoming() {
            return Err(GatewaveError::InputAlreadyWired { node: to, wire });
        }

        let id = WireId(self.wires.len());
        self.wires.push(Wire::new(id, from, to, delay, color));
        self.node_mut(from)?.attach_outgoing(id);
        self.node_mut(to)?.attach_incoming(Some(id));
        debug!(wire = %id, %from, %to, delay, "Wire connected");
        Ok(id)
    }

    /// Sever a live wire. The input node's delivered value resets to `False`.
    ///
    /// Returns the input node the wire used to drive.
    pub fn disconnect(&mut self, id: WireId) -> Result<NodeId> {
        let wire = self
            .wires
            .get_mut(id.0)
            .filter(|wire| wire.is_alive())
            .ok_or(GatewaveError::WireNotFound { wire: id })?;
        wire.kill();
        let (from, to) = (wire.from, wire.to);

        if let Some(source) = self.nodes.get_mut(&from) {
            source.detach_outgoing(id);
        }
        if let Some(target) = self.nodes.get_mut(&to) {
            target.attach_incoming(None);
            target.set_driven(LogicValue::False);
        }
        debug!(wire = %id, %from, %to, "Wire disconnected");
        Ok(to)
    }

    fn resolve(&self, pin: &PinRef, kind: NodeKind) -> Result<NodeId> {
        let component = self.component_by_name(&pin.component)?;
        let node = match kind {
            NodeKind::Input => component.input_pin(&pin.pin),
            NodeKind::Output => component.output_pin(&pin.pin),
        };
        node.ok_or_else(|| GatewaveError::UnknownPin {
            component: pin.component.clone(),
            pin: pin.pin.clone(),
        })
    }

    fn resolve_any(&self, pin: &PinRef) -> Result<NodeId> {
        self.pin(&pin.component, &pin.pin)
    }
}
