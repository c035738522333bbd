//! Connection points owned by components.

use crate::logic::LogicValue;

use super::types::{ComponentId, NodeId, NodeKind, WireId};

/// A connection point on a component.
///
/// The visible [`value`](Node::value) is the forced value when one is set,
/// otherwise the driven value: the component-computed value for an output
/// node, or the value last delivered by the incoming wire for an input node
/// (`False` when unconnected).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Owning component
    pub owner: ComponentId,
    /// Index within the owner's input or output list
    pub pin: usize,
    /// Color override for the presentation layer
    pub color: Option<String>,
    value: LogicValue,
    driven: LogicValue,
    forced: Option<LogicValue>,
    conflict: bool,
    incoming: Option<WireId>,
    outgoing: Vec<WireId>,
    alive: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, owner: ComponentId, pin: usize) -> Self {
        Self {
            id,
            kind,
            owner,
            pin,
            color: None,
            value: LogicValue::False,
            driven: LogicValue::False,
            forced: None,
            conflict: false,
            incoming: None,
            outgoing: Vec::new(),
            alive: true,
        }
    }

    /// Current visible value.
    pub fn value(&self) -> LogicValue {
        self.value
    }

    /// Computed (output) or delivered (input) value, ignoring any force.
    pub fn driven_value(&self) -> LogicValue {
        self.driven
    }

    pub fn forced_value(&self) -> Option<LogicValue> {
        self.forced
    }

    /// Advisory flag: a forced value hides a different driven value.
    pub fn has_conflict(&self) -> bool {
        self.conflict
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_input(&self) -> bool {
        self.kind == NodeKind::Input
    }

    pub fn is_output(&self) -> bool {
        self.kind == NodeKind::Output
    }

    /// Live wire feeding this input node.
    pub fn incoming(&self) -> Option<WireId> {
        self.incoming
    }

    /// Live wires driven by this output node, in connection order.
    pub fn outgoing(&self) -> &[WireId] {
        &self.outgoing
    }

    /// Set the driven value. Returns true if the visible value changed.
    pub(crate) fn set_driven(&mut self, value: LogicValue) -> bool {
        self.driven = value;
        self.refresh()
    }

    /// Set or clear the forced value. Returns true if the visible value changed.
    pub(crate) fn set_forced(&mut self, forced: Option<LogicValue>) -> bool {
        self.forced = forced;
        self.refresh()
    }

    pub(crate) fn attach_incoming(&mut self, wire: Option<WireId>) {
        self.incoming = wire;
    }

    pub(crate) fn attach_outgoing(&mut self, wire: WireId) {
        self.outgoing.push(wire);
    }

    pub(crate) fn detach_outgoing(&mut self, wire: WireId) {
        self.outgoing.retain(|w| *w != wire);
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }

    fn refresh(&mut self) -> bool {
        let visible = self.forced.unwrap_or(self.driven);
        self.conflict = self.forced.is_some_and(|forced| forced != self.driven);
        let changed = visible != self.value;
        self.value = visible;
        changed
    }
}
