//! Main simulator interface.

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::circuit::{Circuit, ComponentId, Node, NodeId, NodeKind, WireId};
use crate::components::{ComponentKind, Recalc};
use crate::error::{GatewaveError, Result};
use crate::logic::LogicValue;
use crate::timeline::{ScheduledEvent, SimTime, Timeline};

use super::{DEFAULT_MAX_RECALCS, DEFAULT_WIRE_DELAY};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Maximum component recomputes in one settle sweep.
    pub max_recalcs_per_sweep: usize,
    /// Delay used by [`Simulator::connect`], in milliseconds.
    pub default_wire_delay: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_recalcs_per_sweep: DEFAULT_MAX_RECALCS,
            default_wire_delay: DEFAULT_WIRE_DELAY,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recompute cap per sweep.
    ///
    /// A zero-delay feedback loop that never settles (a NOT gate wired to
    /// itself) stops at this cap; the remaining work resumes on the next
    /// sweep. The cap is at least 1.
    pub fn with_max_recalcs_per_sweep(mut self, max: usize) -> Self {
        self.max_recalcs_per_sweep = max.max(1);
        self
    }

    /// Set the delay given to wires created by [`Simulator::connect`].
    pub fn with_default_wire_delay(mut self, delay: u64) -> Self {
        self.default_wire_delay = delay;
        self
    }
}

/// Deferred work on the simulator's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// Deliver a value through a delayed wire
    Deliver { wire: WireId, value: LogicValue },
    /// Self-scheduled recompute of a component (clock edge)
    Wake { component: ComponentId },
}

/// The event-driven logic simulator.
#[derive(Debug, Clone)]
pub struct Simulator {
    /// The circuit being simulated
    circuit: Circuit,
    /// Pending deliveries and wakes
    timeline: Timeline<SimEvent>,
    config: SimulatorConfig,
    /// Components waiting for a recompute, in marking order
    stale: VecDeque<ComponentId>,
    paused: bool,
    /// Last wall-clock reading passed to `tick`
    last_wall: Option<u64>,
}

impl Simulator {
    /// Create a new simulator for the given circuit with default configuration.
    pub fn new(circuit: Circuit) -> Result<Self> {
        Self::with_config(circuit, SimulatorConfig::default())
    }

    /// Create a new simulator for the given circuit with custom configuration.
    ///
    /// Every live wire is synchronized with its source immediately, every
    /// live component is recomputed once and clocks arm their first wake.
    pub fn with_config(circuit: Circuit, config: SimulatorConfig) -> Result<Self> {
        let mut sim = Self {
            circuit,
            timeline: Timeline::new(),
            config,
            stale: VecDeque::new(),
            paused: false,
            last_wall: None,
        };

        let live: Vec<ComponentId> = sim
            .circuit
            .components()
            .filter(|component| component.is_live())
            .map(|component| component.id)
            .collect();
        for id in live {
            sim.mark_stale(id)?;
        }

        let wires: Vec<(NodeId, NodeId)> = sim.circuit.wires().map(|wire| (wire.from, wire.to)).collect();
        for (from, to) in wires {
            let value = sim.circuit.node(from)?.value();
            sim.deliver(to, value)?;
        }

        sim.recompute_stale()?;
        Ok(sim)
    }

    /// Get a reference to the circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Pending events.
    pub fn timeline(&self) -> &Timeline<SimEvent> {
        &self.timeline
    }

    /// Active configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Current simulated time.
    pub fn adjusted_time(&self) -> SimTime {
        self.timeline.adjusted_time()
    }

    // ============ Reading ============

    /// Visible value of a node, after settling every stale component.
    pub fn node_value(&mut self, node: NodeId) -> Result<LogicValue> {
        self.recompute_stale()?;
        Ok(self.circuit.node(node)?.value())
    }

    /// Visible output values of a component, after settling.
    ///
    /// A probe has no outputs; its observed input value is returned instead.
    pub fn component_value(&mut self, id: ComponentId) -> Result<Vec<LogicValue>> {
        self.recompute_stale()?;
        let component = self.circuit.component(id)?;
        if let ComponentKind::Probe(probe) = &component.kind {
            return Ok(vec![probe.value()]);
        }
        component
            .outputs
            .iter()
            .map(|node| self.circuit.node(*node).map(Node::value))
            .collect()
    }

    /// Nodes whose forced value hides a different driven value, sorted by id.
    pub fn conflicts(&self) -> Vec<NodeId> {
        self.circuit
            .nodes()
            .into_iter()
            .filter(|node| node.has_conflict())
            .map(|node| node.id)
            .collect()
    }

    // ============ Driving loop ============

    /// Run every event due at or before `now`, settling after each one.
    ///
    /// Events scheduled while this runs wait for a later call, even when
    /// they fall due by `now`. Returns the number of events executed.
    /// On error the events not yet handled stay on the timeline.
    pub fn advance_to(&mut self, now: SimTime) -> Result<usize> {
        self.recompute_stale()?;
        let due = self.timeline.take_due(now)?;
        let count = due.len();
        let mut due = due.into_iter();
        while let Some(event) = due.next() {
            self.timeline.set_time(event.key.time);
            if let Err(e) = self.handle(event).and_then(|()| self.recompute_stale().map(|_| ())) {
                self.timeline.requeue(due);
                return Err(e);
            }
        }
        self.timeline.finish_advance(now);
        Ok(count)
    }

    /// Advance to `target` one pending event time at a time, so events
    /// scheduled along the way also run if they fall due by `target`.
    pub fn run_until(&mut self, target: SimTime) -> Result<usize> {
        let mut count = 0;
        while let Some(next) = self.timeline.peek_next_time() {
            if next > target {
                break;
            }
            count += self.advance_to(next)?;
        }
        count += self.advance_to(target)?;
        Ok(count)
    }

    /// Advance to the next pending event. Returns its time, or `None` if
    /// the timeline is empty.
    pub fn step(&mut self) -> Result<Option<SimTime>> {
        match self.timeline.peek_next_time() {
            Some(next) => {
                self.advance_to(next)?;
                Ok(Some(next))
            }
            None => {
                self.recompute_stale()?;
                Ok(None)
            }
        }
    }

    /// Feed a wall-clock reading in milliseconds.
    ///
    /// Simulated time moves by the wall time elapsed since the previous
    /// tick, except while paused. The first tick only sets the baseline.
    pub fn tick(&mut self, wall: u64) -> Result<usize> {
        let last = self.last_wall.unwrap_or(wall);
        let elapsed = wall.saturating_sub(last);
        self.last_wall = Some(last.max(wall));

        if self.paused {
            self.recompute_stale()?;
            return Ok(0);
        }
        let target = self.timeline.adjusted_time() + elapsed;
        self.advance_to(target)
    }

    /// Stop simulated time; wall time passed to [`tick`](Self::tick) while
    /// paused is discarded.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ============ Recalculation ============

    /// Queue a live component for recomputation.
    ///
    /// Already-queued, unplaced and dead components are left alone.
    pub fn mark_stale(&mut self, id: ComponentId) -> Result<()> {
        let component = self.circuit.component_mut(id)?;
        if component.is_live() && !component.is_stale() {
            component.stale = true;
            self.stale.push_back(id);
        }
        Ok(())
    }

    /// Recompute queued components until the circuit settles or the
    /// per-sweep cap is reached. Returns the number of recomputes.
    pub fn recompute_stale(&mut self) -> Result<usize> {
        let limit = self.config.max_recalcs_per_sweep;
        let mut count = 0;

        while let Some(id) = self.stale.pop_front() {
            let component = self.circuit.component_mut(id)?;
            if !component.is_live() {
                component.stale = false;
                continue;
            }
            if count >= limit {
                self.stale.push_front(id);
                warn!(
                    time = %self.timeline.adjusted_time(),
                    limit,
                    pending = self.stale.len(),
                    "Circuit did not settle; deferring remaining recomputes"
                );
                break;
            }
            self.recompute(id)?;
            count += 1;
        }

        Ok(count)
    }

    fn recompute(&mut self, id: ComponentId) -> Result<()> {
        let inputs = self.circuit.input_values(id)?;
        let now = self.timeline.adjusted_time();
        let component = self.circuit.component_mut(id)?;
        component.stale = false;
        let Recalc { outputs, wake_at } = component.kind.recalc(&inputs, now);
        let nodes = component.outputs.clone();
        trace!(component = %id, time = %now, ?outputs, "Component recomputed");

        self.arm_wake(id, wake_at)?;
        for (node, value) in nodes.into_iter().zip(outputs) {
            self.drive_output(node, value)?;
        }
        Ok(())
    }

    /// Replace the component's pending wake with one at `time`.
    fn arm_wake(&mut self, id: ComponentId, time: Option<SimTime>) -> Result<()> {
        if let Some(old) = self.circuit.component_mut(id)?.wake.take() {
            self.timeline.cancel(old);
        }
        if let Some(time) = time {
            let key = self
                .timeline
                .schedule_at(time, format!("wake {}", id), SimEvent::Wake { component: id })?;
            self.circuit.component_mut(id)?.wake = Some(key);
        }
        Ok(())
    }

    fn drive_output(&mut self, node: NodeId, value: LogicValue) -> Result<()> {
        let output = self.circuit.node_mut(node)?;
        let changed = output.set_driven(value);
        if output.has_conflict() {
            debug!(%node, forced = ?output.forced_value(), driven = %value, "Forced value conflict");
        }
        if changed {
            self.emit(node)?;
        }
        Ok(())
    }

    /// Send an output node's visible value down every outgoing wire.
    fn emit(&mut self, node: NodeId) -> Result<()> {
        let output = self.circuit.node(node)?;
        let value = output.value();
        let wires = output.outgoing().to_vec();
        for wire in wires {
            self.send(wire, value)?;
        }
        Ok(())
    }

    fn send(&mut self, id: WireId, value: LogicValue) -> Result<()> {
        let wire = self.circuit.wire(id)?;
        let (to, delay) = (wire.to, wire.delay);
        if delay == 0 {
            return self.deliver(to, value);
        }
        let key = self.timeline.schedule_in(
            delay,
            format!("deliver {} on {}", value, id),
            SimEvent::Deliver { wire: id, value },
        )?;
        debug!(wire = %id, %to, %value, at = %key.time, "Delivery scheduled");
        Ok(())
    }

    /// Write a delivered value into an input node.
    fn deliver(&mut self, node: NodeId, value: LogicValue) -> Result<()> {
        let input = self.circuit.node_mut(node)?;
        let changed = input.set_driven(value);
        if input.has_conflict() {
            debug!(%node, forced = ?input.forced_value(), driven = %value, "Forced value conflict");
        }
        let owner = input.owner;
        if changed {
            self.mark_stale(owner)?;
        }
        Ok(())
    }

    fn handle(&mut self, event: ScheduledEvent<SimEvent>) -> Result<()> {
        match event.payload {
            SimEvent::Deliver { wire, value } => {
                let wire = self.circuit.wire(wire)?;
                if !wire.is_alive() {
                    trace!(wire = %wire.id, "Delivery on severed wire dropped");
                    return Ok(());
                }
                let to = wire.to;
                self.deliver(to, value)
            }
            SimEvent::Wake { component } => {
                let target = self.circuit.component_mut(component)?;
                if !target.is_live() || target.wake != Some(event.key) {
                    trace!(%component, "Stale wake ignored");
                    return Ok(());
                }
                target.wake = None;
                self.mark_stale(component)
            }
        }
    }

    // ============ Editing ============

    /// Add an unplaced component. It is not simulated until placed.
    pub fn add_component(&mut self, name: impl Into<String>, kind: ComponentKind) -> Result<ComponentId> {
        self.circuit.add_component(name, kind)
    }

    /// Place a component and schedule its first recompute.
    pub fn place(&mut self, id: ComponentId) -> Result<()> {
        self.circuit.place(id)?;
        self.mark_stale(id)
    }

    /// Add and place a component in one step.
    pub fn spawn(&mut self, name: impl Into<String>, kind: ComponentKind) -> Result<ComponentId> {
        let id = self.add_component(name, kind)?;
        self.place(id)?;
        Ok(id)
    }

    /// Destroy a component. Components it used to drive are marked stale.
    ///
    /// Events already scheduled for it stay queued and are ignored when
    /// they fire.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<()> {
        let orphaned = self.circuit.remove_component(id)?;
        for node in orphaned {
            let owner = self.circuit.node(node)?.owner;
            self.mark_stale(owner)?;
        }
        Ok(())
    }

    /// Connect with the configured default delay.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<WireId> {
        self.connect_with(from, to, self.config.default_wire_delay, None)
    }

    /// Connect an output to an unwired input and deliver the output's current
    /// value through the new wire.
    ///
    /// Fails with [`GatewaveError::InputAlreadyWired`], changing nothing, if
    /// the input already has a wire.
    pub fn connect_with(
        &mut self,
        from: NodeId,
        to: NodeId,
        delay: u64,
        color: Option<String>,
    ) -> Result<WireId> {
        let wire = self.circuit.connect(from, to, delay, color)?;
        let value = self.circuit.node(from)?.value();
        self.send(wire, value)?;
        Ok(wire)
    }

    /// Like [`connect_with`](Self::connect_with), but first severs any wire
    /// already feeding `to`.
    pub fn connect_replacing(
        &mut self,
        from: NodeId,
        to: NodeId,
        delay: u64,
        color: Option<String>,
    ) -> Result<WireId> {
        self.expect_kind(from, NodeKind::Output)?;
        self.expect_kind(to, NodeKind::Input)?;
        if let Some(old) = self.circuit.node(to)?.incoming() {
            self.disconnect(old)?;
        }
        self.connect_with(from, to, delay, color)
    }

    /// Sever a wire. Its input resets to `False` and the owner is marked stale.
    pub fn disconnect(&mut self, wire: WireId) -> Result<()> {
        let to = self.circuit.disconnect(wire)?;
        let owner = self.circuit.node(to)?.owner;
        self.mark_stale(owner)
    }

    /// Set or clear a node's forced value.
    ///
    /// A changed visible value on an output propagates like a computed change;
    /// on an input it marks the owner stale. Clearing always marks the owner
    /// stale so the computed value is restored.
    pub fn set_forced_value(&mut self, node: NodeId, value: Option<LogicValue>) -> Result<()> {
        let target = self.circuit.node_mut(node)?;
        let changed = target.set_forced(value);
        let (kind, owner) = (target.kind, target.owner);
        if target.has_conflict() {
            debug!(%node, forced = ?value, driven = %target.driven_value(), "Forced value conflict");
        }

        match kind {
            NodeKind::Output if changed => self.emit(node)?,
            NodeKind::Input if changed => self.mark_stale(owner)?,
            _ => {}
        }
        if value.is_none() {
            self.mark_stale(owner)?;
        }
        Ok(())
    }

    /// Step a node's forced value through
    /// none → `Unknown` → `HighImpedance` → `False` → `True` → none.
    pub fn cycle_forced_value(&mut self, node: NodeId) -> Result<Option<LogicValue>> {
        let next = LogicValue::next_forced(self.circuit.node(node)?.forced_value());
        self.set_forced_value(node, next)?;
        Ok(next)
    }

    /// Set a switch's value.
    pub fn set_switch(&mut self, id: ComponentId, value: LogicValue) -> Result<()> {
        match &mut self.circuit.component_mut(id)?.kind {
            ComponentKind::Switch(switch) => switch.value = value,
            _ => return Err(GatewaveError::NotASwitch { component: id }),
        }
        self.mark_stale(id)
    }

    /// Flip a switch. Returns the new value.
    pub fn toggle_switch(&mut self, id: ComponentId) -> Result<LogicValue> {
        let value = match &mut self.circuit.component_mut(id)?.kind {
            ComponentKind::Switch(switch) => {
                switch.toggle();
                switch.value
            }
            _ => return Err(GatewaveError::NotASwitch { component: id }),
        };
        self.mark_stale(id)?;
        Ok(value)
    }

    /// Set or clear a node's color override.
    pub fn set_node_color(&mut self, node: NodeId, color: Option<String>) -> Result<()> {
        self.circuit.node_mut(node)?.color = color;
        Ok(())
    }

    fn expect_kind(&self, node: NodeId, expected: NodeKind) -> Result<()> {
        if self.circuit.node(node)?.kind == expected {
            Ok(())
        } else {
            Err(GatewaveError::WrongNodeKind { node, expected })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::validate_circuit;
    use crate::components::Gate;
    use crate::dsl;
    use crate::logic::LogicOp;
    use crate::logic::LogicValue::{False as F, HighImpedance as Z, True as T, Unknown as X};
    use tracing_test::traced_test;

    fn simulator(netlist: &str) -> Simulator {
        let circuit = Circuit::from_ast(dsl::parse(netlist).unwrap()).unwrap();
        Simulator::new(circuit).unwrap()
    }

    fn pin(sim: &Simulator, component: &str, pin: &str) -> NodeId {
        sim.circuit().pin(component, pin).unwrap()
    }

    fn id(sim: &Simulator, component: &str) -> ComponentId {
        sim.circuit().find_component(component).unwrap()
    }

    #[test]
    fn test_delayed_wire_delivery() {
        let mut sim = simulator("SWITCH s value=1\nPROBE p\n");
        sim.advance_to(SimTime(100)).unwrap();

        let (out, input) = (pin(&sim, "s", "out"), pin(&sim, "p", "in"));
        sim.connect_with(out, input, 5, None).unwrap();
        assert_eq!(sim.node_value(input).unwrap(), F);

        sim.advance_to(SimTime(104)).unwrap();
        assert_eq!(sim.node_value(input).unwrap(), F);

        sim.advance_to(SimTime(105)).unwrap();
        assert_eq!(sim.node_value(input).unwrap(), T);
        assert_eq!(sim.component_value(id(&sim, "p")).unwrap(), vec![T]);
    }

    #[test]
    fn test_zero_delay_wave_settles_before_read() {
        let mut sim = simulator("SWITCH s\nNOT a\nNOT b\n.wire s out a in\n.wire a out b in\n");
        assert_eq!(sim.node_value(pin(&sim, "b", "out")).unwrap(), F);

        sim.set_switch(id(&sim, "s"), T).unwrap();
        assert_eq!(sim.node_value(pin(&sim, "a", "out")).unwrap(), F);
        assert_eq!(sim.node_value(pin(&sim, "b", "out")).unwrap(), T);
    }

    #[test]
    fn test_second_connection_is_rejected_without_mutation() {
        let mut sim = simulator("SWITCH a value=1\nSWITCH b\nPROBE p\n.wire a out p in\n");
        let input = pin(&sim, "p", "in");
        let existing = sim.circuit().node(input).unwrap().incoming().unwrap();

        let err = sim.connect(pin(&sim, "b", "out"), input).unwrap_err();
        assert!(matches!(err, GatewaveError::InputAlreadyWired { wire, .. } if wire == existing));
        assert!(sim.circuit().wire(existing).unwrap().is_alive());
        assert_eq!(sim.circuit().wires().count(), 1);
        assert_eq!(sim.node_value(input).unwrap(), T);

        let replacement = sim.connect_replacing(pin(&sim, "b", "out"), input, 0, None).unwrap();
        assert!(!sim.circuit().wire(existing).unwrap().is_alive());
        assert_eq!(sim.circuit().node(input).unwrap().incoming(), Some(replacement));
        assert_eq!(sim.node_value(input).unwrap(), F);
        validate_circuit(sim.circuit()).unwrap();
    }

    #[test]
    fn test_connect_replacing_checks_kinds_first() {
        let mut sim = simulator("SWITCH a\nPROBE p\n.wire a out p in\n");
        let input = pin(&sim, "p", "in");
        let err = sim.connect_replacing(input, input, 0, None).unwrap_err();
        assert!(matches!(err, GatewaveError::WrongNodeKind { .. }));
        assert!(sim.circuit().node(input).unwrap().incoming().is_some());
    }

    #[test]
    fn test_disconnect_resets_input() {
        let mut sim = simulator("SWITCH s value=1\nNOT n\n.wire s out n in\n");
        let out = pin(&sim, "n", "out");
        assert_eq!(sim.node_value(out).unwrap(), F);

        let wire = sim.circuit().wires().next().unwrap().id;
        sim.disconnect(wire).unwrap();
        assert_eq!(sim.node_value(pin(&sim, "n", "in")).unwrap(), F);
        assert_eq!(sim.node_value(out).unwrap(), T);
    }

    #[test]
    fn test_severed_wire_drops_pending_delivery() {
        let mut sim = simulator("SWITCH s value=1\nPROBE p\n");
        let input = pin(&sim, "p", "in");
        let wire = sim.connect_with(pin(&sim, "s", "out"), input, 10, None).unwrap();
        sim.disconnect(wire).unwrap();

        assert_eq!(sim.advance_to(SimTime(20)).unwrap(), 1);
        assert_eq!(sim.node_value(input).unwrap(), F);
    }

    #[test]
    fn test_forced_value_round_trip() {
        let mut sim = simulator("CONST k value=0\nPROBE p\n.wire k out p in\n");
        let out = pin(&sim, "k", "out");
        let probe = id(&sim, "p");

        sim.set_forced_value(out, Some(T)).unwrap();
        assert_eq!(sim.node_value(out).unwrap(), T);
        assert_eq!(sim.component_value(probe).unwrap(), vec![T]);
        assert_eq!(sim.circuit().node(out).unwrap().driven_value(), F);
        assert_eq!(sim.conflicts(), vec![out]);

        sim.set_forced_value(out, None).unwrap();
        assert_eq!(sim.node_value(out).unwrap(), F);
        assert_eq!(sim.component_value(probe).unwrap(), vec![F]);
        assert!(sim.conflicts().is_empty());
    }

    #[test]
    fn test_forced_input_marks_owner_stale() {
        let mut sim = simulator("SWITCH s\nNOT n\n.wire s out n in\n");
        let input = pin(&sim, "n", "in");
        let out = pin(&sim, "n", "out");
        assert_eq!(sim.node_value(out).unwrap(), T);

        sim.set_forced_value(input, Some(Z)).unwrap();
        assert_eq!(sim.node_value(out).unwrap(), X);
        sim.set_forced_value(input, None).unwrap();
        assert_eq!(sim.node_value(out).unwrap(), T);
    }

    #[test]
    fn test_cycle_forced_value() {
        let mut sim = simulator("SWITCH s\n");
        let out = pin(&sim, "s", "out");
        let seen: Vec<_> = (0..5).map(|_| sim.cycle_forced_value(out).unwrap()).collect();
        assert_eq!(seen, vec![Some(X), Some(Z), Some(F), Some(T), None]);
    }

    #[test]
    fn test_nor_latch_retains_state() {
        let mut sim = simulator(
            "SWITCH s\nSWITCH r\nNOR top\nNOR bottom\n\
             .wire r out top in0\n.wire bottom out top in1\n\
             .wire s out bottom in0\n.wire top out bottom in1\n",
        );
        let (q, qn) = (pin(&sim, "top", "out"), pin(&sim, "bottom", "out"));
        let (s, r) = (id(&sim, "s"), id(&sim, "r"));
        assert_eq!((sim.node_value(q).unwrap(), sim.node_value(qn).unwrap()), (T, F));

        sim.set_switch(r, T).unwrap();
        sim.recompute_stale().unwrap();
        sim.set_switch(r, F).unwrap();
        assert_eq!((sim.node_value(q).unwrap(), sim.node_value(qn).unwrap()), (F, T));

        sim.set_switch(s, T).unwrap();
        sim.recompute_stale().unwrap();
        sim.set_switch(s, F).unwrap();
        assert_eq!((sim.node_value(q).unwrap(), sim.node_value(qn).unwrap()), (T, F));
    }

    #[test]
    fn test_sr_flip_flop_holds_initial_state() {
        let mut sim = simulator(
            "SRFF ff state=1\nSWITCH clk\nCONST zero value=0\n\
             .wire zero out ff s\n.wire zero out ff r\n.wire clk out ff clk\n",
        );
        let q = pin(&sim, "ff", "q");
        let clk = id(&sim, "clk");
        assert_eq!(sim.node_value(q).unwrap(), T);
        for _ in 0..3 {
            sim.toggle_switch(clk).unwrap();
            assert_eq!(sim.node_value(q).unwrap(), T);
        }
    }

    #[test]
    fn test_edge_needs_definite_samples() {
        let mut sim = simulator("SWITCH c\nCONST one\nDFF ff\n.wire one out ff d\n.wire c out ff clk\n");
        let q = pin(&sim, "ff", "q");
        let c = id(&sim, "c");

        for value in [X, T] {
            sim.set_switch(c, value).unwrap();
            assert_eq!(sim.node_value(q).unwrap(), F);
        }
        sim.set_switch(c, F).unwrap();
        sim.recompute_stale().unwrap();
        sim.set_switch(c, T).unwrap();
        assert_eq!(sim.node_value(q).unwrap(), T);
        assert_eq!(sim.node_value(pin(&sim, "ff", "qn")).unwrap(), F);
    }

    #[test]
    fn test_clock_runs_from_timeline() {
        let mut sim = simulator("CLOCK clk period=1000\nPROBE p\n.wire clk out p in\n");
        let input = pin(&sim, "p", "in");
        assert_eq!(sim.node_value(input).unwrap(), T);
        assert_eq!(sim.timeline().peek_next_time(), Some(SimTime(500)));

        sim.advance_to(SimTime(499)).unwrap();
        assert_eq!(sim.node_value(input).unwrap(), T);
        sim.advance_to(SimTime(500)).unwrap();
        assert_eq!(sim.node_value(input).unwrap(), F);

        sim.run_until(SimTime(1999)).unwrap();
        assert_eq!(sim.node_value(input).unwrap(), F);
        assert_eq!(sim.timeline().peek_next_time(), Some(SimTime(2000)));
    }

    #[test]
    fn test_clock_keeps_one_pending_wake() {
        let mut sim = simulator("CLOCK clk period=100\n");
        let clk = id(&sim, "clk");
        for t in [10, 50, 120, 260] {
            sim.run_until(SimTime(t)).unwrap();
            sim.mark_stale(clk).unwrap();
            sim.recompute_stale().unwrap();
            assert_eq!(sim.timeline().len(), 1);
        }
    }

    #[test]
    fn test_pause_excludes_wall_time() {
        let mut sim = simulator("CLOCK clk period=1000\n");
        let out = pin(&sim, "clk", "out");

        sim.tick(40_000).unwrap();
        sim.tick(40_300).unwrap();
        assert_eq!(sim.adjusted_time(), SimTime(300));

        sim.pause();
        sim.tick(45_000).unwrap();
        assert_eq!(sim.adjusted_time(), SimTime(300));
        sim.resume();

        sim.tick(45_100).unwrap();
        assert_eq!(sim.adjusted_time(), SimTime(400));
        assert_eq!(sim.node_value(out).unwrap(), T);
        sim.tick(45_200).unwrap();
        assert_eq!(sim.node_value(out).unwrap(), F);
    }

    #[test]
    fn test_step_advances_to_next_event() {
        let mut sim = simulator("CLOCK clk period=200 duty=25\n");
        assert_eq!(sim.step().unwrap(), Some(SimTime(50)));
        assert_eq!(sim.step().unwrap(), Some(SimTime(200)));
        assert_eq!(sim.adjusted_time(), SimTime(200));

        let mut idle = simulator("SWITCH s\n");
        assert_eq!(idle.step().unwrap(), None);
    }

    #[test]
    fn test_dead_component_events_are_ignored() {
        let mut sim = simulator("CLOCK clk period=1000\nPROBE p\n.wire clk out p in\n");
        let probe = id(&sim, "p");
        assert_eq!(sim.component_value(probe).unwrap(), vec![T]);

        sim.remove_component(id(&sim, "clk")).unwrap();
        assert_eq!(sim.timeline().len(), 1);
        assert_eq!(sim.advance_to(SimTime(600)).unwrap(), 1);
        assert!(sim.timeline().is_empty());
        assert_eq!(sim.component_value(probe).unwrap(), vec![F]);
        validate_circuit(sim.circuit()).unwrap();
    }

    #[test]
    fn test_unplaced_component_waits_for_place() {
        let mut sim = simulator("SWITCH s\n");
        let gate = sim
            .add_component("g", ComponentKind::Gate(Gate::new(LogicOp::Not, 1)))
            .unwrap();
        let out = pin(&sim, "g", "out");
        sim.connect(pin(&sim, "s", "out"), pin(&sim, "g", "in")).unwrap();
        assert_eq!(sim.node_value(out).unwrap(), F);

        sim.place(gate).unwrap();
        assert_eq!(sim.node_value(out).unwrap(), T);
    }

    #[test]
    fn test_switch_operations_require_switch() {
        let mut sim = simulator("CONST k\nSWITCH s\n");
        let k = id(&sim, "k");
        assert!(matches!(sim.set_switch(k, T), Err(GatewaveError::NotASwitch { .. })));
        assert!(matches!(sim.toggle_switch(k), Err(GatewaveError::NotASwitch { .. })));
        assert_eq!(sim.toggle_switch(id(&sim, "s")).unwrap(), T);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut sim = simulator("SWITCH a value=1\nSWITCH b\nXOR g\n.wire a out g in0\n.wire b out g in1\n");
        let g = id(&sim, "g");
        assert_eq!(sim.recompute_stale().unwrap(), 0);
        let before = sim.component_value(g).unwrap();

        sim.mark_stale(g).unwrap();
        sim.mark_stale(g).unwrap();
        assert_eq!(sim.recompute_stale().unwrap(), 1);
        assert_eq!(sim.component_value(g).unwrap(), before);
        assert!(sim.timeline().is_empty());
    }

    #[test]
    fn test_time_cannot_go_backwards() {
        let mut sim = simulator("SWITCH s\n");
        sim.advance_to(SimTime(50)).unwrap();
        assert!(matches!(
            sim.advance_to(SimTime(10)),
            Err(GatewaveError::TimeReversal { .. })
        ));
    }

    #[test]
    #[traced_test]
    fn test_oscillation_is_reported() {
        let circuit = Circuit::from_ast(dsl::parse("NOT n\n.wire n out n in\n").unwrap()).unwrap();
        let config = SimulatorConfig::new().with_max_recalcs_per_sweep(50);
        let mut sim = Simulator::with_config(circuit, config).unwrap();

        assert!(logs_contain("did not settle"));
        assert_eq!(sim.recompute_stale().unwrap(), 50);
    }

    #[test]
    fn test_default_wire_delay_applies_to_connect() {
        let circuit = Circuit::from_ast(dsl::parse("SWITCH s value=1\nPROBE p\n").unwrap()).unwrap();
        let config = SimulatorConfig::new().with_default_wire_delay(7);
        let mut sim = Simulator::with_config(circuit, config).unwrap();
        assert_eq!(sim.config().default_wire_delay, 7);
        let input = pin(&sim, "p", "in");
        sim.connect(pin(&sim, "s", "out"), input).unwrap();

        sim.advance_to(SimTime(6)).unwrap();
        assert_eq!(sim.node_value(input).unwrap(), F);
        sim.advance_to(SimTime(7)).unwrap();
        assert_eq!(sim.node_value(input).unwrap(), T);
    }

    #[test]
    fn test_failed_event_keeps_later_events_queued() {
        let mut sim = simulator("CLOCK clk period=100\n");
        let clk = pin(&sim, "clk", "out");
        sim.timeline
            .schedule_at(
                SimTime(10),
                "deliver on missing wire",
                SimEvent::Deliver {
                    wire: WireId(99),
                    value: T,
                },
            )
            .unwrap();

        let err = sim.advance_to(SimTime(60)).unwrap_err();
        assert!(matches!(err, GatewaveError::WireNotFound { .. }));
        assert_eq!(sim.timeline().peek_next_time(), Some(SimTime(50)));

        sim.advance_to(SimTime(60)).unwrap();
        assert_eq!(sim.node_value(clk).unwrap(), F);
        assert_eq!(sim.timeline().peek_next_time(), Some(SimTime(100)));
    }

    #[test]
    fn test_huge_clock_period_loads() {
        let mut sim = simulator("CLOCK c period=18446744073709551615 phase=7\n");
        let out = pin(&sim, "c", "out");
        assert_eq!(sim.node_value(out).unwrap(), F);
        assert_eq!(sim.timeline().peek_next_time(), Some(SimTime(7)));
        sim.run_until(SimTime(7)).unwrap();
        assert_eq!(sim.node_value(out).unwrap(), T);
    }
}
