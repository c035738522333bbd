//! Component models for logic simulation.
//!
//! This module provides models for all supported circuit elements:
//! - Combinational: AND, OR, XOR, NAND, NOR, XNOR, NOT, BUFFER
//! - Routing: Tri-state buffer, Bus resolver, Multiplexer, Demultiplexer
//! - Sequential: D, T, JK and SR flip-flops, Register, Shift register
//! - Sources: Clock, Switch, Constant
//! - Indicators: Probe
//!
//! Each kind implements `recalc`, a total function from the current input
//! values and the kind's internal state to the output values. Sequential
//! kinds update their stored bits inside `recalc` only on a recognized clock
//! edge, so repeating a recompute with unchanged inputs is a no-op.

mod clock;
mod gates;
mod io;
mod registers;
mod routing;
mod sequential;

pub use clock::{Clock, DEFAULT_DUTY_CYCLE, DEFAULT_PERIOD};
pub use gates::Gate;
pub use io::{Constant, Probe, Switch};
pub use registers::{DecodeMode, Register, ShiftRegister, MAX_ONE_HOT_BITS, MAX_REGISTER_BITS};
pub use routing::{Bus, Demultiplexer, Multiplexer, TriState, MAX_SELECT_BITS};
pub use sequential::{EdgeDetector, FlipFlop, FlipFlopKind, Trigger};

use crate::circuit::{ComponentId, Lifecycle, NodeId};
use crate::dsl::{ComponentDef, ComponentType};
use crate::error::{GatewaveError, Result};
use crate::logic::LogicValue;
use crate::timeline::{EventKey, SimTime};

/// Input value at `index`, or `Unknown` if the pin does not exist.
pub(crate) fn pin(inputs: &[LogicValue], index: usize) -> LogicValue {
    inputs.get(index).copied().unwrap_or(LogicValue::Unknown)
}

/// Result of recomputing a component.
#[derive(Debug, Clone, PartialEq)]
pub struct Recalc {
    /// One value per output pin
    pub outputs: Vec<LogicValue>,
    /// Instant at which the component wants to be recomputed again
    pub wake_at: Option<SimTime>,
}

impl Recalc {
    fn outputs(outputs: Vec<LogicValue>) -> Self {
        Self {
            outputs,
            wake_at: None,
        }
    }
}

/// The closed set of component kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Gate(Gate),
    TriState(TriState),
    Bus(Bus),
    Multiplexer(Multiplexer),
    Demultiplexer(Demultiplexer),
    FlipFlop(FlipFlop),
    Register(Register),
    ShiftRegister(ShiftRegister),
    Clock(Clock),
    Switch(Switch),
    Constant(Constant),
    Probe(Probe),
}

impl ComponentKind {
    /// Create a component kind from a netlist definition.
    ///
    /// Missing parameters fall back to their defaults; present but invalid
    /// ones are rejected.
    pub fn from_def(def: &ComponentDef) -> Result<Self> {
        match def.component_type {
            ComponentType::Gate(op) => {
                let inputs = def.uint("inputs", 2)?;
                if inputs == 0 {
                    return Err(def.invalid("inputs", "a gate needs at least one input"));
                }
                Ok(ComponentKind::Gate(Gate::new(op, inputs as usize)))
            }

            ComponentType::TriState => Ok(ComponentKind::TriState(TriState)),

            ComponentType::Bus => {
                let inputs = def.uint("inputs", 2)?;
                if inputs == 0 {
                    return Err(def.invalid("inputs", "a bus needs at least one driver"));
                }
                Ok(ComponentKind::Bus(Bus::new(inputs as usize)))
            }

            ComponentType::Multiplexer => {
                let select = select_bits(def)?;
                Ok(ComponentKind::Multiplexer(Multiplexer::new(select)))
            }

            ComponentType::Demultiplexer => {
                let select = select_bits(def)?;
                Ok(ComponentKind::Demultiplexer(Demultiplexer::new(select)))
            }

            ComponentType::FlipFlop(kind) => {
                let trigger = def.keyword("trigger", Trigger::Rising, Trigger::from_keyword)?;
                let state = def.logic("state", LogicValue::False)?;
                Ok(ComponentKind::FlipFlop(FlipFlop::new(kind, trigger, state)))
            }

            ComponentType::Register => {
                let bits = register_bits(def, MAX_REGISTER_BITS)?;
                let trigger = def.keyword("trigger", Trigger::Rising, Trigger::from_keyword)?;
                let state = register_state(def, bits)?;
                Ok(ComponentKind::Register(Register::new(bits, trigger, &state)))
            }

            ComponentType::ShiftRegister => {
                let decode = def.keyword("decode", DecodeMode::Raw, DecodeMode::from_keyword)?;
                let max = match decode {
                    DecodeMode::Raw => MAX_REGISTER_BITS,
                    DecodeMode::OneHot => MAX_ONE_HOT_BITS,
                };
                let bits = register_bits(def, max)?;
                let trigger = def.keyword("trigger", Trigger::Rising, Trigger::from_keyword)?;
                let state = register_state(def, bits)?;
                Ok(ComponentKind::ShiftRegister(ShiftRegister::new(
                    bits, trigger, decode, &state,
                )))
            }

            ComponentType::Clock => {
                let period = def.uint("period", DEFAULT_PERIOD)?;
                if period == 0 {
                    return Err(def.invalid("period", "period must be positive"));
                }
                let duty = def.uint("duty", u64::from(DEFAULT_DUTY_CYCLE))?;
                if duty > 100 {
                    return Err(def.invalid("duty", "duty cycle is a percentage (0-100)"));
                }
                let phase = def.uint("phase", 0)?;
                Ok(ComponentKind::Clock(Clock::new(period, duty as u8, phase)))
            }

            ComponentType::Switch => {
                let value = def.logic("value", LogicValue::False)?;
                Ok(ComponentKind::Switch(Switch::new(value)))
            }

            ComponentType::Constant => {
                let value = def.logic("value", LogicValue::True)?;
                Ok(ComponentKind::Constant(Constant { value }))
            }

            ComponentType::Probe => Ok(ComponentKind::Probe(Probe::default())),
        }
    }

    /// The netlist type this kind is written as.
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentKind::Gate(g) => ComponentType::Gate(g.op),
            ComponentKind::TriState(_) => ComponentType::TriState,
            ComponentKind::Bus(_) => ComponentType::Bus,
            ComponentKind::Multiplexer(_) => ComponentType::Multiplexer,
            ComponentKind::Demultiplexer(_) => ComponentType::Demultiplexer,
            ComponentKind::FlipFlop(ff) => ComponentType::FlipFlop(ff.kind),
            ComponentKind::Register(_) => ComponentType::Register,
            ComponentKind::ShiftRegister(_) => ComponentType::ShiftRegister,
            ComponentKind::Clock(_) => ComponentType::Clock,
            ComponentKind::Switch(_) => ComponentType::Switch,
            ComponentKind::Constant(_) => ComponentType::Constant,
            ComponentKind::Probe(_) => ComponentType::Probe,
        }
    }

    /// Configuration and stored state, as netlist `key=value` pairs.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        fn word(bits: &[LogicValue]) -> String {
            bits.iter().map(|b| b.to_display_char()).collect()
        }

        match self {
            ComponentKind::Gate(g) if g.op.is_unary() => Vec::new(),
            ComponentKind::Gate(g) => vec![("inputs", g.inputs().to_string())],
            ComponentKind::TriState(_) | ComponentKind::Probe(_) => Vec::new(),
            ComponentKind::Bus(b) => vec![("inputs", b.inputs().to_string())],
            ComponentKind::Multiplexer(m) => vec![("select", m.select_bits().to_string())],
            ComponentKind::Demultiplexer(d) => vec![("select", d.select_bits().to_string())],
            ComponentKind::FlipFlop(ff) => vec![
                ("trigger", ff.edge.trigger.keyword().to_string()),
                ("state", ff.state().to_string()),
            ],
            ComponentKind::Register(r) => vec![
                ("bits", r.bits().to_string()),
                ("trigger", r.edge.trigger.keyword().to_string()),
                ("state", word(r.stored())),
            ],
            ComponentKind::ShiftRegister(s) => vec![
                ("bits", s.bits().to_string()),
                ("trigger", s.edge.trigger.keyword().to_string()),
                ("decode", s.decode.keyword().to_string()),
                ("state", word(s.stored())),
            ],
            ComponentKind::Clock(c) => vec![
                ("period", c.period().to_string()),
                ("duty", c.duty_cycle().to_string()),
                ("phase", c.phase().to_string()),
            ],
            ComponentKind::Switch(s) => vec![("value", s.value.to_string())],
            ComponentKind::Constant(c) => vec![("value", c.value.to_string())],
        }
    }

    /// Input pin names, in input order.
    pub fn input_names(&self) -> Vec<String> {
        match self {
            ComponentKind::Gate(g) => g.input_names(),
            ComponentKind::TriState(t) => t.input_names(),
            ComponentKind::Bus(b) => b.input_names(),
            ComponentKind::Multiplexer(m) => m.input_names(),
            ComponentKind::Demultiplexer(d) => d.input_names(),
            ComponentKind::FlipFlop(ff) => ff.input_names(),
            ComponentKind::Register(r) => r.input_names(),
            ComponentKind::ShiftRegister(s) => s.input_names(),
            ComponentKind::Probe(_) => vec!["in".to_string()],
            ComponentKind::Clock(_) | ComponentKind::Switch(_) | ComponentKind::Constant(_) => {
                Vec::new()
            }
        }
    }

    /// Output pin names, in output order.
    pub fn output_names(&self) -> Vec<String> {
        match self {
            ComponentKind::Demultiplexer(d) => d.output_names(),
            ComponentKind::FlipFlop(ff) => ff.output_names(),
            ComponentKind::Register(r) => r.output_names(),
            ComponentKind::ShiftRegister(s) => s.output_names(),
            ComponentKind::Probe(_) => Vec::new(),
            _ => vec!["out".to_string()],
        }
    }

    /// True for kinds whose state only changes on a clock edge.
    pub fn is_edge_triggered(&self) -> bool {
        matches!(
            self,
            ComponentKind::FlipFlop(_) | ComponentKind::Register(_) | ComponentKind::ShiftRegister(_)
        )
    }

    /// Recompute the outputs from the input values at simulated time `now`.
    pub fn recalc(&mut self, inputs: &[LogicValue], now: SimTime) -> Recalc {
        match self {
            ComponentKind::Gate(g) => Recalc::outputs(vec![g.eval(inputs)]),
            ComponentKind::TriState(t) => {
                Recalc::outputs(vec![t.eval(pin(inputs, 0), pin(inputs, 1))])
            }
            ComponentKind::Bus(b) => Recalc::outputs(vec![b.eval(inputs)]),
            ComponentKind::Multiplexer(m) => Recalc::outputs(vec![m.eval(inputs)]),
            ComponentKind::Demultiplexer(d) => Recalc::outputs(d.eval(inputs)),
            ComponentKind::FlipFlop(ff) => Recalc::outputs(ff.recalc(inputs)),
            ComponentKind::Register(r) => Recalc::outputs(r.recalc(inputs)),
            ComponentKind::ShiftRegister(s) => Recalc::outputs(s.recalc(inputs)),
            ComponentKind::Clock(c) => {
                let (level, wake_at) = c.state_at(now);
                Recalc {
                    outputs: vec![level],
                    wake_at,
                }
            }
            ComponentKind::Switch(s) => Recalc::outputs(vec![s.value]),
            ComponentKind::Constant(c) => Recalc::outputs(vec![c.value]),
            ComponentKind::Probe(p) => {
                p.observe(pin(inputs, 0));
                Recalc::outputs(Vec::new())
            }
        }
    }
}

fn select_bits(def: &ComponentDef) -> Result<usize> {
    let select = def.uint("select", 1)?;
    if select == 0 || select as usize > MAX_SELECT_BITS {
        return Err(def.invalid(
            "select",
            format!("select width must be between 1 and {MAX_SELECT_BITS}"),
        ));
    }
    Ok(select as usize)
}

fn register_bits(def: &ComponentDef, max: usize) -> Result<usize> {
    let bits = def.uint("bits", 4)?;
    if bits == 0 || bits as usize > max {
        return Err(def.invalid("bits", format!("width must be between 1 and {max}")));
    }
    Ok(bits as usize)
}

/// Initial register contents; shorter than `bits` pads with `0`.
fn register_state(def: &ComponentDef, bits: usize) -> Result<Vec<LogicValue>> {
    let state = def.word("state")?;
    if state.len() > bits {
        return Err(def.invalid(
            "state",
            format!("{} bits given for a {bits}-bit register", state.len()),
        ));
    }
    Ok(state)
}

/// A circuit element: a kind plus its pins and lifecycle.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub kind: ComponentKind,
    /// Input node ids, in pin order
    pub inputs: Vec<NodeId>,
    /// Output node ids, in pin order
    pub outputs: Vec<NodeId>,
    /// Opaque position offset for the presentation layer
    pub position: (i32, i32),
    lifecycle: Lifecycle,
    pub(crate) stale: bool,
    pub(crate) wake: Option<EventKey>,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        name: String,
        kind: ComponentKind,
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            inputs,
            outputs,
            position: (0, 0),
            lifecycle: Lifecycle::Unplaced,
            stale: false,
            wake: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    /// True while the cached outputs may not reflect the inputs.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    /// Node id of the input pin called `name`.
    pub fn input_pin(&self, name: &str) -> Option<NodeId> {
        let index = self.kind.input_names().iter().position(|n| n == name)?;
        self.inputs.get(index).copied()
    }

    /// Node id of the output pin called `name`.
    pub fn output_pin(&self, name: &str) -> Option<NodeId> {
        let index = self.kind.output_names().iter().position(|n| n == name)?;
        self.outputs.get(index).copied()
    }

    /// Node id of the pin called `name`, looking at inputs first.
    pub fn pin(&self, name: &str) -> Result<NodeId> {
        self.input_pin(name)
            .or_else(|| self.output_pin(name))
            .ok_or_else(|| GatewaveError::UnknownPin {
                component: self.name.clone(),
                pin: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;
    use crate::logic::LogicOp;

    fn kind_of(line: &str) -> Result<ComponentKind> {
        let ast = dsl::parse(line)?;
        ComponentKind::from_def(&ast.components[0])
    }

    #[test]
    fn test_defaults_for_missing_params() {
        let kind = kind_of("CLOCK clk").unwrap();
        assert_eq!(kind, ComponentKind::Clock(Clock::new(1000, 50, 0)));

        let kind = kind_of("AND g").unwrap();
        assert_eq!(kind, ComponentKind::Gate(Gate::new(LogicOp::And, 2)));

        let kind = kind_of("DFF ff").unwrap();
        assert_eq!(kind.input_names(), vec!["d", "clk", "clr"]);
        assert_eq!(kind.output_names(), vec!["q", "qn"]);
        assert!(kind.is_edge_triggered());
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        assert!(matches!(
            kind_of("CLOCK clk duty=150"),
            Err(GatewaveError::InvalidParameter { .. })
        ));
        assert!(matches!(
            kind_of("REG r bits=0"),
            Err(GatewaveError::InvalidParameter { .. })
        ));
        assert!(matches!(
            kind_of("SHIFT s bits=9 decode=onehot"),
            Err(GatewaveError::InvalidParameter { .. })
        ));
        assert!(matches!(
            kind_of("DFF ff trigger=sideways"),
            Err(GatewaveError::InvalidParameter { .. })
        ));
        assert!(matches!(
            kind_of("REG r bits=2 state=101"),
            Err(GatewaveError::InvalidParameter { .. })
        ));
        assert!(matches!(
            kind_of("SHIFT s bits=3 state=0000"),
            Err(GatewaveError::InvalidParameter { .. })
        ));
        assert!(kind_of("REG r bits=3 state=1").is_ok());
    }

    #[test]
    fn test_huge_clock_period_is_accepted() {
        let mut kind = kind_of("CLOCK c period=18446744073709551615").unwrap();
        let recalc = kind.recalc(&[], SimTime::ZERO);
        assert_eq!(recalc.outputs, vec![LogicValue::True]);
        assert_eq!(recalc.wake_at, Some(SimTime(u64::MAX / 2)));
    }

    #[test]
    fn test_params_round_trip_through_from_def() {
        let lines = [
            "NAND g inputs=3",
            "MUX m select=2",
            "JKFF ff trigger=falling state=1",
            "REG r bits=3 trigger=either state=1X0",
            "SHIFT s bits=2 trigger=rising decode=onehot state=01",
            "CLOCK c period=250 duty=20 phase=40",
            "SWITCH sw value=1",
            "CONST k value=Z",
        ];
        for line in lines {
            let kind = kind_of(line).unwrap();
            let keyword = kind.component_type().keyword();
            let params: Vec<String> = kind
                .params()
                .into_iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            let rewritten = format!("{keyword} x {}", params.join(" "));
            assert_eq!(kind_of(&rewritten).unwrap(), kind, "{line}");
        }
    }

    #[test]
    fn test_clock_recalc_requests_wake() {
        let mut kind = ComponentKind::Clock(Clock::new(1000, 50, 0));
        let recalc = kind.recalc(&[], SimTime(1999));
        assert_eq!(recalc.outputs, vec![LogicValue::False]);
        assert_eq!(recalc.wake_at, Some(SimTime(2000)));
    }

    #[test]
    fn test_probe_records_input() {
        let mut kind = ComponentKind::Probe(Probe::default());
        assert!(kind.recalc(&[LogicValue::HighImpedance], SimTime::ZERO).outputs.is_empty());
        match kind {
            ComponentKind::Probe(p) => assert_eq!(p.value(), LogicValue::HighImpedance),
            _ => unreachable!(),
        }
    }
}
