//! Abstract Syntax Tree types for the netlist language.

use std::collections::HashMap;

use crate::components::FlipFlopKind;
use crate::error::{GatewaveError, Result};
use crate::logic::{LogicOp, LogicValue};

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetlistAst {
    /// All component instances
    pub components: Vec<ComponentDef>,
    /// `.wire` directives
    pub wires: Vec<WireDef>,
    /// `.force` directives
    pub forces: Vec<ForceDef>,
    /// `.color` directives
    pub colors: Vec<ColorDef>,
}

impl NetlistAst {
    /// Create a new empty netlist AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A component definition from the netlist.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    /// Component type
    pub component_type: ComponentType,
    /// Unique component name
    pub name: String,
    /// `key=value` parameters, keys lowercased
    pub params: HashMap<String, String>,
    /// Source line number for error reporting
    pub line: usize,
}

impl ComponentDef {
    /// Raw text of a parameter.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Unsigned integer parameter, or `default` when absent.
    pub fn uint(&self, key: &str, default: u64) -> Result<u64> {
        match self.text(key) {
            None => Ok(default),
            Some(text) => text
                .parse()
                .map_err(|_| self.invalid(key, format!("expected an unsigned integer, got '{text}'"))),
        }
    }

    /// Signed integer parameter, or `default` when absent.
    pub fn int(&self, key: &str, default: i64) -> Result<i64> {
        match self.text(key) {
            None => Ok(default),
            Some(text) => text
                .parse()
                .map_err(|_| self.invalid(key, format!("expected an integer, got '{text}'"))),
        }
    }

    /// Single logic value parameter (`0`, `1`, `X` or `Z`).
    pub fn logic(&self, key: &str, default: LogicValue) -> Result<LogicValue> {
        match self.text(key) {
            None => Ok(default),
            Some(text) => LogicValue::parse(text)
                .ok_or_else(|| self.invalid(key, format!("expected 0, 1, X or Z, got '{text}'"))),
        }
    }

    /// Bit string parameter, bit 0 first. Empty when absent.
    pub fn word(&self, key: &str) -> Result<Vec<LogicValue>> {
        match self.text(key) {
            None => Ok(Vec::new()),
            Some(text) => text
                .chars()
                .map(LogicValue::from_display_char)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| self.invalid(key, format!("expected a string of 0, 1, X, Z, got '{text}'"))),
        }
    }

    /// Keyword parameter parsed by `parse`, or `default` when absent.
    pub fn keyword<T>(&self, key: &str, default: T, parse: impl Fn(&str) -> Option<T>) -> Result<T> {
        match self.text(key) {
            None => Ok(default),
            Some(text) => parse(text).ok_or_else(|| self.invalid(key, format!("unrecognized value '{text}'"))),
        }
    }

    /// Build an invalid-parameter error for this component.
    pub fn invalid(&self, key: &str, message: impl Into<String>) -> GatewaveError {
        GatewaveError::invalid_parameter(&self.name, key, message)
    }
}

/// Component types supported by the netlist language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// Combinational gate
    Gate(LogicOp),
    /// Tri-state buffer
    TriState,
    /// Multi-driver bus resolver
    Bus,
    /// Multiplexer
    Multiplexer,
    /// Demultiplexer
    Demultiplexer,
    /// Single-bit flip-flop
    FlipFlop(FlipFlopKind),
    /// Parallel-load register
    Register,
    /// Serial-in shift register
    ShiftRegister,
    /// Clock generator
    Clock,
    /// User switch
    Switch,
    /// Constant driver
    Constant,
    /// Output indicator
    Probe,
}

impl ComponentType {
    /// Parse a component type from its keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if let Some(op) = LogicOp::from_keyword(keyword) {
            return Some(Self::Gate(op));
        }
        match keyword.to_ascii_uppercase().as_str() {
            "TRI" | "TRISTATE" => Some(Self::TriState),
            "BUS" => Some(Self::Bus),
            "MUX" => Some(Self::Multiplexer),
            "DEMUX" => Some(Self::Demultiplexer),
            "DFF" => Some(Self::FlipFlop(FlipFlopKind::D)),
            "TFF" => Some(Self::FlipFlop(FlipFlopKind::T)),
            "JKFF" => Some(Self::FlipFlop(FlipFlopKind::Jk)),
            "SRFF" => Some(Self::FlipFlop(FlipFlopKind::Sr)),
            "REG" | "REGISTER" => Some(Self::Register),
            "SHIFT" | "SHIFTREG" => Some(Self::ShiftRegister),
            "CLOCK" | "CLK" => Some(Self::Clock),
            "SWITCH" | "SW" => Some(Self::Switch),
            "CONST" => Some(Self::Constant),
            "PROBE" | "LED" => Some(Self::Probe),
            _ => None,
        }
    }

    /// Canonical keyword, as written by the netlist writer.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Gate(op) => op.keyword(),
            Self::TriState => "TRI",
            Self::Bus => "BUS",
            Self::Multiplexer => "MUX",
            Self::Demultiplexer => "DEMUX",
            Self::FlipFlop(kind) => kind.keyword(),
            Self::Register => "REG",
            Self::ShiftRegister => "SHIFT",
            Self::Clock => "CLOCK",
            Self::Switch => "SWITCH",
            Self::Constant => "CONST",
            Self::Probe => "PROBE",
        }
    }
}

/// A `component pin` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRef {
    pub component: String,
    pub pin: String,
}

/// A `.wire` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct WireDef {
    /// Driving output pin
    pub from: PinRef,
    /// Driven input pin
    pub to: PinRef,
    /// Propagation delay in milliseconds
    pub delay: Option<u64>,
    /// Cosmetic color tag
    pub color: Option<String>,
    /// Source line number
    pub line: usize,
}

/// A `.force` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceDef {
    pub target: PinRef,
    pub value: LogicValue,
    pub line: usize,
}

/// A `.color` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDef {
    pub target: PinRef,
    pub color: String,
    pub line: usize,
}
