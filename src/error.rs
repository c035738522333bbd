//! Error types for the Gatewave logic simulator.
//!
//! This module provides a unified error type [`GatewaveError`] that covers
//! every error condition that can occur while loading a netlist, editing the
//! circuit graph, and driving the timeline.
//!
//! Indeterminate logic is never an error: recompute functions always produce a
//! [`LogicValue`](crate::logic::LogicValue), and forced-value conflicts are
//! advisory flags on the node rather than errors.

use thiserror::Error;

use crate::circuit::{ComponentId, NodeId, NodeKind, WireId};
use crate::timeline::SimTime;

/// Result type alias using [`GatewaveError`].
pub type Result<T> = std::result::Result<T, GatewaveError>;

/// Unified error type for all Gatewave operations.
#[derive(Error, Debug)]
pub enum GatewaveError {
    // ============ Netlist Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component keyword
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    // ============ Graph Errors ============
    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// Component name not present in the circuit
    #[error("Component '{component}' not found in circuit")]
    ComponentNotFound { component: String },

    /// Component id not present in the circuit
    #[error("Component {component} does not exist")]
    NoSuchComponent { component: ComponentId },

    /// Pin name not defined for the component's kind
    #[error("Component '{component}' has no pin named '{pin}'")]
    UnknownPin { component: String, pin: String },

    /// Node not registered (never created, or destroyed with its owner)
    #[error("Node {node} not found in circuit")]
    NodeNotFound { node: NodeId },

    /// Wire id not present in the circuit
    #[error("Wire {wire} not found in circuit")]
    WireNotFound { wire: WireId },

    /// The input node already has a live incoming wire
    #[error("Input node {node} is already driven by wire {wire}; disconnect it first")]
    InputAlreadyWired { node: NodeId, wire: WireId },

    /// Node has the wrong kind for the requested operation
    #[error("Node {node} is not an {expected} node")]
    WrongNodeKind { node: NodeId, expected: NodeKind },

    /// Node id reassignment target is already registered
    #[error("Node id {node} is already in use")]
    DuplicateNodeId { node: NodeId },

    /// Every node id is registered or was handed out before
    #[error("No free node ids left in this circuit")]
    NodeIdsExhausted,

    /// Operation requires a switch component
    #[error("Component {component} is not a switch")]
    NotASwitch { component: ComponentId },

    /// Operation requires a live component
    #[error("Component {component} is not live")]
    ComponentNotLive { component: ComponentId },

    /// Registry or wiring invariants do not hold
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    // ============ Timeline Errors ============
    /// Event scheduled before the timeline's current instant
    #[error("Event scheduled at {requested} but the timeline is already at {now}")]
    ScheduledInPast { requested: SimTime, now: SimTime },

    /// Attempt to move the timeline backwards
    #[error("Cannot advance timeline to {requested}; it is already at {now}")]
    TimeReversal { requested: SimTime, now: SimTime },

    // ============ I/O Errors ============
    /// Error reading a netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing trace output
    #[error("Trace output error: {message}")]
    TraceOutputError { message: String },
}

impl GatewaveError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid topology error
    pub fn topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }
}
