//! Combinational gates: AND, OR, XOR, their negations, NOT and BUFFER.

use crate::logic::{LogicOp, LogicValue};

/// An n-input logic gate with a single output.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub op: LogicOp,
    inputs: usize,
}

impl Gate {
    /// Create a gate. Unary operators always get one input; others at least one.
    pub fn new(op: LogicOp, inputs: usize) -> Self {
        let inputs = if op.is_unary() { 1 } else { inputs.max(1) };
        Self { op, inputs }
    }

    /// Number of input pins.
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn input_names(&self) -> Vec<String> {
        if self.op.is_unary() {
            vec!["in".to_string()]
        } else {
            (0..self.inputs).map(|i| format!("in{i}")).collect()
        }
    }

    /// Output value for the given input values.
    pub fn eval(&self, inputs: &[LogicValue]) -> LogicValue {
        self.op.combine(inputs)
    }
}
