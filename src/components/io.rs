//! I/O pins: user switches, constants and probes.

use crate::logic::LogicValue;

/// A user-operated input pin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Switch {
    pub value: LogicValue,
}

impl Switch {
    pub fn new(value: LogicValue) -> Self {
        Self { value }
    }

    /// Flip a definite value; a non-definite value becomes `True`.
    pub fn toggle(&mut self) {
        self.value = match self.value {
            LogicValue::True => LogicValue::False,
            _ => LogicValue::True,
        };
    }
}

/// A fixed driver. Any of the four values is allowed, including `Z`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: LogicValue,
}

impl Default for Constant {
    fn default() -> Self {
        Self {
            value: LogicValue::True,
        }
    }
}

/// An output indicator (LED). It records the last value seen on its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probe {
    value: LogicValue,
}

impl Probe {
    pub fn value(&self) -> LogicValue {
        self.value
    }

    pub(crate) fn observe(&mut self, value: LogicValue) {
        self.value = value;
    }
}
