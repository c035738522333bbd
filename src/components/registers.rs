//! Multi-bit storage: parallel-load registers and shift registers.

use crate::logic::{to_word, LogicValue};

use super::pin;
use super::sequential::{EdgeDetector, Trigger};

/// Largest width for a one-hot decoded shift register (256 outputs).
pub const MAX_ONE_HOT_BITS: usize = 8;

/// Largest width for any register.
pub const MAX_REGISTER_BITS: usize = 64;

fn initial_bits(bits: usize, initial: &[LogicValue]) -> Vec<LogicValue> {
    (0..bits)
        .map(|i| initial.get(i).copied().unwrap_or(LogicValue::False))
        .collect()
}

/// An n-bit register that loads every `d` input on a clock edge.
///
/// Inputs: `d0..d(n-1)`, `clk`, `clr`. Outputs: `q0..q(n-1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Register {
    pub edge: EdgeDetector,
    stored: Vec<LogicValue>,
}

impl Register {
    /// Create a register. Missing initial bits default to `False`.
    pub fn new(bits: usize, trigger: Trigger, initial: &[LogicValue]) -> Self {
        Self {
            edge: EdgeDetector::new(trigger),
            stored: initial_bits(bits.clamp(1, MAX_REGISTER_BITS), initial),
        }
    }

    pub fn bits(&self) -> usize {
        self.stored.len()
    }

    pub fn stored(&self) -> &[LogicValue] {
        &self.stored
    }

    pub fn input_names(&self) -> Vec<String> {
        (0..self.bits())
            .map(|i| format!("d{i}"))
            .chain(["clk".to_string(), "clr".to_string()])
            .collect()
    }

    pub fn output_names(&self) -> Vec<String> {
        (0..self.bits()).map(|i| format!("q{i}")).collect()
    }

    pub fn recalc(&mut self, inputs: &[LogicValue]) -> Vec<LogicValue> {
        let bits = self.bits();
        let edge = self.edge.sample(pin(inputs, bits));
        if pin(inputs, bits + 1) == LogicValue::True {
            self.stored.fill(LogicValue::False);
        } else if edge {
            for (i, bit) in self.stored.iter_mut().enumerate() {
                *bit = pin(inputs, i).driven();
            }
        }
        self.stored.clone()
    }
}

/// How a shift register presents its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// One output per stored bit
    #[default]
    Raw,
    /// `2^n` outputs; only the one matching the stored word is high
    OneHot,
}

impl DecodeMode {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "none" | "parallel" => Some(Self::Raw),
            "onehot" | "decoded" => Some(Self::OneHot),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::OneHot => "onehot",
        }
    }
}

/// A serial-in shift register.
///
/// On each clock edge `si` enters at `q0` and every stored bit moves one
/// place up; the top bit falls off. Inputs: `si`, `clk`, `clr`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRegister {
    pub edge: EdgeDetector,
    pub decode: DecodeMode,
    stored: Vec<LogicValue>,
}

impl ShiftRegister {
    /// Create a shift register. One-hot decoding caps the width at
    /// [`MAX_ONE_HOT_BITS`].
    pub fn new(bits: usize, trigger: Trigger, decode: DecodeMode, initial: &[LogicValue]) -> Self {
        let max = match decode {
            DecodeMode::Raw => MAX_REGISTER_BITS,
            DecodeMode::OneHot => MAX_ONE_HOT_BITS,
        };
        Self {
            edge: EdgeDetector::new(trigger),
            decode,
            stored: initial_bits(bits.clamp(1, max), initial),
        }
    }

    pub fn bits(&self) -> usize {
        self.stored.len()
    }

    pub fn stored(&self) -> &[LogicValue] {
        &self.stored
    }

    pub fn input_names(&self) -> Vec<String> {
        vec!["si".to_string(), "clk".to_string(), "clr".to_string()]
    }

    pub fn output_names(&self) -> Vec<String> {
        match self.decode {
            DecodeMode::Raw => (0..self.bits()).map(|i| format!("q{i}")).collect(),
            DecodeMode::OneHot => (0..1usize << self.bits()).map(|i| format!("y{i}")).collect(),
        }
    }

    pub fn recalc(&mut self, inputs: &[LogicValue]) -> Vec<LogicValue> {
        let edge = self.edge.sample(pin(inputs, 1));
        if pin(inputs, 2) == LogicValue::True {
            self.stored.fill(LogicValue::False);
        } else if edge {
            self.stored.rotate_right(1);
            self.stored[0] = pin(inputs, 0).driven();
        }
        self.outputs()
    }

    fn outputs(&self) -> Vec<LogicValue> {
        match self.decode {
            DecodeMode::Raw => self.stored.clone(),
            DecodeMode::OneHot => {
                let outputs = 1usize << self.bits();
                match to_word(&self.stored) {
                    Some(word) => (0..outputs).map(|i| LogicValue::from(i == word)).collect(),
                    None => vec![LogicValue::Unknown; outputs],
                }
            }
        }
    }
}
