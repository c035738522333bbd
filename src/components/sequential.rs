//! Edge-triggered flip-flops.
//!
//! Sequential elements sample their clock input on every recompute. A
//! transition only counts as an edge when both the previous and the current
//! sample are definite and differ in the configured direction, so a clock
//! passing through `X` or `Z` never triggers. An asserted `clr` input resets
//! the stored bit regardless of the clock.

use crate::logic::{LogicOp, LogicValue};

use super::pin;

/// Which clock transition captures data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    /// 0 → 1
    #[default]
    Rising,
    /// 1 → 0
    Falling,
    /// Both directions
    Either,
}

impl Trigger {
    /// Parse a trigger from its netlist keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rising" | "pos" | "posedge" => Some(Self::Rising),
            "falling" | "neg" | "negedge" => Some(Self::Falling),
            "either" | "both" => Some(Self::Either),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Either => "either",
        }
    }

    /// True if `previous → current` is an edge of this kind.
    pub fn fires(self, previous: LogicValue, current: LogicValue) -> bool {
        match (previous.as_bool(), current.as_bool()) {
            (Some(before), Some(after)) if before != after => match self {
                Self::Rising => after,
                Self::Falling => before,
                Self::Either => true,
            },
            _ => false,
        }
    }
}

/// Clock edge detector holding the last sampled clock level.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDetector {
    pub trigger: Trigger,
    last: LogicValue,
}

impl EdgeDetector {
    /// The first sample after construction never triggers.
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            last: LogicValue::Unknown,
        }
    }

    /// Record a clock sample. Returns true if it completes an edge.
    pub fn sample(&mut self, clock: LogicValue) -> bool {
        let fired = self.trigger.fires(self.last, clock);
        self.last = clock;
        fired
    }

    pub fn last_sample(&self) -> LogicValue {
        self.last
    }
}

/// Flip-flop flavor, which fixes the data pins and the next-state function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipFlopKind {
    D,
    T,
    Jk,
    Sr,
}

impl FlipFlopKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::D => "DFF",
            Self::T => "TFF",
            Self::Jk => "JKFF",
            Self::Sr => "SRFF",
        }
    }

    /// Data pins, in input order.
    pub fn data_pins(self) -> &'static [&'static str] {
        match self {
            Self::D => &["d"],
            Self::T => &["t"],
            Self::Jk => &["j", "k"],
            Self::Sr => &["s", "r"],
        }
    }

    fn next_state(self, data: &[LogicValue], q: LogicValue) -> LogicValue {
        let a = pin(data, 0);
        match self {
            Self::D => a.driven(),
            Self::T => LogicOp::Xor.combine(&[a, q]),
            Self::Jk => {
                let k = pin(data, 1);
                let set = LogicOp::And.combine(&[a, !q]);
                let hold = LogicOp::And.combine(&[!k, q]);
                LogicOp::Or.combine(&[set, hold])
            }
            Self::Sr => {
                let r = pin(data, 1);
                if a == LogicValue::True && r == LogicValue::True {
                    return LogicValue::Unknown;
                }
                let hold = LogicOp::And.combine(&[!r, q]);
                LogicOp::Or.combine(&[a, hold])
            }
        }
    }
}

/// A single-bit edge-triggered storage element with `q` and `qn` outputs.
///
/// Inputs: the kind's data pins, then `clk`, then `clr`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipFlop {
    pub kind: FlipFlopKind,
    pub edge: EdgeDetector,
    state: LogicValue,
}

impl FlipFlop {
    pub fn new(kind: FlipFlopKind, trigger: Trigger, initial: LogicValue) -> Self {
        Self {
            kind,
            edge: EdgeDetector::new(trigger),
            state: initial,
        }
    }

    /// Stored bit.
    pub fn state(&self) -> LogicValue {
        self.state
    }

    pub fn input_names(&self) -> Vec<String> {
        self.kind
            .data_pins()
            .iter()
            .chain(["clk", "clr"].iter())
            .map(|name| name.to_string())
            .collect()
    }

    pub fn output_names(&self) -> Vec<String> {
        vec!["q".to_string(), "qn".to_string()]
    }

    /// Sample the inputs and return `[q, qn]`.
    pub fn recalc(&mut self, inputs: &[LogicValue]) -> Vec<LogicValue> {
        let data_len = self.kind.data_pins().len();
        let clock = pin(inputs, data_len);
        let clear = pin(inputs, data_len + 1);

        let edge = self.edge.sample(clock);
        if clear == LogicValue::True {
            self.state = LogicValue::False;
        } else if edge {
            self.state = self.kind.next_state(&inputs[..data_len.min(inputs.len())], self.state);
        }
        vec![self.state, !self.state]
    }
}
