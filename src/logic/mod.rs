//! Four-valued logic model.
//!
//! Every signal in the simulator carries a [`LogicValue`]. Besides the two
//! definite levels there are two non-definite symbols:
//!
//! - `Unknown` (`X`): an undriven or inconsistent signal.
//! - `HighImpedance` (`Z`): a tri-stated driver. Combinational logic reads it
//!   as `Unknown`; tri-state buffers and buses pass it through.
//!
//! All functions here are total over the four-valued domain. A definite
//! operand that decides the result on its own (a `False` into AND, a `True`
//! into OR) dominates any non-definite operand, matching hardware behavior.

use std::fmt;
use std::ops::Not;

/// A four-valued logic signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogicValue {
    /// Logic low
    #[default]
    False,
    /// Logic high
    True,
    /// Undriven or inconsistent
    Unknown,
    /// Tri-stated driver
    HighImpedance,
}

impl LogicValue {
    /// Every value, in display order.
    pub const ALL: [LogicValue; 4] = [
        LogicValue::False,
        LogicValue::True,
        LogicValue::Unknown,
        LogicValue::HighImpedance,
    ];

    /// Convert a definite value to `bool`.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            LogicValue::False => Some(false),
            LogicValue::True => Some(true),
            LogicValue::Unknown | LogicValue::HighImpedance => None,
        }
    }

    /// True for `False` and `True`.
    pub fn is_definite(self) -> bool {
        self.as_bool().is_some()
    }

    pub fn is_unknown(self) -> bool {
        self == LogicValue::Unknown
    }

    pub fn is_high_impedance(self) -> bool {
        self == LogicValue::HighImpedance
    }

    /// The value as seen by a consumer that expects a driven bit.
    ///
    /// `HighImpedance` becomes `Unknown`; everything else is unchanged.
    pub fn driven(self) -> Self {
        match self {
            LogicValue::HighImpedance => LogicValue::Unknown,
            other => other,
        }
    }

    /// Single-character display form: `0`, `1`, `X`, `Z`.
    pub fn to_display_char(self) -> char {
        match self {
            LogicValue::False => '0',
            LogicValue::True => '1',
            LogicValue::Unknown => 'X',
            LogicValue::HighImpedance => 'Z',
        }
    }

    /// Parse the display form (case-insensitive for `X` and `Z`).
    pub fn from_display_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(LogicValue::False),
            '1' => Some(LogicValue::True),
            'x' | 'X' => Some(LogicValue::Unknown),
            'z' | 'Z' => Some(LogicValue::HighImpedance),
            _ => None,
        }
    }

    /// Parse a single-symbol string such as `"1"` or `"Z"`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_display_char(c),
            _ => None,
        }
    }

    /// Next step of the user force cycle:
    /// none → `Unknown` → `HighImpedance` → `False` → `True` → none.
    pub fn next_forced(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(LogicValue::Unknown),
            Some(LogicValue::Unknown) => Some(LogicValue::HighImpedance),
            Some(LogicValue::HighImpedance) => Some(LogicValue::False),
            Some(LogicValue::False) => Some(LogicValue::True),
            Some(LogicValue::True) => None,
        }
    }
}

impl From<bool> for LogicValue {
    fn from(value: bool) -> Self {
        if value {
            LogicValue::True
        } else {
            LogicValue::False
        }
    }
}

impl Not for LogicValue {
    type Output = LogicValue;

    fn not(self) -> Self::Output {
        match self {
            LogicValue::False => LogicValue::True,
            LogicValue::True => LogicValue::False,
            LogicValue::Unknown | LogicValue::HighImpedance => LogicValue::Unknown,
        }
    }
}

impl fmt::Display for LogicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_char())
    }
}

/// A combinational logic function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    Not,
    Buffer,
}

impl LogicOp {
    /// Parse an operator from its netlist keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "XOR" => Some(Self::Xor),
            "NAND" => Some(Self::Nand),
            "NOR" => Some(Self::Nor),
            "XNOR" => Some(Self::Xnor),
            "NOT" | "INV" => Some(Self::Not),
            "BUF" | "BUFFER" => Some(Self::Buffer),
            _ => None,
        }
    }

    /// Netlist keyword for this operator.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xnor => "XNOR",
            Self::Not => "NOT",
            Self::Buffer => "BUF",
        }
    }

    /// True for operators that always take exactly one operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Self::Not | Self::Buffer)
    }

    /// Apply the operator to a list of operands.
    pub fn combine(self, operands: &[LogicValue]) -> LogicValue {
        match self {
            Self::And => and(operands),
            Self::Or => or(operands),
            Self::Xor => xor(operands),
            Self::Nand => !and(operands),
            Self::Nor => !or(operands),
            Self::Xnor => !xor(operands),
            Self::Not => operands.first().map_or(LogicValue::Unknown, |v| !*v),
            Self::Buffer => operands.first().map_or(LogicValue::Unknown, |v| v.driven()),
        }
    }
}

/// Apply `op` to `operands`. See [`LogicOp::combine`].
pub fn combine(op: LogicOp, operands: &[LogicValue]) -> LogicValue {
    op.combine(operands)
}

/// Read a little-endian bit vector (index 0 is the least significant bit).
///
/// Returns `None` if any bit is not definite or the word does not fit.
pub fn to_word(bits: &[LogicValue]) -> Option<usize> {
    if bits.len() >= usize::BITS as usize {
        return None;
    }
    bits.iter().enumerate().try_fold(0usize, |word, (i, bit)| {
        bit.as_bool().map(|set| if set { word | (1 << i) } else { word })
    })
}

fn and(operands: &[LogicValue]) -> LogicValue {
    if operands.contains(&LogicValue::False) {
        LogicValue::False
    } else if operands.iter().all(|v| *v == LogicValue::True) {
        LogicValue::True
    } else {
        LogicValue::Unknown
    }
}

fn or(operands: &[LogicValue]) -> LogicValue {
    if operands.contains(&LogicValue::True) {
        LogicValue::True
    } else if operands.iter().all(|v| *v == LogicValue::False) {
        LogicValue::False
    } else {
        LogicValue::Unknown
    }
}

fn xor(operands: &[LogicValue]) -> LogicValue {
    let mut parity = false;
    for value in operands {
        match value.as_bool() {
            Some(bit) => parity ^= bit,
            None => return LogicValue::Unknown,
        }
    }
    parity.into()
}

#[cfg(test)]
mod tests {
    use super::LogicValue::{False as F, HighImpedance as Z, True as T, Unknown as X};
    use super::*;

    #[test]
    fn test_and_dominance() {
        assert_eq!(combine(LogicOp::And, &[X, T]), X);
        assert_eq!(combine(LogicOp::And, &[X, F]), F);
        assert_eq!(combine(LogicOp::And, &[Z, F, X]), F);
        assert_eq!(combine(LogicOp::And, &[T, T, T]), T);
        assert_eq!(combine(LogicOp::Nand, &[X, F]), T);
        assert_eq!(combine(LogicOp::Nand, &[X, T]), X);
    }

    #[test]
    fn test_or_dominance() {
        assert_eq!(combine(LogicOp::Or, &[X, T]), T);
        assert_eq!(combine(LogicOp::Or, &[X, F]), X);
        assert_eq!(combine(LogicOp::Or, &[Z, F]), X);
        assert_eq!(combine(LogicOp::Nor, &[F, F]), T);
        assert_eq!(combine(LogicOp::Nor, &[Z, T]), F);
    }

    #[test]
    fn test_xor_needs_every_operand() {
        assert_eq!(combine(LogicOp::Xor, &[T, F, T]), F);
        assert_eq!(combine(LogicOp::Xor, &[T, F, F]), T);
        assert_eq!(combine(LogicOp::Xor, &[T, X]), X);
        assert_eq!(combine(LogicOp::Xnor, &[T, T]), T);
        assert_eq!(combine(LogicOp::Xnor, &[Z, T]), X);
    }

    #[test]
    fn test_unary_ops() {
        assert_eq!(combine(LogicOp::Not, &[T]), F);
        assert_eq!(combine(LogicOp::Not, &[Z]), X);
        assert_eq!(combine(LogicOp::Buffer, &[Z]), X);
        assert_eq!(combine(LogicOp::Buffer, &[]), X);
    }

    #[test]
    fn test_empty_operands_are_identities() {
        assert_eq!(combine(LogicOp::And, &[]), T);
        assert_eq!(combine(LogicOp::Or, &[]), F);
        assert_eq!(combine(LogicOp::Xor, &[]), F);
    }

    #[test]
    fn test_to_word() {
        assert_eq!(to_word(&[T, F, T]), Some(5));
        assert_eq!(to_word(&[]), Some(0));
        assert_eq!(to_word(&[T, X]), None);
        assert_eq!(to_word(&[Z]), None);
    }

    #[test]
    fn test_display_chars() {
        for value in LogicValue::ALL {
            let c = value.to_display_char();
            assert_eq!(LogicValue::from_display_char(c), Some(value));
        }
        assert!(X.is_unknown() && !Z.is_unknown());
        assert!(Z.is_high_impedance() && !X.is_high_impedance());
        assert!(!F.is_unknown() && !T.is_high_impedance());
        assert_eq!(LogicValue::parse("z"), Some(Z));
        assert_eq!(LogicValue::parse("10"), None);
        assert_eq!(LogicValue::parse(""), None);
    }

    #[test]
    fn test_force_cycle_visits_every_value() {
        let mut forced = None;
        let mut seen = Vec::new();
        loop {
            forced = LogicValue::next_forced(forced);
            match forced {
                Some(v) => seen.push(v),
                None => break,
            }
        }
        assert_eq!(seen, vec![X, Z, F, T]);
    }
}
