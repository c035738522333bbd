//! Signal routing: tri-state buffers, buses, multiplexers and demultiplexers.
//!
//! The bus is the only place where several drivers meet on one net. Plain
//! wires are strictly one output to one input, so driver conflicts are
//! resolved here and nowhere else.

use crate::logic::{to_word, LogicValue};

/// Largest select width for multiplexers and demultiplexers.
pub const MAX_SELECT_BITS: usize = 8;

fn select_names(bits: usize) -> impl Iterator<Item = String> {
    (0..bits).map(|i| format!("s{i}"))
}

/// Buffer with an output enable.
///
/// `en = 1` passes `d` through verbatim (including `Z`), `en = 0` releases the
/// output to `Z`, and an indeterminate enable yields `X`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriState;

impl TriState {
    pub fn input_names(&self) -> Vec<String> {
        vec!["d".to_string(), "en".to_string()]
    }

    pub fn eval(&self, data: LogicValue, enable: LogicValue) -> LogicValue {
        match enable {
            LogicValue::True => data,
            LogicValue::False => LogicValue::HighImpedance,
            LogicValue::Unknown | LogicValue::HighImpedance => LogicValue::Unknown,
        }
    }
}

/// Resolves several tri-state drivers onto one net.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    inputs: usize,
}

impl Bus {
    pub fn new(inputs: usize) -> Self {
        Self {
            inputs: inputs.max(1),
        }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn input_names(&self) -> Vec<String> {
        (0..self.inputs).map(|i| format!("in{i}")).collect()
    }

    /// Released drivers (`Z`) are ignored. With no active driver the net
    /// floats at `Z`; an `X` driver or two drivers that disagree give `X`.
    pub fn eval(&self, drivers: &[LogicValue]) -> LogicValue {
        let mut resolved = LogicValue::HighImpedance;
        for &driver in drivers {
            match driver {
                LogicValue::HighImpedance => continue,
                LogicValue::Unknown => return LogicValue::Unknown,
                definite if resolved == LogicValue::HighImpedance => resolved = definite,
                definite if definite != resolved => return LogicValue::Unknown,
                _ => {}
            }
        }
        resolved
    }
}

/// Selects one of `2^select_bits` data inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Multiplexer {
    select_bits: usize,
}

impl Multiplexer {
    pub fn new(select_bits: usize) -> Self {
        Self {
            select_bits: select_bits.clamp(1, MAX_SELECT_BITS),
        }
    }

    pub fn select_bits(&self) -> usize {
        self.select_bits
    }

    pub fn data_inputs(&self) -> usize {
        1 << self.select_bits
    }

    pub fn input_names(&self) -> Vec<String> {
        select_names(self.select_bits)
            .chain((0..self.data_inputs()).map(|i| format!("d{i}")))
            .collect()
    }

    /// `inputs` holds the select bits followed by the data inputs.
    pub fn eval(&self, inputs: &[LogicValue]) -> LogicValue {
        let (select, data) = inputs.split_at(self.select_bits.min(inputs.len()));
        match to_word(select) {
            Some(index) => data.get(index).map_or(LogicValue::Unknown, |v| v.driven()),
            // Without a definite select the output is only known when every
            // candidate agrees.
            None => {
                let first = data.first().copied().unwrap_or(LogicValue::Unknown);
                if first.is_definite() && data.iter().all(|v| *v == first) {
                    first
                } else {
                    LogicValue::Unknown
                }
            }
        }
    }
}

/// Routes one data input to one of `2^select_bits` outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Demultiplexer {
    select_bits: usize,
}

impl Demultiplexer {
    pub fn new(select_bits: usize) -> Self {
        Self {
            select_bits: select_bits.clamp(1, MAX_SELECT_BITS),
        }
    }

    pub fn select_bits(&self) -> usize {
        self.select_bits
    }

    pub fn input_names(&self) -> Vec<String> {
        select_names(self.select_bits)
            .chain(std::iter::once("d".to_string()))
            .collect()
    }

    pub fn output_names(&self) -> Vec<String> {
        (0..1usize << self.select_bits).map(|i| format!("y{i}")).collect()
    }

    /// `inputs` holds the select bits followed by the data input.
    pub fn eval(&self, inputs: &[LogicValue]) -> Vec<LogicValue> {
        let outputs = 1usize << self.select_bits;
        let (select, rest) = inputs.split_at(self.select_bits.min(inputs.len()));
        let data = rest.first().map_or(LogicValue::Unknown, |v| v.driven());
        match to_word(select) {
            Some(index) => (0..outputs)
                .map(|i| if i == index { data } else { LogicValue::False })
                .collect(),
            None if data == LogicValue::False => vec![LogicValue::False; outputs],
            None => vec![LogicValue::Unknown; outputs],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::LogicValue::{False as F, HighImpedance as Z, True as T, Unknown as X};

    #[test]
    fn test_tristate_passes_high_impedance() {
        let tri = TriState;
        assert_eq!(tri.eval(T, T), T);
        assert_eq!(tri.eval(Z, T), Z);
        assert_eq!(tri.eval(T, F), Z);
        assert_eq!(tri.eval(F, X), X);
        assert_eq!(tri.eval(F, Z), X);
    }

    #[test]
    fn test_bus_resolution() {
        let bus = Bus::new(3);
        assert_eq!(bus.eval(&[Z, Z, Z]), Z);
        assert_eq!(bus.eval(&[Z, T, Z]), T);
        assert_eq!(bus.eval(&[T, Z, T]), T);
        assert_eq!(bus.eval(&[T, Z, F]), X);
        assert_eq!(bus.eval(&[X, Z, Z]), X);
    }

    #[test]
    fn test_mux_selects_data_input() {
        let mux = Multiplexer::new(2);
        assert_eq!(
            mux.input_names(),
            vec!["s0", "s1", "d0", "d1", "d2", "d3"]
        );
        // select = 0b10 -> d2
        assert_eq!(mux.eval(&[F, T, F, F, T, F]), T);
        assert_eq!(mux.eval(&[T, F, F, Z, T, F]), X);
    }

    #[test]
    fn test_mux_unknown_select() {
        let mux = Multiplexer::new(1);
        assert_eq!(mux.eval(&[X, T, T]), T);
        assert_eq!(mux.eval(&[X, T, F]), X);
        assert_eq!(mux.eval(&[Z, X, X]), X);
    }

    #[test]
    fn test_demux_routes_data() {
        let demux = Demultiplexer::new(2);
        assert_eq!(demux.output_names().len(), 4);
        assert_eq!(demux.eval(&[T, F, T]), vec![F, T, F, F]);
        assert_eq!(demux.eval(&[X, F, F]), vec![F, F, F, F]);
        assert_eq!(demux.eval(&[X, F, T]), vec![X, X, X, X]);
    }
}
