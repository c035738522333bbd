//! Clock generator.
//!
//! A clock is a square wave described by its period, duty cycle and phase.
//! Its level and next transition are computed analytically from absolute
//! simulated time instead of by accumulating elapsed deltas, so the wave
//! never drifts and picks up correctly after the simulation was paused.
//!
//! ```text
//!          phase
//!        |<---->|<-- on -->|<-- off -->|<-- on -->|
//! level  ______/‾‾‾‾‾‾‾‾‾‾‾\___________/‾‾‾‾‾‾‾‾‾‾‾\__
//!               |<------- period ----->|
//! ```

use crate::logic::LogicValue;
use crate::timeline::SimTime;

/// Default period in milliseconds.
pub const DEFAULT_PERIOD: u64 = 1000;

/// Default duty cycle in percent.
pub const DEFAULT_DUTY_CYCLE: u8 = 50;

/// Square-wave clock source.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    /// Full period in milliseconds
    period: u64,
    /// Percentage of the period spent high
    duty_cycle: u8,
    /// Offset of the first rising edge in milliseconds
    phase: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD, DEFAULT_DUTY_CYCLE, 0)
    }
}

impl Clock {
    /// Create a clock. The period is at least 1 ms and the duty cycle at most 100%.
    pub fn new(period: u64, duty_cycle: u8, phase: u64) -> Self {
        let period = period.max(1);
        Self {
            period,
            duty_cycle: duty_cycle.min(100),
            phase: phase % period,
        }
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn duty_cycle(&self) -> u8 {
        self.duty_cycle
    }

    pub fn phase(&self) -> u64 {
        self.phase
    }

    /// Time spent high in each period.
    pub fn on_duration(&self) -> u64 {
        // Never exceeds the period, so the narrowing cannot truncate.
        (u128::from(self.period) * u128::from(self.duty_cycle) / 100) as u64
    }

    /// Level at `time` and the instant of the next transition, if any.
    ///
    /// A duty cycle that never switches (0% or 100%) has no next transition,
    /// and neither has a transition that would fall past the end of time.
    pub fn state_at(&self, time: SimTime) -> (LogicValue, Option<SimTime>) {
        let on = self.on_duration();
        if on == 0 {
            return (LogicValue::False, None);
        }
        if on >= self.period {
            return (LogicValue::True, None);
        }

        // Position within the current period, shifted by the phase.
        let t = time.as_millis();
        let local = ((u128::from(t) + u128::from(self.period) - u128::from(self.phase))
            % u128::from(self.period)) as u64;

        let (level, remaining) = if local < on {
            (LogicValue::True, on - local)
        } else {
            (LogicValue::False, self.period - local)
        };
        (level, t.checked_add(remaining).map(SimTime))
    }
}
