//! Master clock for the Habitat simulation.
//!
//! The clock is the single source of simulated time. Each call to
//! [`MasterClock::next_pulse`] moves time forward and returns the
//! [`ClockPulse`] describing that step: its id, elapsed millisols, the new
//! time, the Earth timestamp, and the largest time boundary crossed.
//!
//! # Design Principles
//!
//! - Pulse ids increase strictly and start at 1; overflow is an error, never
//!   a wrap.
//! - The Earth timestamp is derived from simulated time and the configured
//!   epoch. It never reads the wall clock, so two runs with the same
//!   configuration produce identical pulses.

use chrono::{DateTime, Utc};
use tracing::debug;

use habitat_types::{ClockPulse, MILLISOLS_PER_SOL, MarsTime};

use crate::config::TimeConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The requested step is negative or not a number.
    #[error("invalid elapsed time: {elapsed} millisols")]
    InvalidElapsed {
        /// The rejected step.
        elapsed: f64,
    },

    /// Pulse id would overflow.
    #[error("pulse id overflow: cannot advance beyond u64::MAX")]
    IdOverflow,

    /// The Earth timestamp of the new time does not fit in a `DateTime`.
    #[error("earth timestamp overflow at {when}")]
    EarthTimeOverflow {
        /// The simulated time that could not be converted.
        when: MarsTime,
    },

    /// Invalid time configuration (e.g. zero millisols per pulse).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// The authoritative simulation clock.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterClock {
    /// Simulated time at the end of the last pulse.
    now: MarsTime,

    /// Id of the last pulse produced (0 before the first pulse).
    last_pulse_id: u64,

    /// Earth instant matching the mission start.
    epoch: DateTime<Utc>,

    /// Width of a standard pulse in millisols.
    millisols_per_pulse: f64,
}

impl MasterClock {
    /// Create a clock from a time configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the start time is not a
    /// valid [`MarsTime`] or the pulse width is not a positive number.
    pub fn new(config: &TimeConfig, epoch: DateTime<Utc>) -> Result<Self, ClockError> {
        let now = MarsTime::new(config.start_sol, config.start_millisol).ok_or_else(|| {
            ClockError::InvalidConfig {
                reason: format!(
                    "start time sol {} millisol {} is out of range",
                    config.start_sol, config.start_millisol
                ),
            }
        })?;
        Self::from_parts(now, 0, epoch, config.millisols_per_pulse)
    }

    /// Create a clock from explicit parameters (useful for testing and
    /// state restoration).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `millisols_per_pulse` is not
    /// a positive number no larger than one sol.
    pub fn from_parts(
        now: MarsTime,
        last_pulse_id: u64,
        epoch: DateTime<Utc>,
        millisols_per_pulse: f64,
    ) -> Result<Self, ClockError> {
        if !millisols_per_pulse.is_finite()
            || millisols_per_pulse <= 0.0
            || millisols_per_pulse > MILLISOLS_PER_SOL
        {
            return Err(ClockError::InvalidConfig {
                reason: format!(
                    "millisols_per_pulse must be in (0, 1000], got {millisols_per_pulse}"
                ),
            });
        }
        Ok(Self {
            now,
            last_pulse_id,
            epoch,
            millisols_per_pulse,
        })
    }

    /// Advance simulated time by `elapsed` millisols and return the pulse.
    ///
    /// A zero step is allowed; it produces a pulse that carries no time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidElapsed`] for a negative or non-finite
    /// step, [`ClockError::IdOverflow`] when the id space is exhausted, and
    /// [`ClockError::EarthTimeOverflow`] when the Earth timestamp cannot be
    /// represented. The clock is unchanged on error.
    pub fn next_pulse(&mut self, elapsed: f64) -> Result<ClockPulse, ClockError> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(ClockError::InvalidElapsed { elapsed });
        }
        let id = self
            .last_pulse_id
            .checked_add(1)
            .ok_or(ClockError::IdOverflow)?;
        let pulse = ClockPulse::following(id, &self.now, elapsed, self.epoch).ok_or_else(|| {
            ClockError::EarthTimeOverflow {
                when: self.now.add_millisols(elapsed),
            }
        })?;

        self.now = *pulse.when();
        self.last_pulse_id = id;
        debug!(
            pulse = id,
            when = %self.now,
            elapsed,
            boundary = ?pulse.boundary(),
            "Clock pulse"
        );
        Ok(pulse)
    }

    /// Advance by one standard pulse width.
    ///
    /// # Errors
    ///
    /// See [`MasterClock::next_pulse`].
    pub fn standard_pulse(&mut self) -> Result<ClockPulse, ClockError> {
        self.next_pulse(self.millisols_per_pulse)
    }

    /// Return the simulated time at the end of the last pulse.
    pub const fn now(&self) -> MarsTime {
        self.now
    }

    /// Return the id of the last pulse produced (0 before the first).
    pub const fn last_pulse_id(&self) -> u64 {
        self.last_pulse_id
    }

    /// Return the Earth instant of the mission start.
    pub const fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Return the standard pulse width in millisols.
    pub const fn millisols_per_pulse(&self) -> f64 {
        self.millisols_per_pulse
    }

    /// Return the Earth timestamp of the current simulated time.
    pub fn earth_time(&self) -> Option<DateTime<Utc>> {
        self.now.earth_time(self.epoch)
    }
}
