//! One simulation tick: produce a pulse and deliver it.
//!
//! Each tick runs two phases:
//!
//! 1. **Advance** -- the [`MasterClock`] moves simulated time forward and
//!    stamps the new [`ClockPulse`](habitat_types::ClockPulse).
//! 2. **Deliver** -- the [`PulseDispatcher`] hands the pulse to every
//!    listener in registration order, dropping those that are finished.
//!
//! The next tick cannot start before delivery returns, so every listener has
//! seen pulse `n` before any listener sees pulse `n + 1`.

use tracing::{debug, info};

use habitat_types::MarsTime;

use crate::clock::{ClockError, MasterClock};
use crate::dispatch::{DispatchError, ListenerId, PulseDispatcher};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// Pulse delivery failed.
    #[error("dispatch error: {source}")]
    Dispatch {
        /// The underlying dispatch error.
        #[from]
        source: DispatchError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// Id of the pulse produced by this tick.
    pub pulse_id: u64,
    /// Simulated time at the end of the tick.
    pub when: MarsTime,
    /// Millisols covered by the tick.
    pub elapsed: f64,
    /// Whether the tick crossed into a new sol.
    pub new_sol: bool,
    /// Listeners that were called.
    pub listeners_notified: usize,
    /// Throttled listeners that were not due yet.
    pub listeners_skipped: usize,
    /// Listeners dropped during this tick.
    pub deregistered: Vec<(ListenerId, String)>,
    /// Listeners still registered after the tick.
    pub listeners_remaining: usize,
}

/// The clock plus the listeners it drives.
#[derive(Debug)]
pub struct Simulation {
    /// The master clock.
    pub clock: MasterClock,
    /// Pulse delivery to registered listeners.
    pub dispatcher: PulseDispatcher,
}

impl Simulation {
    /// Bundle a clock with an empty dispatcher.
    pub const fn new(clock: MasterClock) -> Self {
        Self {
            clock,
            dispatcher: PulseDispatcher::new(),
        }
    }
}

/// Execute one tick covering `elapsed` millisols.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the clock refuses the step and
/// [`TickError::Dispatch`] if the pulse cannot be delivered.
pub fn run_tick(sim: &mut Simulation, elapsed: f64) -> Result<TickSummary, TickError> {
    // --- Phase 1: Advance ---
    let pulse = sim.clock.next_pulse(elapsed)?;
    if pulse.is_new_sol() {
        info!(
            sol = pulse.when().mission_sol(),
            pulse = pulse.id(),
            earth_time = %pulse.earth_time(),
            "New sol"
        );
    }

    // --- Phase 2: Deliver ---
    let report = sim.dispatcher.deliver(&pulse)?;
    debug!(
        pulse = pulse.id(),
        when = %pulse.when(),
        notified = report.notified,
        skipped = report.skipped,
        deregistered = report.deregistered.len(),
        "Tick delivered"
    );

    Ok(TickSummary {
        pulse_id: pulse.id(),
        when: *pulse.when(),
        elapsed: pulse.elapsed(),
        new_sol: pulse.is_new_sol(),
        listeners_notified: report.notified,
        listeners_skipped: report.skipped,
        deregistered: report.deregistered,
        listeners_remaining: sim.dispatcher.len(),
    })
}
