//! Bounded simulation run loop.
//!
//! This module provides [`run_simulation`], which drives [`run_tick`] with
//! the configured pulse width until one of these holds:
//!
//! - **Sol limit**: `max_sols` sols of simulated time have passed
//! - **Pulse limit**: `max_pulses` pulses have been produced
//! - **No listeners**: every listener has deregistered itself
//!
//! Simulated time never waits on the wall clock; a run is as fast as its
//! listeners.
//!
//! [`run_tick`]: crate::tick::run_tick

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use habitat_types::MILLISOLS_PER_SOL;

use crate::config::SimulationBoundsConfig;
use crate::tick::{self, Simulation, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_sols` limit.
    MaxSolsReached,
    /// Reached the configured `max_pulses` limit.
    MaxPulsesReached,
    /// No listener is left to deliver pulses to.
    NoListeners,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of pulses produced.
    pub total_pulses: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, sim: &Simulation);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _sim: &Simulation) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// Each tick covers the clock's standard pulse width. With both limits at
/// zero the run lasts until the last listener deregisters.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub fn run_simulation(
    sim: &mut Simulation,
    bounds: &SimulationBoundsConfig,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let started = sim.clock.now();
    let sol_limit = f64::from(bounds.max_sols) * MILLISOLS_PER_SOL;
    let step = sim.clock.millisols_per_pulse();
    let mut last_summary: Option<TickSummary> = None;
    let mut total_pulses: u64 = 0;

    info!(
        start = %started,
        max_sols = bounds.max_sols,
        max_pulses = bounds.max_pulses,
        millisols_per_pulse = step,
        listeners = sim.dispatcher.len(),
        "Simulation starting"
    );

    loop {
        // --- Check listeners (before tick) ---
        if sim.dispatcher.is_empty() {
            info!(total_pulses, "No listeners left");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::NoListeners,
                final_summary: last_summary,
                total_pulses,
            });
        }

        // --- Execute tick ---
        let summary = tick::run_tick(sim, step)?;
        total_pulses = total_pulses.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, sim);

        // --- Check limits (after tick) ---
        if bounds.max_pulses > 0 && total_pulses >= bounds.max_pulses {
            info!(
                pulse = summary.pulse_id,
                max_pulses = bounds.max_pulses,
                "Pulse limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxPulsesReached,
                final_summary: Some(summary),
                total_pulses,
            });
        }
        if bounds.max_sols > 0 && summary.when.millisols_since(&started) >= sol_limit {
            info!(
                when = %summary.when,
                max_sols = bounds.max_sols,
                "Sol limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxSolsReached,
                final_summary: Some(summary),
                total_pulses,
            });
        }

        last_summary = Some(summary);
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_pulses = result.total_pulses,
        final_pulse = result.final_summary.as_ref().map(|s| s.pulse_id),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            pulse = summary.pulse_id,
            when = %summary.when,
            listeners = summary.listeners_remaining,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_types::{ClockPulse, Temporal};

    use super::*;
    use crate::clock::MasterClock;
    use crate::config::{TimeConfig, WorldConfig};

    /// Stays registered for a fixed number of pulses.
    struct Countdown(u32);

    impl Temporal for Countdown {
        fn advance(&mut self, _pulse: &ClockPulse) -> bool {
            self.0 = self.0.saturating_sub(1);
            self.0 > 0
        }
    }

    fn make_simulation(step: f64) -> Simulation {
        let time = TimeConfig {
            millisols_per_pulse: step,
            ..TimeConfig::default()
        };
        let clock = MasterClock::new(&time, WorldConfig::default().earth_epoch).unwrap();
        Simulation::new(clock)
    }

    fn bounds(max_sols: u32, max_pulses: u64) -> SimulationBoundsConfig {
        SimulationBoundsConfig {
            max_sols,
            max_pulses,
            ..SimulationBoundsConfig::default()
        }
    }

    #[test]
    fn bounded_by_max_pulses() {
        let mut sim = make_simulation(1.0);
        sim.dispatcher.register("forever", Countdown(u32::MAX));
        let result = run_simulation(&mut sim, &bounds(0, 5), &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxPulsesReached);
        assert_eq!(result.total_pulses, 5);
        assert_eq!(result.final_summary.unwrap().pulse_id, 5);
    }

    #[test]
    fn bounded_by_max_sols() {
        let mut sim = make_simulation(10.0);
        sim.dispatcher.register("forever", Countdown(u32::MAX));
        let result = run_simulation(&mut sim, &bounds(2, 0), &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxSolsReached);
        assert_eq!(result.total_pulses, 200);
        assert_eq!(sim.clock.now().mission_sol(), 3);
    }

    #[test]
    fn stops_when_listeners_are_gone() {
        let mut sim = make_simulation(1.0);
        sim.dispatcher.register("brief", Countdown(3));
        let result = run_simulation(&mut sim, &bounds(0, 0), &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::NoListeners);
        assert_eq!(result.total_pulses, 3);
        let last = result.final_summary.unwrap();
        assert_eq!(last.deregistered.len(), 1);
    }

    #[test]
    fn empty_dispatcher_runs_no_ticks() {
        let mut sim = make_simulation(1.0);
        let result = run_simulation(&mut sim, &bounds(1, 0), &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::NoListeners);
        assert_eq!(result.total_pulses, 0);
        assert!(result.final_summary.is_none());
    }

    #[test]
    fn callback_sees_every_tick() {
        struct Collect(Vec<u64>);
        impl TickCallback for Collect {
            fn on_tick(&mut self, summary: &TickSummary, _sim: &Simulation) {
                self.0.push(summary.pulse_id);
            }
        }

        let mut sim = make_simulation(1.0);
        sim.dispatcher.register("forever", Countdown(u32::MAX));
        let mut collect = Collect(Vec::new());
        run_simulation(&mut sim, &bounds(0, 4), &mut collect).unwrap();
        assert_eq!(collect.0, vec![1, 2, 3, 4]);
    }

    #[test]
    fn end_reason_is_reported_by_name() {
        let json = serde_json::to_string(&SimulationEndReason::MaxSolsReached).unwrap();
        assert_eq!(json, "\"MaxSolsReached\"");
    }
}
