//! A rover traverse watched by the stall detector.
//!
//! The rover drives a list of waypoints and then returns home. While a dust
//! storm is overhead it cannot move; the [`StuckWatchdog`] notices the
//! missing progress and escalates: a reroute (never possible out here), then
//! skipping the current waypoint, then aborting the traverse and heading
//! home.

use std::collections::VecDeque;
use std::ops::Range;

use tracing::{debug, info};

use habitat_types::{ClockPulse, MarsTime, Temporal};
use habitat_world::{
    Coordinates, Distance, RecoveryAction, RecoveryError, RecoveryHandler, StuckWatchdog,
    WatchdogState,
};

/// Distance (km) at which a goal counts as reached.
const ARRIVAL_KM: f64 = 0.001;

// -----------------------------------------------------------------------
// Route
// -----------------------------------------------------------------------

/// Remaining waypoints; the recovery side of the traverse.
#[derive(Debug)]
struct Route {
    home: Coordinates,
    waypoints: VecDeque<Coordinates>,
    skipped: u32,
    aborted: bool,
}

impl Route {
    /// The next waypoint, or home once none are left.
    fn goal(&self) -> Coordinates {
        self.waypoints.front().copied().unwrap_or(self.home)
    }
}

impl RecoveryHandler for Route {
    fn reroute(&mut self) -> Result<(), RecoveryError> {
        Err(RecoveryError::Failed {
            action: RecoveryAction::Reroute,
            reason: String::from("no passable route around the storm"),
        })
    }

    fn skip(&mut self) -> Result<(), RecoveryError> {
        if self.waypoints.pop_front().is_none() {
            return Err(RecoveryError::Failed {
                action: RecoveryAction::Skip,
                reason: String::from("already heading home"),
            });
        }
        self.skipped = self.skipped.saturating_add(1);
        Ok(())
    }

    fn abort(&mut self) -> Result<(), RecoveryError> {
        self.waypoints.clear();
        self.aborted = true;
        Ok(())
    }
}

// -----------------------------------------------------------------------
// Traverse
// -----------------------------------------------------------------------

/// A rover driving a fixed set of waypoints.
#[derive(Debug)]
pub struct RoverTraverse {
    name: String,
    position: Coordinates,
    /// Kilometres per millisol.
    speed: f64,
    route: Route,
    storm: Option<Range<f64>>,
    watchdog: StuckWatchdog,
    state: WatchdogState,
    legs: u32,
    visited: u32,
    finished: bool,
}

impl RoverTraverse {
    /// Create a traverse leaving from `home`.
    pub fn new(
        name: impl Into<String>,
        home: Coordinates,
        waypoints: impl IntoIterator<Item = Coordinates>,
        speed: f64,
        watchdog: StuckWatchdog,
    ) -> Self {
        let name = name.into();
        let state = WatchdogState::new(format!("{name} leg 1"));
        Self {
            name,
            position: home,
            speed: speed.max(0.0),
            route: Route {
                home,
                waypoints: waypoints.into_iter().collect(),
                skipped: 0,
                aborted: false,
            },
            storm: None,
            watchdog,
            state,
            legs: 1,
            visited: 0,
            finished: false,
        }
    }

    /// Keep the rover from moving between `from` and `until`.
    #[must_use]
    pub fn with_storm(mut self, from: &MarsTime, until: &MarsTime) -> Self {
        self.storm = Some(from.total_millisols()..until.total_millisols());
        self
    }

    /// Current position.
    pub const fn position(&self) -> Coordinates {
        self.position
    }

    /// Number of waypoints reached.
    pub const fn visited(&self) -> u32 {
        self.visited
    }

    /// Number of waypoints given up on.
    pub const fn skipped(&self) -> u32 {
        self.route.skipped
    }

    /// Whether the traverse was aborted.
    pub const fn is_aborted(&self) -> bool {
        self.route.aborted
    }

    /// Whether the rover is back home with nothing left to do.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Watchdog state of the current leg.
    pub const fn watchdog_state(&self) -> &WatchdogState {
        &self.state
    }

    fn storm_at(&self, when: &MarsTime) -> bool {
        self.storm
            .as_ref()
            .is_some_and(|window| window.contains(&when.total_millisols()))
    }

    /// Drive up to `reach` km towards the goal; snaps onto the goal when it
    /// is within reach.
    fn drive(&mut self, goal: Coordinates, reach: f64) {
        let remaining = self.position.distance_to(&goal);
        if remaining > reach + ARRIVAL_KM {
            let bearing = self.position.bearing_to(&goal);
            self.position = self.position.travel(bearing, reach);
            return;
        }
        self.position = goal;
        if self.route.waypoints.pop_front().is_none() {
            self.finished = true;
            info!(
                rover = %self.name,
                visited = self.visited,
                skipped = self.route.skipped,
                aborted = self.route.aborted,
                "Rover back home"
            );
            return;
        }
        self.visited = self.visited.saturating_add(1);
        self.legs = self.legs.saturating_add(1);
        self.state = WatchdogState::new(format!("{} leg {}", self.name, self.legs));
        debug!(rover = %self.name, visited = self.visited, "Waypoint reached");
    }
}

impl Temporal for RoverTraverse {
    fn advance(&mut self, pulse: &ClockPulse) -> bool {
        if self.finished {
            return false;
        }
        let reach = if self.storm_at(pulse.when()) {
            0.0
        } else {
            self.speed * pulse.elapsed()
        };
        self.drive(self.route.goal(), reach);
        if self.finished {
            return false;
        }

        let goal = self.route.goal();
        let waypoints_left = self.route.waypoints.len();
        self.watchdog.check_and_recover(
            &mut self.state,
            &self.position,
            &goal,
            pulse.when(),
            &mut self.route,
            &self.name,
        );
        // Skip and abort change the goal; distances to the old one no longer
        // measure progress.
        if self.route.waypoints.len() != waypoints_left {
            self.state.rebase();
        }
        true
    }
}
