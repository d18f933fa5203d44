//! Staged recovery for goal-seeking activities that stop making progress.
//!
//! Any long-running activity that can report a scalar "distance to goal"
//! (a rover traverse, a walk to a site) can be monitored. The watchdog
//! samples that distance on a fixed cadence and counts the sample intervals
//! that pass without progress. Three escalating thresholds map to three
//! recovery stages:
//!
//! 1. **Reroute** -- plan a different path to the same goal
//! 2. **Skip** -- give up on the current sub-goal and move to the next one
//! 3. **Abort** -- abandon the activity and return home
//!
//! Each stage fires at most once per episode and stages only move forward.
//! The streak restarts after every trigger and every progress sample, and the
//! next stage fires once the streak covers the gap between its threshold and
//! the previous one. A progress sample does **not** roll back the stage
//! already reached: one good sample is not evidence the underlying problem
//! has gone away.
//!
//! Time spent in a cooldown still counts as stalled when the sample after it
//! shows no progress. With a cooldown at least as long as the widest
//! threshold gap (in sample intervals), as the defaults are, the first
//! stalled check after a cooldown escalates.
//!
//! Every recovery action is followed by a cooldown (base duration plus a
//! random jitter drawn from the watchdog's own seeded RNG) so that many
//! independently monitored activities do not retry in lockstep.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use habitat_types::MarsTime;

use crate::coordinates::Distance;
use crate::error::{RecoveryError, WatchdogError};

/// Highest recovery stage (abort).
const MAX_STAGE: u8 = 3;

// ---------------------------------------------------------------------------
// Actions and handlers
// ---------------------------------------------------------------------------

/// One of the three escalating recovery actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecoveryAction {
    /// Plan a new route to the current goal (stage 1).
    Reroute,
    /// Skip the current sub-goal (stage 2).
    Skip,
    /// Abort the activity and return (stage 3).
    Abort,
}

impl RecoveryAction {
    /// Map a recovery stage (1..=3) to its action.
    pub const fn for_stage(stage: u8) -> Option<Self> {
        match stage {
            1 => Some(Self::Reroute),
            2 => Some(Self::Skip),
            3 => Some(Self::Abort),
            _ => None,
        }
    }
}

impl core::fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Reroute => "reroute",
            Self::Skip => "skip",
            Self::Abort => "abort",
        };
        f.write_str(name)
    }
}

/// The activity-specific side of recovery.
///
/// Implementations report failure through the returned `Result`; the
/// watchdog logs it and keeps monitoring.
pub trait RecoveryHandler {
    /// Plan a different route to the current goal.
    fn reroute(&mut self) -> Result<(), RecoveryError>;

    /// Abandon the current sub-goal and move on to the next.
    fn skip(&mut self) -> Result<(), RecoveryError>;

    /// Abandon the activity altogether.
    fn abort(&mut self) -> Result<(), RecoveryError>;
}

/// A [`RecoveryHandler`] built from three closures.
pub struct RecoveryCallbacks<R, S, A>
where
    R: FnMut() -> Result<(), RecoveryError>,
    S: FnMut() -> Result<(), RecoveryError>,
    A: FnMut() -> Result<(), RecoveryError>,
{
    on_reroute: R,
    on_skip: S,
    on_abort: A,
}

impl<R, S, A> RecoveryCallbacks<R, S, A>
where
    R: FnMut() -> Result<(), RecoveryError>,
    S: FnMut() -> Result<(), RecoveryError>,
    A: FnMut() -> Result<(), RecoveryError>,
{
    /// Bundle the three recovery callbacks.
    pub const fn new(on_reroute: R, on_skip: S, on_abort: A) -> Self {
        Self {
            on_reroute,
            on_skip,
            on_abort,
        }
    }
}

impl<R, S, A> RecoveryHandler for RecoveryCallbacks<R, S, A>
where
    R: FnMut() -> Result<(), RecoveryError>,
    S: FnMut() -> Result<(), RecoveryError>,
    A: FnMut() -> Result<(), RecoveryError>,
{
    fn reroute(&mut self) -> Result<(), RecoveryError> {
        (self.on_reroute)()
    }

    fn skip(&mut self) -> Result<(), RecoveryError> {
        (self.on_skip)()
    }

    fn abort(&mut self) -> Result<(), RecoveryError> {
        (self.on_abort)()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning for a [`StuckWatchdog`]. Durations are in millisols.
///
/// Missing fields take their [`Default`] values when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Minimum simulated time between two distance samples.
    pub sample_interval: f64,
    /// Smallest decrease in distance that counts as progress.
    pub progress_epsilon: f64,
    /// Stalled sample intervals that trigger stages 1, 2 and 3, counted
    /// from the start of the episode. After a trigger or a progress sample
    /// the next stage needs only the gap to the previous threshold.
    pub thresholds: [u32; 3],
    /// Base cooldown after every recovery action.
    pub cooldown: f64,
    /// Upper bound of the random extra cooldown.
    pub cooldown_jitter: f64,
    /// Seed for the jitter RNG.
    pub seed: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            sample_interval: 5.0,
            progress_epsilon: 0.01,
            thresholds: [3, 6, 9],
            cooldown: 20.0,
            cooldown_jitter: 5.0,
            seed: 42,
        }
    }
}

impl WatchdogConfig {
    /// Check the configuration for values the watchdog cannot work with.
    pub fn validate(&self) -> Result<(), WatchdogError> {
        let non_negative = [
            ("sample_interval", self.sample_interval),
            ("progress_epsilon", self.progress_epsilon),
            ("cooldown", self.cooldown),
            ("cooldown_jitter", self.cooldown_jitter),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(WatchdogError::InvalidConfig {
                    reason: format!("{name} must be a non-negative number, got {value}"),
                });
            }
        }
        let [first, second, third] = self.thresholds;
        if first == 0 || first >= second || second >= third {
            return Err(WatchdogError::InvalidConfig {
                reason: format!(
                    "thresholds must be strictly increasing and start at 1 or more, got {:?}",
                    self.thresholds
                ),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Per-activity state
// ---------------------------------------------------------------------------

/// Monitoring state for one activity (one watchdog episode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchdogState {
    label: String,
    last_sample_time: Option<f64>,
    last_distance: Option<f64>,
    no_progress_streak: u32,
    recovery_stage: u8,
    cooldown_until: f64,
}

impl WatchdogState {
    /// Start a fresh episode for the activity named `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            last_sample_time: None,
            last_distance: None,
            no_progress_streak: 0,
            recovery_stage: 0,
            cooldown_until: 0.0,
        }
    }

    /// Return the activity label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Return the time of the last accepted sample (total millisols).
    pub const fn last_sample_time(&self) -> Option<f64> {
        self.last_sample_time
    }

    /// Return the distance recorded by the last accepted sample.
    pub const fn last_distance(&self) -> Option<f64> {
        self.last_distance
    }

    /// Return the stalled sample intervals since the last trigger or progress.
    pub const fn no_progress_streak(&self) -> u32 {
        self.no_progress_streak
    }

    /// Return the recovery stage reached so far (0 = none, 3 = aborted).
    pub const fn recovery_stage(&self) -> u8 {
        self.recovery_stage
    }

    /// Return the end of the current cooldown (total millisols).
    pub const fn cooldown_until(&self) -> f64 {
        self.cooldown_until
    }

    /// Forget the distance baseline, e.g. when the goal changes.
    ///
    /// The next sample records a new baseline; the stage reached stays.
    pub const fn rebase(&mut self) {
        self.last_distance = None;
        self.no_progress_streak = 0;
    }

    /// Whether every recovery stage has been used up.
    pub const fn is_exhausted(&self) -> bool {
        self.recovery_stage >= MAX_STAGE
    }
}

// ---------------------------------------------------------------------------
// Watchdog
// ---------------------------------------------------------------------------

/// Stall detector shared by any number of monitored activities.
///
/// Holds only the policy and the jitter RNG; per-activity progress lives in
/// [`WatchdogState`].
#[derive(Debug, Clone)]
pub struct StuckWatchdog {
    config: WatchdogConfig,
    rng: SmallRng,
}

impl StuckWatchdog {
    /// Create a watchdog from a validated configuration.
    pub fn new(config: WatchdogConfig) -> Result<Self, WatchdogError> {
        config.validate()?;
        let rng = SmallRng::seed_from_u64(config.seed);
        Ok(Self { config, rng })
    }

    /// Return the active configuration.
    pub const fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Sample progress and escalate recovery if the activity is stuck.
    ///
    /// Returns `true` only when a recovery action was triggered by this
    /// call. Calls inside the cooldown window or before the next sampling
    /// slot return `false` without touching the streak.
    pub fn check_and_recover<P: Distance>(
        &mut self,
        state: &mut WatchdogState,
        current: &P,
        target: &P,
        now: &MarsTime,
        handler: &mut dyn RecoveryHandler,
        tag: &str,
    ) -> bool {
        let t = now.total_millisols();

        if t < state.cooldown_until {
            return false;
        }
        if let Some(last) = state.last_sample_time
            && t - last < self.config.sample_interval
        {
            return false;
        }

        let distance = current.distance_to(target);
        if !distance.is_finite() {
            warn!(tag, label = %state.label, "Distance to goal is not finite; sample ignored");
            return false;
        }
        let elapsed = state.last_sample_time.map_or(0.0, |last| t - last);
        state.last_sample_time = Some(t);

        let Some(previous) = state.last_distance.replace(distance) else {
            debug!(tag, label = %state.label, distance, "Watchdog baseline recorded");
            return false;
        };

        if previous - distance >= self.config.progress_epsilon {
            // Progress resets the streak; the stage reached stays.
            state.no_progress_streak = 0;
            return false;
        }
        state.no_progress_streak = state
            .no_progress_streak
            .saturating_add(self.intervals_in(elapsed));

        let next_stage = state.recovery_stage.saturating_add(1);
        let Some(action) = RecoveryAction::for_stage(next_stage) else {
            return false;
        };
        if state.no_progress_streak < self.stage_gap(state.recovery_stage) {
            return false;
        }

        info!(
            tag,
            label = %state.label,
            %action,
            stage = next_stage,
            streak = state.no_progress_streak,
            distance,
            "Activity stuck; escalating recovery"
        );
        let outcome = match action {
            RecoveryAction::Reroute => handler.reroute(),
            RecoveryAction::Skip => handler.skip(),
            RecoveryAction::Abort => handler.abort(),
        };
        if let Err(error) = outcome {
            warn!(tag, label = %state.label, %action, %error, "Recovery action failed");
        }

        state.recovery_stage = next_stage;
        state.no_progress_streak = 0;
        state.cooldown_until = t + self.config.cooldown + self.jitter();
        true
    }

    /// Streak needed to move on from `stage`: the distance from the previous
    /// threshold to the next one.
    fn stage_gap(&self, stage: u8) -> u32 {
        let thresholds = &self.config.thresholds;
        let Some(next) = thresholds.get(usize::from(stage)).copied() else {
            return u32::MAX;
        };
        let previous = stage
            .checked_sub(1)
            .and_then(|index| thresholds.get(usize::from(index)))
            .copied()
            .unwrap_or(0);
        next.saturating_sub(previous).max(1)
    }

    /// Whole sample intervals in `elapsed` millisols, at least one.
    // The cast is range checked below; the value is a non-negative whole number.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn intervals_in(&self, elapsed: f64) -> u32 {
        let interval = self.config.sample_interval;
        if interval <= 0.0 {
            return 1;
        }
        // Tolerance keeps an exact multiple from flooring one short.
        let intervals = (elapsed / interval + 1e-9).floor();
        if intervals >= f64::from(u32::MAX) {
            return u32::MAX;
        }
        intervals.max(1.0) as u32
    }

    fn jitter(&mut self) -> f64 {
        if self.config.cooldown_jitter > 0.0 {
            self.rng.random_range(0.0..=self.config.cooldown_jitter)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A one-dimensional position; distance is the absolute difference.
    #[derive(Debug, Clone, Copy)]
    struct Milepost(f64);

    impl Distance for Milepost {
        fn distance_to(&self, other: &Self) -> f64 {
            (self.0 - other.0).abs()
        }
    }

    #[derive(Default)]
    struct Recorder {
        actions: Vec<RecoveryAction>,
        fail: bool,
    }

    impl Recorder {
        fn record(&mut self, action: RecoveryAction) -> Result<(), RecoveryError> {
            self.actions.push(action);
            if self.fail {
                Err(RecoveryError::Failed {
                    action,
                    reason: String::from("no path"),
                })
            } else {
                Ok(())
            }
        }
    }

    impl RecoveryHandler for Recorder {
        fn reroute(&mut self) -> Result<(), RecoveryError> {
            self.record(RecoveryAction::Reroute)
        }
        fn skip(&mut self) -> Result<(), RecoveryError> {
            self.record(RecoveryAction::Skip)
        }
        fn abort(&mut self) -> Result<(), RecoveryError> {
            self.record(RecoveryAction::Abort)
        }
    }

    fn fast_config() -> WatchdogConfig {
        WatchdogConfig {
            sample_interval: 1.0,
            progress_epsilon: 0.5,
            thresholds: [1, 2, 3],
            cooldown: 10.0,
            cooldown_jitter: 0.0,
            seed: 7,
        }
    }

    fn at(total: f64) -> MarsTime {
        MarsTime::from_total_millisols(total)
    }

    const GOAL: Milepost = Milepost(100.0);

    fn check(
        dog: &mut StuckWatchdog,
        state: &mut WatchdogState,
        pos: f64,
        t: f64,
        handler: &mut Recorder,
    ) -> bool {
        dog.check_and_recover(state, &Milepost(pos), &GOAL, &at(t), handler, "test")
    }

    #[test]
    fn first_sample_only_records_baseline() {
        let mut dog = StuckWatchdog::new(fast_config()).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder::default();
        assert!(!check(&mut dog, &mut state, 0.0, 0.0, &mut rec));
        assert_eq!(state.last_distance(), Some(100.0));
        assert_eq!(state.no_progress_streak(), 0);
        assert!(rec.actions.is_empty());
    }

    #[test]
    fn samples_are_throttled_to_interval() {
        let mut config = fast_config();
        config.sample_interval = 5.0;
        let mut dog = StuckWatchdog::new(config).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder::default();
        check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
        assert!(!check(&mut dog, &mut state, 0.0, 4.0, &mut rec));
        assert_eq!(state.no_progress_streak(), 0);
        assert_eq!(state.last_sample_time(), Some(0.0));
    }

    #[test]
    fn progress_resets_streak() {
        let mut config = fast_config();
        config.thresholds = [5, 6, 7];
        let mut dog = StuckWatchdog::new(config).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder::default();
        check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
        check(&mut dog, &mut state, 0.1, 1.0, &mut rec);
        check(&mut dog, &mut state, 0.2, 2.0, &mut rec);
        assert_eq!(state.no_progress_streak(), 2);
        check(&mut dog, &mut state, 10.0, 3.0, &mut rec);
        assert_eq!(state.no_progress_streak(), 0);
    }

    #[test]
    fn decrease_exactly_epsilon_counts_as_progress() {
        let mut dog = StuckWatchdog::new(fast_config()).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder::default();
        check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
        assert!(!check(&mut dog, &mut state, 0.5, 1.0, &mut rec));
        assert_eq!(state.no_progress_streak(), 0);
    }

    #[test]
    fn escalation_respects_cooldown_and_never_regresses() {
        let mut config = fast_config();
        config.thresholds = [1, 2, 4];
        let mut dog = StuckWatchdog::new(config).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder::default();

        check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
        // Stage 1 fires on the first stalled sample.
        assert!(check(&mut dog, &mut state, 0.0, 1.0, &mut rec));
        assert_eq!(state.recovery_stage(), 1);
        assert_eq!(state.no_progress_streak(), 0);

        // Inside the cooldown window (until 11.0): nothing happens.
        assert!(!check(&mut dog, &mut state, 0.0, 2.0, &mut rec));
        assert!(!check(&mut dog, &mut state, 0.0, 10.5, &mut rec));
        assert_eq!(state.no_progress_streak(), 0);

        // After the cooldown, still stalled: exactly one more escalation.
        assert!(check(&mut dog, &mut state, 0.0, 11.0, &mut rec));
        assert_eq!(state.recovery_stage(), 2);
        assert!(!check(&mut dog, &mut state, 0.0, 12.0, &mut rec));

        // Progress resets the streak but keeps stage 2.
        assert!(!check(&mut dog, &mut state, 50.0, 21.0, &mut rec));
        assert_eq!(state.no_progress_streak(), 0);
        assert_eq!(state.recovery_stage(), 2);

        // Stage 3 needs the gap between thresholds 2 and 4, not all four.
        assert!(!check(&mut dog, &mut state, 50.0, 22.0, &mut rec));
        assert!(check(&mut dog, &mut state, 50.0, 23.0, &mut rec));
        assert_eq!(state.recovery_stage(), 3);
        assert!(state.is_exhausted());

        // Nothing left to escalate to.
        assert!(!check(&mut dog, &mut state, 50.0, 40.0, &mut rec));
        assert_eq!(
            rec.actions,
            vec![RecoveryAction::Reroute, RecoveryAction::Skip, RecoveryAction::Abort]
        );
    }

    #[test]
    fn default_config_escalates_once_per_cooldown() {
        let mut dog = StuckWatchdog::new(WatchdogConfig::default()).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder::default();

        // Sampled every 5 millisols; three stalled intervals trigger stage 1.
        check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
        assert!(!check(&mut dog, &mut state, 0.0, 5.0, &mut rec));
        assert!(!check(&mut dog, &mut state, 0.0, 10.0, &mut rec));
        assert!(check(&mut dog, &mut state, 0.0, 15.0, &mut rec));
        let until = state.cooldown_until();
        assert!((35.0..=40.0).contains(&until), "cooldown_until = {until}");

        // Twice inside the cooldown: no action.
        assert!(!check(&mut dog, &mut state, 0.0, 20.0, &mut rec));
        assert!(!check(&mut dog, &mut state, 0.0, 30.0, &mut rec));
        assert_eq!(state.recovery_stage(), 1);

        // First stalled check after the cooldown advances exactly one stage.
        assert!(check(&mut dog, &mut state, 0.0, 45.0, &mut rec));
        assert_eq!(state.recovery_stage(), 2);
        assert!(!check(&mut dog, &mut state, 0.0, 50.0, &mut rec));

        // Progress keeps stage 2; three fresh stalled samples reach stage 3.
        assert!(!check(&mut dog, &mut state, 10.0, 75.0, &mut rec));
        assert_eq!(state.no_progress_streak(), 0);
        assert_eq!(state.recovery_stage(), 2);
        assert!(!check(&mut dog, &mut state, 10.0, 80.0, &mut rec));
        assert!(!check(&mut dog, &mut state, 10.0, 85.0, &mut rec));
        assert!(check(&mut dog, &mut state, 10.0, 90.0, &mut rec));
        assert_eq!(state.recovery_stage(), 3);
    }

    #[test]
    fn rebase_drops_the_old_distance_but_keeps_the_stage() {
        let mut dog = StuckWatchdog::new(fast_config()).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder::default();
        check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
        assert!(check(&mut dog, &mut state, 0.0, 1.0, &mut rec));

        state.rebase();
        assert_eq!(state.last_distance(), None);
        assert_eq!(state.recovery_stage(), 1);

        // The first sample against the new goal is a baseline, not a stall.
        assert!(!check(&mut dog, &mut state, 0.0, 11.0, &mut rec));
        assert_eq!(state.no_progress_streak(), 0);
        assert_eq!(rec.actions, vec![RecoveryAction::Reroute]);
    }

    #[test]
    fn failed_action_still_advances_and_allows_escalation() {
        let mut dog = StuckWatchdog::new(fast_config()).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder {
            fail: true,
            ..Recorder::default()
        };
        check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
        assert!(check(&mut dog, &mut state, 0.0, 1.0, &mut rec));
        assert!(check(&mut dog, &mut state, 0.0, 11.0, &mut rec));
        assert_eq!(state.recovery_stage(), 2);
        assert_eq!(rec.actions.len(), 2);
    }

    #[test]
    fn cooldown_jitter_is_bounded() {
        let mut config = fast_config();
        config.cooldown_jitter = 4.0;
        let mut dog = StuckWatchdog::new(config).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut rec = Recorder::default();
        check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
        assert!(check(&mut dog, &mut state, 0.0, 1.0, &mut rec));
        let until = state.cooldown_until();
        assert!((11.0..=15.0).contains(&until), "cooldown_until = {until}");
    }

    #[test]
    fn same_seed_gives_same_cooldowns() {
        let mut config = fast_config();
        config.cooldown_jitter = 4.0;
        let run = |config: WatchdogConfig| {
            let mut dog = StuckWatchdog::new(config).unwrap();
            let mut state = WatchdogState::new("rover");
            let mut rec = Recorder::default();
            check(&mut dog, &mut state, 0.0, 0.0, &mut rec);
            check(&mut dog, &mut state, 0.0, 1.0, &mut rec);
            state.cooldown_until()
        };
        let a = run(config.clone());
        let b = run(config);
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn closure_callbacks_are_invoked() {
        let mut dog = StuckWatchdog::new(fast_config()).unwrap();
        let mut state = WatchdogState::new("rover");
        let mut reroutes = 0_u32;
        {
            let mut handler = RecoveryCallbacks::new(
                || {
                    reroutes = reroutes.saturating_add(1);
                    Ok(())
                },
                || Err(RecoveryError::Unsupported { action: RecoveryAction::Skip }),
                || Ok(()),
            );
            let here = Milepost(0.0);
            dog.check_and_recover(&mut state, &here, &GOAL, &at(0.0), &mut handler, "cb");
            assert!(dog.check_and_recover(&mut state, &here, &GOAL, &at(1.0), &mut handler, "cb"));
        }
        assert_eq!(reroutes, 1);
    }

    #[test]
    fn invalid_thresholds_rejected() {
        let mut config = fast_config();
        config.thresholds = [3, 3, 4];
        assert!(StuckWatchdog::new(config).is_err());

        let mut config = fast_config();
        config.thresholds = [0, 1, 2];
        assert!(StuckWatchdog::new(config).is_err());

        let mut config = fast_config();
        config.cooldown = -1.0;
        assert!(StuckWatchdog::new(config).is_err());
    }

    #[test]
    fn state_survives_serialization() {
        let mut state = WatchdogState::new("rover");
        state.recovery_stage = 2;
        state.no_progress_streak = 4;
        let json = serde_json::to_string(&state).unwrap();
        let restored: WatchdogState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
