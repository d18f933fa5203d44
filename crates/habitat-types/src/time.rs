//! Simulated Mars time and the clock pulse that carries it.
//!
//! The base quantum is the millisol: 1000 millisols make one sol. A
//! [`MarsTime`] is a point on the mission timeline (sol number plus
//! fractional millisol of that sol). A [`ClockPulse`] is one tick of
//! simulated time as delivered to every [`Temporal`] listener.
//!
//! Earth timestamps are derived from simulated time and a fixed epoch, never
//! from the wall clock, so two runs from the same start produce identical
//! pulses.
//!
//! [`Temporal`]: crate::Temporal

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Number of millisols in one sol.
pub const MILLISOLS_PER_SOL: f64 = 1000.0;

/// Earth seconds in one millisol.
pub const SECONDS_PER_MILLISOL: f64 = 88.775_244;

/// Millisol at which the second half of a sol begins.
const HALF_SOL: f64 = 500.0;

// ---------------------------------------------------------------------------
// MarsTime
// ---------------------------------------------------------------------------

/// A point on the mission timeline.
///
/// `mission_sol` is 1-based (the landing sol is sol 1); `millisol` is the
/// time of sol in `[0, 1000)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MarsTime {
    mission_sol: u32,
    millisol: f64,
}

impl MarsTime {
    /// The first instant of the mission: sol 1, millisol 0.
    pub const START: Self = Self {
        mission_sol: 1,
        millisol: 0.0,
    };

    /// Create a time from a sol number and time of sol.
    ///
    /// Returns `None` if `mission_sol` is 0 or `millisol` is outside
    /// `[0, 1000)` or not finite.
    pub fn new(mission_sol: u32, millisol: f64) -> Option<Self> {
        if mission_sol == 0
            || !millisol.is_finite()
            || !(0.0..MILLISOLS_PER_SOL).contains(&millisol)
        {
            return None;
        }
        Some(Self {
            mission_sol,
            millisol,
        })
    }

    /// Create a time from the number of millisols since the mission start.
    ///
    /// Negative or non-finite input clamps to [`MarsTime::START`]; input
    /// beyond the representable sol range saturates at the last sol.
    // `whole_sols` is in `[0, u32::MAX - 1)` at both casts.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_total_millisols(total: f64) -> Self {
        if !total.is_finite() || total <= 0.0 {
            return Self::START;
        }
        let whole_sols = (total / MILLISOLS_PER_SOL).floor();
        let max_index = f64::from(u32::MAX.saturating_sub(1));
        if whole_sols >= max_index {
            return Self {
                mission_sol: u32::MAX,
                millisol: 0.0,
            };
        }
        let millisol = (total - whole_sols * MILLISOLS_PER_SOL).clamp(0.0, MILLISOLS_PER_SOL);
        // Floating error can land exactly on 1000.0; roll it into the next sol.
        let (sol_index, millisol) = if millisol >= MILLISOLS_PER_SOL {
            ((whole_sols as u32).saturating_add(1), 0.0)
        } else {
            (whole_sols as u32, millisol)
        };
        Self {
            mission_sol: sol_index.saturating_add(1),
            millisol,
        }
    }

    /// Return the 1-based mission sol.
    pub const fn mission_sol(&self) -> u32 {
        self.mission_sol
    }

    /// Return the fractional time of sol in `[0, 1000)`.
    pub const fn millisol(&self) -> f64 {
        self.millisol
    }

    /// Return the time of sol truncated to a whole millisol (0..=999).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // millisol is in [0, 1000).
    pub fn millisol_int(&self) -> u32 {
        (self.millisol.floor() as u32).min(999)
    }

    /// Return the number of millisols since the mission start.
    pub fn total_millisols(&self) -> f64 {
        f64::from(self.mission_sol.saturating_sub(1)) * MILLISOLS_PER_SOL + self.millisol
    }

    /// Return the time `msols` millisols later (earlier when negative).
    pub fn add_millisols(&self, msols: f64) -> Self {
        Self::from_total_millisols(self.total_millisols() + msols)
    }

    /// Return the number of millisols from `earlier` to `self`.
    pub fn millisols_since(&self, earlier: &Self) -> f64 {
        self.total_millisols() - earlier.total_millisols()
    }

    /// Derive the Earth timestamp of this instant given the mission epoch.
    ///
    /// Returns `None` if the result does not fit in a [`DateTime`].
    #[allow(clippy::cast_possible_truncation)] // Range-checked by TimeDelta::try_milliseconds.
    pub fn earth_time(&self, epoch: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let millis = (self.total_millisols() * SECONDS_PER_MILLISOL * 1000.0).round();
        if !millis.is_finite() {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        epoch.checked_add_signed(delta)
    }
}

impl Default for MarsTime {
    fn default() -> Self {
        Self::START
    }
}

impl core::fmt::Display for MarsTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Sol {} {:07.3}", self.mission_sol, self.millisol)
    }
}

// ---------------------------------------------------------------------------
// Boundaries
// ---------------------------------------------------------------------------

/// The largest time boundary crossed between two consecutive pulses.
///
/// Boundaries nest: crossing into a new sol also counts as crossing a half
/// sol, an integer millisol, and a half millisol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Boundary {
    /// No boundary crossed.
    None,
    /// Crossed the midpoint of a millisol.
    HalfMillisol,
    /// Crossed into a new whole millisol.
    IntMillisol,
    /// Crossed millisol 500.
    HalfSol,
    /// Crossed into a new sol.
    Sol,
}

impl Boundary {
    /// Determine the largest boundary crossed moving from `previous` to `next`.
    pub fn between(previous: &MarsTime, next: &MarsTime) -> Self {
        if next.mission_sol != previous.mission_sol {
            return Self::Sol;
        }
        if previous.millisol < HALF_SOL && next.millisol >= HALF_SOL {
            return Self::HalfSol;
        }
        if previous.millisol_int() != next.millisol_int() {
            return Self::IntMillisol;
        }
        let prev_fraction = previous.millisol - previous.millisol.floor();
        let next_fraction = next.millisol - next.millisol.floor();
        if prev_fraction < 0.5 && next_fraction >= 0.5 {
            return Self::HalfMillisol;
        }
        Self::None
    }
}

// ---------------------------------------------------------------------------
// ClockPulse
// ---------------------------------------------------------------------------

/// One tick of simulated time.
///
/// Created by the master clock and consumed read-only by every listener.
/// Pulse ids increase strictly, starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockPulse {
    id: u64,
    elapsed: f64,
    when: MarsTime,
    earth_time: DateTime<Utc>,
    boundary: Boundary,
}

impl ClockPulse {
    /// Assemble a pulse from its parts.
    ///
    /// Negative or non-finite `elapsed` is stored as zero.
    pub fn new(
        id: u64,
        elapsed: f64,
        when: MarsTime,
        earth_time: DateTime<Utc>,
        boundary: Boundary,
    ) -> Self {
        let elapsed = if elapsed.is_finite() && elapsed > 0.0 {
            elapsed
        } else {
            0.0
        };
        Self {
            id,
            elapsed,
            when,
            earth_time,
            boundary,
        }
    }

    /// Build the pulse that follows `previous` by `elapsed` millisols.
    ///
    /// Boundary crossings and the Earth timestamp are derived from the two
    /// instants and `epoch`. Returns `None` if the Earth timestamp would
    /// overflow.
    pub fn following(
        id: u64,
        previous: &MarsTime,
        elapsed: f64,
        epoch: DateTime<Utc>,
    ) -> Option<Self> {
        let when = previous.add_millisols(elapsed.max(0.0));
        let earth_time = when.earth_time(epoch)?;
        let boundary = Boundary::between(previous, &when);
        Some(Self::new(id, elapsed, when, earth_time, boundary))
    }

    /// Return the pulse id.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Return the simulated time covered by this pulse, in millisols.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Return the simulated time at the end of this pulse.
    pub const fn when(&self) -> &MarsTime {
        &self.when
    }

    /// Return the Earth timestamp matching [`ClockPulse::when`].
    pub const fn earth_time(&self) -> DateTime<Utc> {
        self.earth_time
    }

    /// Return the largest boundary this pulse crossed.
    pub const fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Whether this pulse crossed into a new sol.
    pub fn is_new_sol(&self) -> bool {
        self.boundary >= Boundary::Sol
    }

    /// Whether this pulse crossed a half-sol boundary.
    pub fn is_new_half_sol(&self) -> bool {
        self.boundary >= Boundary::HalfSol
    }

    /// Whether this pulse crossed into a new whole millisol.
    pub fn is_new_int_millisol(&self) -> bool {
        self.boundary >= Boundary::IntMillisol
    }

    /// Whether this pulse crossed a half-millisol boundary.
    pub fn is_new_half_millisol(&self) -> bool {
        self.boundary >= Boundary::HalfMillisol
    }

    /// Return a copy of this pulse covering `extra` additional millisols.
    ///
    /// Used when a throttled listener receives one pulse standing in for
    /// several skipped ones. A skipped sol boundary is not replayed; the
    /// caller passes the largest skipped boundary via `skipped`.
    pub fn with_extra_elapsed(&self, extra: f64, skipped: Boundary) -> Self {
        let extra = if extra.is_finite() && extra > 0.0 { extra } else { 0.0 };
        Self {
            elapsed: self.elapsed + extra,
            boundary: self.boundary.max(skipped),
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2043-09-30T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn total_millisols_roundtrip() {
        let t = MarsTime::new(3, 250.5).unwrap();
        assert_eq!(t.total_millisols(), 2250.5);
        let back = MarsTime::from_total_millisols(2250.5);
        assert_eq!(back, t);
    }

    #[test]
    fn add_millisols_rolls_into_next_sol() {
        let t = MarsTime::new(1, 999.5).unwrap();
        let later = t.add_millisols(1.0);
        assert_eq!(later.mission_sol(), 2);
        assert!((later.millisol() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn negative_total_clamps_to_start() {
        assert_eq!(MarsTime::from_total_millisols(-4.0), MarsTime::START);
        assert_eq!(MarsTime::from_total_millisols(f64::NAN), MarsTime::START);
    }

    #[test]
    fn invalid_components_rejected() {
        assert!(MarsTime::new(0, 10.0).is_none());
        assert!(MarsTime::new(1, 1000.0).is_none());
        assert!(MarsTime::new(1, -0.1).is_none());
    }

    #[test]
    fn boundaries_nest() {
        let a = MarsTime::new(1, 499.8).unwrap();
        let b = MarsTime::new(1, 500.1).unwrap();
        assert_eq!(Boundary::between(&a, &b), Boundary::HalfSol);

        let c = MarsTime::new(1, 10.2).unwrap();
        let d = MarsTime::new(1, 10.7).unwrap();
        assert_eq!(Boundary::between(&c, &d), Boundary::HalfMillisol);

        let e = MarsTime::new(1, 999.9).unwrap();
        let f = MarsTime::new(2, 0.1).unwrap();
        assert_eq!(Boundary::between(&e, &f), Boundary::Sol);
    }

    #[test]
    fn new_sol_pulse_reports_every_smaller_boundary() {
        let start = MarsTime::new(1, 999.0).unwrap();
        let pulse = ClockPulse::following(7, &start, 2.0, epoch()).unwrap();
        assert!(pulse.is_new_sol());
        assert!(pulse.is_new_half_sol());
        assert!(pulse.is_new_int_millisol());
        assert!(pulse.is_new_half_millisol());
        assert_eq!(pulse.when().mission_sol(), 2);
    }

    #[test]
    fn earth_time_follows_simulated_time() {
        let one_sol_later = MarsTime::new(2, 0.0).unwrap();
        let earth = one_sol_later.earth_time(epoch()).unwrap();
        // 1000 millisols * 88.775244 s = 88775.244 s
        assert_eq!((earth - epoch()).num_milliseconds(), 88_775_244);
    }

    #[test]
    fn extra_elapsed_keeps_largest_boundary() {
        let start = MarsTime::new(1, 100.0).unwrap();
        let pulse = ClockPulse::following(1, &start, 0.2, epoch()).unwrap();
        let collapsed = pulse.with_extra_elapsed(3.0, Boundary::HalfSol);
        assert!((collapsed.elapsed() - 3.2).abs() < 1e-9);
        assert!(collapsed.is_new_half_sol());
        assert_eq!(collapsed.id(), pulse.id());
    }

    #[test]
    fn negative_elapsed_is_stored_as_zero() {
        let pulse = ClockPulse::new(1, -2.0, MarsTime::START, epoch(), Boundary::None);
        assert_eq!(pulse.elapsed(), 0.0);
    }

    #[test]
    fn pulse_snapshot_survives_json() {
        let start = MarsTime::new(4, 12.5).unwrap();
        let pulse = ClockPulse::following(9, &start, 1.0, epoch()).unwrap();
        let json = serde_json::to_string(&pulse).unwrap();
        let back: ClockPulse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pulse);
        assert_eq!(back.when().to_string(), "Sol 4 013.500");
    }
}
