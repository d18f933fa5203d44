//! Shift patterns, shifts, and the slots binding workers to them.
//!
//! A [`ShiftPattern`] cuts the 1000-millisol sol into contiguous duty
//! windows that together cover the whole cycle. Windows are half-open
//! (`[start, end)`) and may wrap past millisol 999 back to 0. Each window
//! carries a target share of the workforce in percent.

use serde::{Deserialize, Serialize};

use habitat_types::{MarsTime, WorkStatus, WorkerId};

use crate::error::ShiftError;

/// Millisols in one duty cycle.
const CYCLE: u32 = 1000;

/// Length of the window `[start, end)` on the cycle; equal ends mean the
/// full cycle.
const fn window_len(start: u32, end: u32) -> u32 {
    if end > start {
        end.saturating_sub(start)
    } else {
        CYCLE.saturating_sub(start).saturating_add(end)
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// Definition of one shift within a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSpec {
    /// Shift name, unique within the pattern.
    pub name: String,
    /// First millisol of the duty window.
    pub start: u32,
    /// Millisol at which the duty window ends (exclusive).
    pub end: u32,
    /// Target share of the workforce, in percent.
    pub population_percent: u32,
}

impl ShiftSpec {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, start: u32, end: u32, population_percent: u32) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            population_percent,
        }
    }
}

/// A validated set of shifts plus the rotation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPattern {
    shifts: Vec<ShiftSpec>,
    rotation_sols: u32,
    rotation_leave_sols: u32,
    max_on_leave: u32,
}

impl ShiftPattern {
    /// Validate and build a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::InvalidPattern`] when the pattern is empty,
    /// has duplicate names, has a window outside `0..1000`, does not tile
    /// the cycle contiguously, has targets not summing to 100, has
    /// `max_on_leave` above 100, or has `rotation_sols` of zero.
    pub fn new(
        shifts: Vec<ShiftSpec>,
        rotation_sols: u32,
        rotation_leave_sols: u32,
        max_on_leave: u32,
    ) -> Result<Self, ShiftError> {
        let invalid = |reason: String| ShiftError::InvalidPattern { reason };

        if shifts.is_empty() {
            return Err(invalid(String::from("at least one shift is required")));
        }
        for (i, spec) in shifts.iter().enumerate() {
            if shifts.iter().skip(i.saturating_add(1)).any(|s| s.name == spec.name) {
                return Err(invalid(format!("duplicate shift name '{}'", spec.name)));
            }
            if spec.start >= CYCLE || spec.end > CYCLE {
                return Err(invalid(format!(
                    "shift '{}' window {}..{} lies outside 0..1000",
                    spec.name, spec.start, spec.end
                )));
            }
        }
        for (spec, next) in shifts.iter().zip(shifts.iter().cycle().skip(1)) {
            if spec.end % CYCLE != next.start {
                return Err(invalid(format!(
                    "shift '{}' ends at {} but '{}' starts at {}",
                    spec.name, spec.end, next.name, next.start
                )));
            }
        }
        let covered: u32 = shifts.iter().map(|s| window_len(s.start, s.end)).sum();
        if covered != CYCLE {
            return Err(invalid(format!(
                "windows cover {covered} millisols instead of 1000"
            )));
        }
        let total: u32 = shifts.iter().map(|s| s.population_percent).sum();
        if total != 100 {
            return Err(invalid(format!(
                "population percentages sum to {total}, not 100"
            )));
        }
        if max_on_leave > 100 {
            return Err(invalid(format!("max_on_leave {max_on_leave} exceeds 100")));
        }
        if rotation_sols == 0 {
            return Err(invalid(String::from("rotation_sols must be at least 1")));
        }

        Ok(Self {
            shifts,
            rotation_sols,
            rotation_leave_sols,
            max_on_leave,
        })
    }

    /// Two equal shifts: `A` on duty 400..900, `B` 900..400.
    pub fn standard() -> Self {
        Self {
            shifts: vec![ShiftSpec::new("A", 400, 900, 50), ShiftSpec::new("B", 900, 400, 50)],
            rotation_sols: 10,
            rotation_leave_sols: 1,
            max_on_leave: 10,
        }
    }

    /// Return the shift definitions in order.
    pub fn shifts(&self) -> &[ShiftSpec] {
        &self.shifts
    }

    /// Sols between two rotations.
    pub const fn rotation_sols(&self) -> u32 {
        self.rotation_sols
    }

    /// Sols a rotated slot stays on leave.
    pub const fn rotation_leave_sols(&self) -> u32 {
        self.rotation_leave_sols
    }

    /// Percentage of each shift's slots sent on leave per rotation.
    pub const fn max_on_leave(&self) -> u32 {
        self.max_on_leave
    }
}

impl Default for ShiftPattern {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Shift
// ---------------------------------------------------------------------------

/// A named recurring duty window and its current occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    name: String,
    start: u32,
    end: u32,
    target_percent: u32,
    slot_count: u32,
    on_duty: bool,
}

impl Shift {
    /// Build an empty shift from its definition.
    pub fn from_spec(spec: &ShiftSpec) -> Self {
        Self {
            name: spec.name.clone(),
            start: spec.start,
            end: spec.end,
            target_percent: spec.population_percent,
            slot_count: 0,
            on_duty: false,
        }
    }

    /// Return the shift name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the window as `(start, end)`.
    pub const fn window(&self) -> (u32, u32) {
        (self.start, self.end)
    }

    /// Return the target share of the workforce, in percent.
    pub const fn target_percent(&self) -> u32 {
        self.target_percent
    }

    /// Return the number of slots bound to this shift.
    pub const fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Whether the window covered the time of the last update.
    pub const fn is_on_duty(&self) -> bool {
        self.on_duty
    }

    /// Whether the window contains `millisol` (taken modulo 1000).
    pub const fn covers(&self, millisol: u32) -> bool {
        let m = millisol % CYCLE;
        if self.start < self.end {
            self.start <= m && m < self.end
        } else if self.start > self.end {
            m >= self.start || m < self.end
        } else {
            true
        }
    }

    /// Recompute the on-duty flag for `millisol`.
    pub const fn update_on_duty(&mut self, millisol: u32) {
        self.on_duty = self.covers(millisol);
    }

    pub(crate) const fn add_slot(&mut self) {
        self.slot_count = self.slot_count.saturating_add(1);
    }

    pub(crate) const fn remove_slot(&mut self) {
        self.slot_count = self.slot_count.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// ShiftSlot
// ---------------------------------------------------------------------------

/// Identifier of a shift slot, assigned in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl core::fmt::Display for SlotId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// The binding of one worker to one shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSlot {
    id: SlotId,
    worker: WorkerId,
    shift: usize,
    on_call: bool,
    on_leave_until: Option<MarsTime>,
}

impl ShiftSlot {
    /// Bind `worker` to the shift at index `shift`.
    pub const fn new(id: SlotId, worker: WorkerId, shift: usize) -> Self {
        Self {
            id,
            worker,
            shift,
            on_call: false,
            on_leave_until: None,
        }
    }

    /// Return the slot id.
    pub const fn id(&self) -> SlotId {
        self.id
    }

    /// Return the bound worker.
    pub const fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Return the index of the bound shift.
    pub const fn shift(&self) -> usize {
        self.shift
    }

    /// Whether the worker has been called in.
    pub const fn is_on_call(&self) -> bool {
        self.on_call
    }

    /// Return when the current leave ends, if on leave.
    pub const fn on_leave_until(&self) -> Option<MarsTime> {
        self.on_leave_until
    }

    /// Call the worker in, or release the call.
    pub const fn set_on_call(&mut self, on_call: bool) {
        self.on_call = on_call;
    }

    /// Put the worker on leave until `until`, or end the leave with `None`.
    pub const fn set_on_leave_until(&mut self, until: Option<MarsTime>) {
        self.on_leave_until = until;
    }

    /// Whether a leave is running at `now`.
    pub fn is_on_leave(&self, now: &MarsTime) -> bool {
        self.on_leave_until
            .is_some_and(|until| until.total_millisols() > now.total_millisols())
    }

    /// Derive the work status at `now`.
    ///
    /// Being on call beats being on leave, which beats the shift window.
    pub fn status_at(&self, shift_on_duty: bool, now: &MarsTime) -> WorkStatus {
        if self.on_call {
            WorkStatus::OnCall
        } else if self.is_on_leave(now) {
            WorkStatus::OnLeave
        } else if shift_on_duty {
            WorkStatus::OnDuty
        } else {
            WorkStatus::OffDuty
        }
    }

    pub(crate) const fn rebind(&mut self, shift: usize) {
        self.shift = shift;
    }
}
