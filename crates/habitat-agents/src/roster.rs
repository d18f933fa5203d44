//! Allocation and rotation of shift slots.
//!
//! The [`ShiftManager`] owns every shift and every slot. New workers are
//! placed on the shift furthest below its target share. Every
//! `rotation_sols` sols a share of each shift's slots goes on leave, and a
//! slot returning from leave is placed again on whichever shift is then
//! furthest below target.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use habitat_types::{ClockPulse, MILLISOLS_PER_SOL, MarsTime, Temporal, WorkStatus, WorkerId};

use crate::error::ShiftError;
use crate::schedule::EventSchedule;
use crate::shift::{Shift, ShiftPattern, ShiftSlot, SlotId};

/// Events the roster schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterEvent {
    /// Send a share of every shift on leave.
    Rotate,
    /// End the leave of this worker's slot.
    ReturnFromLeave(WorkerId),
}

/// Owner of the colony's shifts and shift slots.
#[derive(Debug)]
pub struct ShiftManager {
    shifts: Vec<Shift>,
    slots: BTreeMap<WorkerId, ShiftSlot>,
    next_slot: u32,
    rotation_sols: u32,
    rotation_leave_sols: u32,
    max_on_leave: u32,
    schedule: EventSchedule<RosterEvent>,
    rng: SmallRng,
    now: MarsTime,
}

impl ShiftManager {
    /// Create a manager for `pattern`, starting at `now`.
    ///
    /// The first rotation is scheduled `rotation_sols` sols after `now`.
    pub fn new(pattern: &ShiftPattern, seed: u64, now: MarsTime) -> Self {
        let msol = now.millisol_int();
        let shifts = pattern
            .shifts()
            .iter()
            .map(|spec| {
                let mut shift = Shift::from_spec(spec);
                shift.update_on_duty(msol);
                shift
            })
            .collect();
        let mut manager = Self {
            shifts,
            slots: BTreeMap::new(),
            next_slot: 0,
            rotation_sols: pattern.rotation_sols(),
            rotation_leave_sols: pattern.rotation_leave_sols(),
            max_on_leave: pattern.max_on_leave(),
            schedule: EventSchedule::new(),
            rng: SmallRng::seed_from_u64(seed),
            now,
        };
        manager.schedule_rotation(&now);
        manager
    }

    /// Return every shift in pattern order.
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// Return the shift at `index`.
    pub fn shift(&self, index: usize) -> Option<&Shift> {
        self.shifts.get(index)
    }

    /// Return the number of allocated slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Return the slot held by `worker`.
    pub fn slot_for(&self, worker: WorkerId) -> Option<&ShiftSlot> {
        self.slots.get(&worker)
    }

    /// Return every slot, ordered by worker id.
    pub fn slots(&self) -> impl Iterator<Item = &ShiftSlot> {
        self.slots.values()
    }

    /// Return the time of the last processed pulse.
    pub const fn now(&self) -> MarsTime {
        self.now
    }

    /// Return the current work status of `worker`.
    pub fn status(&self, worker: WorkerId) -> Option<WorkStatus> {
        let slot = self.slots.get(&worker)?;
        let on_duty = self.shifts.get(slot.shift()).is_some_and(Shift::is_on_duty);
        Some(slot.status_at(on_duty, &self.now))
    }

    /// Give `worker` a slot on the shift furthest below its target.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::AlreadyAllocated`] if the worker already holds
    /// a slot.
    pub fn allocate_shift(&mut self, worker: WorkerId) -> Result<&ShiftSlot, ShiftError> {
        if self.slots.contains_key(&worker) {
            return Err(ShiftError::AlreadyAllocated { worker });
        }
        let total = self.total_slots().saturating_add(1);
        let index = self.most_needed_shift(total);
        let id = SlotId(self.next_slot);
        self.next_slot = self.next_slot.saturating_add(1);
        if let Some(shift) = self.shifts.get_mut(index) {
            shift.add_slot();
            debug!(%worker, slot = %id, shift = shift.name(), "Shift allocated");
        }
        Ok(self
            .slots
            .entry(worker)
            .or_insert_with(|| ShiftSlot::new(id, worker, index)))
    }

    /// Give up `worker`'s slot.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::NotAllocated`] if the worker holds no slot.
    pub fn release(&mut self, worker: WorkerId) -> Result<ShiftSlot, ShiftError> {
        let slot = self
            .slots
            .remove(&worker)
            .ok_or(ShiftError::NotAllocated { worker })?;
        if let Some(shift) = self.shifts.get_mut(slot.shift()) {
            shift.remove_slot();
        }
        Ok(slot)
    }

    /// Call `worker` in, or release the call.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::NotAllocated`] if the worker holds no slot.
    pub fn set_on_call(&mut self, worker: WorkerId, on_call: bool) -> Result<(), ShiftError> {
        let slot = self
            .slots
            .get_mut(&worker)
            .ok_or(ShiftError::NotAllocated { worker })?;
        slot.set_on_call(on_call);
        Ok(())
    }

    // ---- internals ----

    fn total_slots(&self) -> u32 {
        self.shifts
            .iter()
            .fold(0_u32, |sum, s| sum.saturating_add(s.slot_count()))
    }

    /// Index of the shift with the largest deficit against its target
    /// given `total` slots; ties go to the earliest shift.
    fn most_needed_shift(&self, total: u32) -> usize {
        let deficit = |shift: &Shift| {
            i64::from(shift.target_percent())
                .saturating_mul(i64::from(total))
                .saturating_sub(i64::from(shift.slot_count()).saturating_mul(100))
        };
        let mut best = 0;
        let mut best_deficit = i64::MIN;
        for (index, shift) in self.shifts.iter().enumerate() {
            let d = deficit(shift);
            if d > best_deficit {
                best = index;
                best_deficit = d;
            }
        }
        best
    }

    fn schedule_rotation(&mut self, from: &MarsTime) {
        let due = from.add_millisols(f64::from(self.rotation_sols) * MILLISOLS_PER_SOL);
        self.schedule.schedule(&due, RosterEvent::Rotate);
    }

    fn rotate(&mut self, now: &MarsTime) {
        let until = now.add_millisols(f64::from(self.rotation_leave_sols) * MILLISOLS_PER_SOL);
        let mut sent = 0_usize;
        for (index, shift) in self.shifts.iter().enumerate() {
            let quota = u64::from(shift.slot_count())
                .saturating_mul(u64::from(self.max_on_leave))
                / 100;
            let quota = usize::try_from(quota).unwrap_or(usize::MAX);
            if quota == 0 {
                continue;
            }
            let eligible: Vec<WorkerId> = self
                .slots
                .values()
                .filter(|s| s.shift() == index && !s.is_on_call() && !s.is_on_leave(now))
                .map(ShiftSlot::worker)
                .collect();
            let chosen: Vec<WorkerId> = eligible
                .choose_multiple(&mut self.rng, quota)
                .copied()
                .collect();
            for worker in chosen {
                if let Some(slot) = self.slots.get_mut(&worker) {
                    slot.set_on_leave_until(Some(until));
                    self.schedule
                        .schedule(&until, RosterEvent::ReturnFromLeave(worker));
                    sent = sent.saturating_add(1);
                }
            }
        }
        info!(when = %now, sent, until = %until, "Shift rotation");
    }

    fn return_from_leave(&mut self, worker: WorkerId) {
        let Some(current) = self.slots.get(&worker).map(ShiftSlot::shift) else {
            return;
        };
        if let Some(shift) = self.shifts.get_mut(current) {
            shift.remove_slot();
        }
        let target = self.most_needed_shift(self.total_slots().saturating_add(1));
        if let Some(shift) = self.shifts.get_mut(target) {
            shift.add_slot();
        }
        if let Some(slot) = self.slots.get_mut(&worker) {
            slot.set_on_leave_until(None);
            slot.rebind(target);
        }
        debug!(%worker, from = current, to = target, "Returned from leave");
    }
}

impl Temporal for ShiftManager {
    fn advance(&mut self, pulse: &ClockPulse) -> bool {
        self.now = *pulse.when();
        let msol = self.now.millisol_int();
        for shift in &mut self.shifts {
            shift.update_on_duty(msol);
        }

        let now = self.now;
        while let Some((due, event)) = self.schedule.pop_due(&now) {
            match event {
                RosterEvent::Rotate => {
                    self.rotate(&now);
                    self.schedule_rotation(&due);
                }
                RosterEvent::ReturnFromLeave(worker) => self.return_from_leave(worker),
            }
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};

    use habitat_types::Boundary;

    use super::*;
    use crate::shift::ShiftSpec;

    fn at_msol(sol: u32, msol: f64) -> MarsTime {
        MarsTime::new(sol, msol).unwrap()
    }

    fn pulse_at(id: u64, when: MarsTime) -> ClockPulse {
        ClockPulse::new(id, 1.0, when, DateTime::<Utc>::UNIX_EPOCH, Boundary::None)
    }

    #[test]
    fn exactly_one_standard_shift_is_on_duty_every_millisol() {
        let mut manager = ShiftManager::new(&ShiftPattern::standard(), 1, MarsTime::START);
        for m in 0..1000_u32 {
            let when = at_msol(1, f64::from(m));
            manager.advance(&pulse_at(u64::from(m).saturating_add(1), when));
            let on: Vec<&Shift> = manager.shifts().iter().filter(|s| s.is_on_duty()).collect();
            assert_eq!(on.len(), 1, "millisol {m}");
            let expected = if (400..900).contains(&m) { "A" } else { "B" };
            assert_eq!(on.first().unwrap().name(), expected, "millisol {m}");
            assert!(on.first().unwrap().covers(m));
        }
    }

    #[test]
    fn allocation_converges_to_target_shares() {
        let pattern = ShiftPattern::new(
            vec![
                ShiftSpec::new("day", 0, 400, 50),
                ShiftSpec::new("swing", 400, 700, 30),
                ShiftSpec::new("night", 700, 0, 20),
            ],
            10,
            1,
            10,
        )
        .unwrap();
        let mut manager = ShiftManager::new(&pattern, 3, MarsTime::START);
        for n in 1..=60_u32 {
            manager.allocate_shift(WorkerId::new()).unwrap();
            for shift in manager.shifts() {
                let expected = f64::from(shift.target_percent()) * f64::from(n) / 100.0;
                let actual = f64::from(shift.slot_count());
                assert!(
                    (actual - expected).abs() <= 1.0,
                    "{} has {actual} after {n}, expected about {expected}",
                    shift.name()
                );
            }
        }
        let counts: Vec<u32> = manager.shifts().iter().map(Shift::slot_count).collect();
        assert_eq!(counts, vec![30, 18, 12]);
    }

    #[test]
    fn first_allocations_alternate_between_equal_shifts() {
        let mut manager = ShiftManager::new(&ShiftPattern::standard(), 1, MarsTime::START);
        let first = manager.allocate_shift(WorkerId::new()).unwrap().shift();
        let second = manager.allocate_shift(WorkerId::new()).unwrap().shift();
        assert_eq!((first, second), (0, 1));
    }

    #[test]
    fn double_allocation_and_unknown_release_fail() {
        let mut manager = ShiftManager::new(&ShiftPattern::standard(), 1, MarsTime::START);
        let worker = WorkerId::new();
        manager.allocate_shift(worker).unwrap();
        assert!(matches!(
            manager.allocate_shift(worker),
            Err(ShiftError::AlreadyAllocated { .. })
        ));
        manager.release(worker).unwrap();
        assert!(matches!(
            manager.release(worker),
            Err(ShiftError::NotAllocated { .. })
        ));
        assert_eq!(manager.shifts().iter().map(Shift::slot_count).sum::<u32>(), 0);
    }

    #[test]
    fn status_follows_window_and_on_call_override() {
        let mut manager = ShiftManager::new(&ShiftPattern::standard(), 1, MarsTime::START);
        let worker = WorkerId::new();
        // First allocation lands on shift A (400..900).
        manager.allocate_shift(worker).unwrap();

        manager.advance(&pulse_at(1, at_msol(1, 450.0)));
        assert_eq!(manager.status(worker), Some(WorkStatus::OnDuty));
        manager.advance(&pulse_at(2, at_msol(1, 950.0)));
        assert_eq!(manager.status(worker), Some(WorkStatus::OffDuty));

        manager.set_on_call(worker, true).unwrap();
        assert_eq!(manager.status(worker), Some(WorkStatus::OnCall));
    }

    #[test]
    fn rotation_sends_share_on_leave_and_brings_it_back() {
        let pattern =
            ShiftPattern::new(ShiftPattern::standard().shifts().to_vec(), 2, 1, 20).unwrap();
        let mut manager = ShiftManager::new(&pattern, 9, MarsTime::START);
        let workers: Vec<WorkerId> = (0..20).map(|_| WorkerId::new()).collect();
        for w in &workers {
            manager.allocate_shift(*w).unwrap();
        }
        let on_call = *workers.first().unwrap();
        manager.set_on_call(on_call, true).unwrap();

        // Rotation falls due at the start of sol 3.
        manager.advance(&pulse_at(1, at_msol(3, 0.5)));
        let on_leave: Vec<WorkerId> = workers
            .iter()
            .copied()
            .filter(|w| manager.status(*w) == Some(WorkStatus::OnLeave))
            .collect();
        // floor(10 * 20 / 100) = 2 per shift.
        assert_eq!(on_leave.len(), 4);
        assert!(!on_leave.contains(&on_call));
        assert_eq!(manager.status(on_call), Some(WorkStatus::OnCall));

        // Leave lasts one sol.
        manager.advance(&pulse_at(2, at_msol(4, 1.0)));
        assert!(
            workers
                .iter()
                .all(|w| manager.status(*w) != Some(WorkStatus::OnLeave))
        );
        let counts: Vec<u32> = manager.shifts().iter().map(Shift::slot_count).collect();
        assert_eq!(counts, vec![10, 10]);
    }

    #[test]
    fn same_seed_rotates_the_same_slots() {
        let run = || {
            let pattern =
                ShiftPattern::new(ShiftPattern::standard().shifts().to_vec(), 1, 1, 30).unwrap();
            let mut manager = ShiftManager::new(&pattern, 77, MarsTime::START);
            for _ in 0..10 {
                manager.allocate_shift(WorkerId::new()).unwrap();
            }
            manager.advance(&pulse_at(1, at_msol(2, 0.5)));
            manager
                .slots()
                .map(|s| s.on_leave_until().is_some())
                .collect::<Vec<bool>>()
        };
        assert_eq!(run(), run());
    }
}
