//! The per-worker decision loop.
//!
//! A [`Mind`] receives every clock pulse for its worker and converts the
//! elapsed time into task execution:
//!
//! 1. The elapsed time is cut into slices no longer than the configured
//!    standard pulse time (the whole remainder when that is zero).
//! 2. Each slice is spent by repeatedly running the active task. Time a
//!    task hands back is spent at once on the next task, so a task ending
//!    in the middle of a pulse wastes nothing.
//! 3. With no active task the mind looks for work: it resumes its mission
//!    if the worker is fit and not low on power, and otherwise asks the
//!    task manager for a new task.
//!
//! Guard rails keep a misbehaving task from stalling the tick: a nonsense
//! return value ends the slice, the number of task calls per slice is
//! capped, and a task that consumes nothing is charged one standard pulse.

use std::rc::Rc;

use tracing::{debug, info, warn};

use habitat_types::{ClockPulse, JobType, MarsTime, MissionId, Temporal, WorkerId};

use crate::config::MindConfig;
use crate::error::{AgentError, MissionError};
use crate::mission::SharedMission;
use crate::task::TaskManager;
use crate::worker::Worker;

/// Leftover time below which a slice counts as fully spent.
const SMALL_AMOUNT_OF_TIME: f64 = 0.001;

/// Change notification emitted by a [`Mind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MindEvent {
    /// The worker joined, switched, or left a mission.
    MissionChanged {
        /// The worker.
        worker: WorkerId,
        /// The new mission, if any.
        mission: Option<MissionId>,
    },
    /// The worker was given a new job.
    JobChanged {
        /// The worker.
        worker: WorkerId,
        /// The new job.
        job: JobType,
        /// Who made the assignment.
        assigned_by: String,
    },
}

/// Callback receiving a mind's change notifications.
pub type MindObserver = Box<dyn FnMut(&MindEvent)>;

/// Lets a warning through at most once per interval of simulated time.
#[derive(Debug, Default)]
struct WarnGate {
    last: Option<f64>,
}

impl WarnGate {
    fn allow(&mut self, now: f64, interval: f64) -> bool {
        if self.last.is_some_and(|last| now - last < interval) {
            return false;
        }
        self.last = Some(now);
        true
    }
}

/// The decision-making core of one worker.
pub struct Mind<W: Worker, T: TaskManager> {
    worker: W,
    tasks: T,
    mission: Option<SharedMission>,
    job: Option<JobType>,
    job_lock: bool,
    config: MindConfig,
    observer: Option<MindObserver>,
    low_power_gate: WarnGate,
    task_gate: WarnGate,
    /// Consecutive task calls, across slices and pulses, that used no time.
    zero_calls: u32,
    retired: bool,
}

impl<W: Worker, T: TaskManager> Mind<W, T> {
    /// Create a mind for `worker` driving `tasks`.
    pub fn new(worker: W, tasks: T, config: MindConfig) -> Self {
        Self {
            worker,
            tasks,
            mission: None,
            job: None,
            job_lock: false,
            config,
            observer: None,
            low_power_gate: WarnGate::default(),
            task_gate: WarnGate::default(),
            zero_calls: 0,
            retired: false,
        }
    }

    /// Install the callback that receives change notifications.
    pub fn set_observer(&mut self, observer: MindObserver) {
        self.observer = Some(observer);
    }

    /// Return the worker.
    pub const fn worker(&self) -> &W {
        &self.worker
    }

    /// Return the worker for modification.
    pub const fn worker_mut(&mut self) -> &mut W {
        &mut self.worker
    }

    /// Return the task manager.
    pub const fn tasks(&self) -> &T {
        &self.tasks
    }

    /// Return the task manager for modification.
    pub const fn tasks_mut(&mut self) -> &mut T {
        &mut self.tasks
    }

    /// Return the decision-loop configuration.
    pub const fn config(&self) -> &MindConfig {
        &self.config
    }

    /// Return the current job.
    pub const fn job(&self) -> Option<JobType> {
        self.job
    }

    /// Whether the current job is locked against reassignment.
    pub const fn is_job_locked(&self) -> bool {
        self.job_lock
    }

    /// Return the assigned mission, done or not.
    pub const fn mission(&self) -> Option<&SharedMission> {
        self.mission.as_ref()
    }

    /// Whether a mission is assigned.
    pub const fn has_mission(&self) -> bool {
        self.mission.is_some()
    }

    /// Whether a mission is assigned and not done.
    ///
    /// A mission that is busy (borrowed elsewhere) counts as active.
    pub fn has_active_mission(&self) -> bool {
        self.mission
            .as_ref()
            .is_some_and(|m| !m.try_borrow().is_ok_and(|m| m.is_done()))
    }

    /// Whether the mind has been retired.
    pub const fn is_retired(&self) -> bool {
        self.retired
    }

    // ---- missions ----

    /// Assign `mission` (or clear it with `None`).
    ///
    /// The worker joins the new mission before leaving the old one, so a
    /// rejected join leaves everything as it was. Setting the mission
    /// already assigned is a no-op.
    pub fn set_mission(&mut self, mission: Option<SharedMission>) -> Result<(), AgentError> {
        self.ensure_active()?;
        let same = match (&self.mission, &mission) {
            (Some(current), Some(new)) => Rc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if same {
            return Ok(());
        }

        let worker = self.worker.id();
        let mut new_id = None;
        if let Some(new) = &mission {
            let mut new = new.try_borrow_mut().map_err(|_busy| MissionError::Busy)?;
            new.add_member(worker)?;
            new_id = Some(new.id());
        }

        if let Some(old) = self.mission.take() {
            match old.try_borrow_mut() {
                Ok(mut old) => old.remove_member(worker),
                Err(_busy) => warn!(
                    worker = %self.worker.name(),
                    "Previous mission busy; membership not released"
                ),
            }
        }
        self.mission = mission;

        info!(worker = %self.worker.name(), mission = ?new_id, "Mission changed");
        self.notify(&MindEvent::MissionChanged {
            worker,
            mission: new_id,
        });
        Ok(())
    }

    /// Offer a mission to the worker.
    ///
    /// The mission is taken only when the worker has no active mission and
    /// performs well enough. Returns whether it was taken.
    pub fn offer_mission(&mut self, mission: SharedMission) -> Result<bool, AgentError> {
        if self.has_active_mission() {
            return Ok(false);
        }
        let performance = self.worker.performance();
        if performance < self.config.min_mission_performance {
            debug!(
                worker = %self.worker.name(),
                performance,
                "Too weak to take a mission"
            );
            return Ok(false);
        }
        self.set_mission(Some(mission))?;
        Ok(true)
    }

    /// Forget the mission without telling it.
    ///
    /// Used when the mission itself ends the membership; unlike
    /// [`set_mission`](Self::set_mission) the mission is not notified.
    pub fn stop_mission(&mut self) {
        self.mission = None;
    }

    // ---- jobs ----

    /// Give the worker a new job.
    ///
    /// A locked job is only replaced when `bypass_lock` is set. The new job
    /// is locked until the next sol begins (for good, for a politician).
    /// Returns whether the job changed.
    pub fn assign_job(
        &mut self,
        job: JobType,
        bypass_lock: bool,
        assigned_by: &str,
    ) -> Result<bool, AgentError> {
        self.ensure_active()?;
        if self.job == Some(job) {
            return Ok(false);
        }
        if let Some(current) = self.job
            && self.job_lock
            && !bypass_lock
        {
            return Err(AgentError::JobLocked {
                worker: self.worker.id(),
                current,
                requested: job,
            });
        }
        self.job = Some(job);
        self.job_lock = true;
        info!(worker = %self.worker.name(), ?job, assigned_by, "Job assigned");
        self.notify(&MindEvent::JobChanged {
            worker: self.worker.id(),
            job,
            assigned_by: assigned_by.to_owned(),
        });
        Ok(true)
    }

    // ---- lifecycle ----

    /// Stop all work: clear tasks and leave the active mission.
    pub fn set_inactive(&mut self) {
        self.tasks.clear_all_tasks("Inactive");
        if self.has_active_mission()
            && let Some(mission) = self.mission.take()
        {
            if let Ok(mut mission) = mission.try_borrow_mut() {
                mission.remove_member(self.worker.id());
            }
            self.notify(&MindEvent::MissionChanged {
                worker: self.worker.id(),
                mission: None,
            });
        }
    }

    /// Make the worker inactive for good. The next pulse deregisters it.
    pub fn retire(&mut self) {
        self.set_inactive();
        self.retired = true;
        info!(worker = %self.worker.name(), "Mind retired");
    }

    // ---- internals ----

    fn ensure_active(&self) -> Result<(), AgentError> {
        if self.retired {
            return Err(AgentError::Retired {
                worker: self.worker.id(),
            });
        }
        Ok(())
    }

    fn notify(&mut self, event: &MindEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }

    fn is_low_power(&self) -> bool {
        self.worker.power_level() <= self.config.low_power_threshold
    }

    /// Spend `elapsed` millisols in standard-sized slices.
    fn decide_task(&mut self, elapsed: f64, now: &MarsTime) {
        let standard = self.config.standard_pulse_time;
        let mut remaining = elapsed;
        while remaining > 0.0 {
            let slice = if standard > 0.0 {
                remaining.min(standard)
            } else {
                remaining
            };
            self.take_action(slice, now);
            remaining -= slice;
        }
    }

    /// Spend one slice on tasks, continuing with leftovers.
    fn take_action(&mut self, slice: f64, now: &MarsTime) {
        let t = now.total_millisols();
        let interval = self.config.low_power_warning_interval;

        if self.is_low_power() && self.low_power_gate.allow(t, interval) {
            warn!(
                worker = %self.worker.name(),
                power = self.worker.power_level(),
                task = self.tasks.task_name().unwrap_or("none"),
                "Running low on power"
            );
        }

        let mut time = slice;
        let mut calls: u32 = 0;
        while time > SMALL_AMOUNT_OF_TIME {
            if !self.tasks.has_active_task() {
                if !self.worker.is_operable() {
                    return;
                }
                self.look_for_work();
                if !self.tasks.has_active_task() {
                    return;
                }
                continue;
            }

            if calls >= self.config.max_execute {
                if self.task_gate.allow(t, interval) {
                    warn!(
                        worker = %self.worker.name(),
                        task = self.tasks.task_name().unwrap_or("unknown"),
                        calls,
                        "Task called too many times in one slice"
                    );
                }
                return;
            }
            calls = calls.saturating_add(1);

            let left = self.tasks.execute_task(time, self.worker.performance());
            if !left.is_finite() || left < 0.0 || left > time {
                if self.task_gate.allow(t, interval) {
                    warn!(
                        worker = %self.worker.name(),
                        task = self.tasks.task_name().unwrap_or("unknown"),
                        given = time,
                        returned = left,
                        "Task returned an invalid remaining time"
                    );
                }
                return;
            }

            if left >= time {
                // Nothing consumed; charge a standard pulse so the slice ends.
                self.zero_calls = self.zero_calls.saturating_add(1);
                if self.zero_calls > self.config.max_zero_execute {
                    warn!(
                        worker = %self.worker.name(),
                        task = self.tasks.task_name().unwrap_or("unknown"),
                        calls = self.zero_calls,
                        "Task makes no progress; dropped"
                    );
                    self.zero_calls = 0;
                    self.tasks.clear_all_tasks("Task made no progress");
                    return;
                }
                time = if self.config.standard_pulse_time > 0.0 {
                    time - self.config.standard_pulse_time
                } else {
                    0.0
                };
            } else {
                self.zero_calls = 0;
                time = left;
            }
        }
    }

    /// Find something to do: resume the mission or start a new task.
    fn look_for_work(&mut self) {
        if self
            .mission
            .as_ref()
            .is_some_and(|m| m.try_borrow().is_ok_and(|m| m.is_done()))
        {
            debug!(worker = %self.worker.name(), "Mission done; released");
            self.mission = None;
        }

        if let Some(mission) = self.mission.clone()
            && self.worker.is_fit()
            && !self.is_low_power()
        {
            let outcome = match mission.try_borrow_mut() {
                Ok(mut m) => m.perform(&self.worker, &mut self.tasks),
                Err(_busy) => Err(MissionError::Busy),
            };
            match outcome {
                Ok(true) => debug!(worker = %self.worker.name(), "Mission work resumed"),
                Ok(false) => {}
                Err(error) => {
                    warn!(worker = %self.worker.name(), %error, "Mission could not be resumed");
                }
            }
        }

        if !self.tasks.has_active_task() {
            self.tasks.start_new_task(&self.worker);
        }
    }

    fn update_job(&mut self, pulse: &ClockPulse) {
        if self.job_lock && self.job != Some(JobType::Politician) {
            if pulse.is_new_sol() {
                self.job_lock = false;
                debug!(worker = %self.worker.name(), "Job lock released");
            }
        } else if self.job.is_none()
            && let Some(job) = self.worker.preferred_job()
            && let Err(error) = self.assign_job(job, false, "settlement")
        {
            debug!(worker = %self.worker.name(), %error, "Preferred job not assigned");
        }
    }
}

impl<W: Worker, T: TaskManager> Temporal for Mind<W, T> {
    fn advance(&mut self, pulse: &ClockPulse) -> bool {
        if self.retired {
            return false;
        }
        self.tasks.time_passing(pulse);
        if pulse.elapsed() > 0.0 {
            self.decide_task(pulse.elapsed(), pulse.when());
        }
        self.update_job(pulse);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use chrono::{DateTime, Utc};

    use habitat_types::{Boundary, WorkerKind};

    use super::*;
    use crate::mission::Mission;

    // ---- fixtures ----

    struct Colonist {
        id: WorkerId,
        power: f64,
        fit: bool,
        performance: f64,
        operable: bool,
        preferred: Option<JobType>,
    }

    impl Colonist {
        fn new() -> Self {
            Self {
                id: WorkerId::new(),
                power: 100.0,
                fit: true,
                performance: 1.0,
                operable: true,
                preferred: None,
            }
        }
    }

    impl Worker for Colonist {
        fn id(&self) -> WorkerId {
            self.id
        }
        fn name(&self) -> &str {
            "colonist"
        }
        fn kind(&self) -> WorkerKind {
            WorkerKind::Person
        }
        fn is_operable(&self) -> bool {
            self.operable
        }
        fn power_level(&self) -> f64 {
            self.power
        }
        fn performance(&self) -> f64 {
            self.performance
        }
        fn is_fit(&self) -> bool {
            self.fit
        }
        fn preferred_job(&self) -> Option<JobType> {
            self.preferred
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mode {
        Normal,
        Idle,
        Broken,
        Trickle(f64),
    }

    struct Chores {
        queue: VecDeque<f64>,
        active: Option<(String, f64)>,
        calls: Vec<f64>,
        started: u32,
        consumed: f64,
        mode: Mode,
        cleared: bool,
    }

    impl Chores {
        fn with_queue(lengths: &[f64]) -> Self {
            Self {
                queue: lengths.iter().copied().collect(),
                active: None,
                calls: Vec::new(),
                started: 0,
                consumed: 0.0,
                mode: Mode::Normal,
                cleared: false,
            }
        }

        fn stuck(mode: Mode) -> Self {
            let mut chores = Self::with_queue(&[]);
            chores.mode = mode;
            chores.active = Some((String::from("stuck"), f64::MAX));
            chores
        }
    }

    impl TaskManager for Chores {
        fn has_active_task(&self) -> bool {
            self.active.is_some()
        }
        fn task_name(&self) -> Option<&str> {
            self.active.as_ref().map(|(name, _)| name.as_str())
        }
        fn execute_task(&mut self, time: f64, _performance: f64) -> f64 {
            self.calls.push(time);
            match self.mode {
                Mode::Idle => time,
                Mode::Broken => f64::NAN,
                Mode::Trickle(step) => {
                    self.consumed += step;
                    time - step
                }
                Mode::Normal => {
                    let Some((_, work)) = self.active.as_mut() else {
                        return time;
                    };
                    let used = time.min(*work);
                    *work -= used;
                    if *work < 1e-9 {
                        self.active = None;
                    }
                    self.consumed += used;
                    time - used
                }
            }
        }
        fn start_new_task(&mut self, _worker: &dyn Worker) {
            if let Some(length) = self.queue.pop_front() {
                self.active = Some((String::from("chore"), length));
                self.started += 1;
            }
        }
        fn assign_task(&mut self, task: &str) -> bool {
            self.active = Some((task.to_owned(), 1.0));
            true
        }
        fn clear_all_tasks(&mut self, _reason: &str) {
            self.active = None;
            self.queue.clear();
            self.cleared = true;
        }
    }

    struct Survey {
        id: MissionId,
        members: Vec<WorkerId>,
        done: bool,
        reject: bool,
        performed: u32,
    }

    impl Survey {
        fn shared() -> (Rc<RefCell<Self>>, SharedMission) {
            let survey = Rc::new(RefCell::new(Self {
                id: MissionId::new(),
                members: Vec::new(),
                done: false,
                reject: false,
                performed: 0,
            }));
            let shared: SharedMission = survey.clone();
            (survey, shared)
        }
    }

    impl Mission for Survey {
        fn id(&self) -> MissionId {
            self.id
        }
        fn name(&self) -> &str {
            "survey"
        }
        fn is_done(&self) -> bool {
            self.done
        }
        fn perform(
            &mut self,
            _worker: &dyn Worker,
            tasks: &mut dyn TaskManager,
        ) -> Result<bool, MissionError> {
            self.performed += 1;
            Ok(tasks.assign_task("collect samples"))
        }
        fn add_member(&mut self, worker: WorkerId) -> Result<(), MissionError> {
            if self.reject {
                return Err(MissionError::MemberRejected {
                    mission: self.id,
                    worker,
                    reason: String::from("rover full"),
                });
            }
            self.members.push(worker);
            Ok(())
        }
        fn remove_member(&mut self, worker: WorkerId) {
            self.members.retain(|m| *m != worker);
        }
    }

    fn pulse(id: u64, elapsed: f64) -> ClockPulse {
        ClockPulse::new(id, elapsed, MarsTime::START, DateTime::<Utc>::UNIX_EPOCH, Boundary::None)
    }

    fn new_sol_pulse(id: u64) -> ClockPulse {
        let when = MarsTime::new(2, 0.1).unwrap();
        ClockPulse::new(id, 0.2, when, DateTime::<Utc>::UNIX_EPOCH, Boundary::Sol)
    }

    fn mind(tasks: Chores) -> Mind<Colonist, Chores> {
        Mind::new(Colonist::new(), tasks, MindConfig::default())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ---- decision loop ----

    #[test]
    fn elapsed_time_is_cut_into_standard_slices() {
        let mut m = mind(Chores::with_queue(&[10.0]));
        assert!(m.advance(&pulse(1, 2.0)));
        let calls = &m.tasks().calls;
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|c| approx(*c, 0.5)));
        assert!(approx(m.tasks().consumed, 2.0));
    }

    #[test]
    fn leftover_time_flows_into_the_next_task() {
        let mut m = mind(Chores::with_queue(&[0.2, 10.0]));
        m.advance(&pulse(1, 0.5));
        let calls = &m.tasks().calls;
        assert_eq!(calls.len(), 2);
        assert!(approx(calls.first().copied().unwrap(), 0.5));
        assert!(approx(calls.get(1).copied().unwrap(), 0.3));
        assert_eq!(m.tasks().started, 2);
        assert!(approx(m.tasks().consumed, 0.5));
    }

    #[test]
    fn zero_standard_pulse_hands_over_everything() {
        let mut m = Mind::new(
            Colonist::new(),
            Chores::with_queue(&[10.0]),
            MindConfig {
                standard_pulse_time: 0.0,
                ..MindConfig::default()
            },
        );
        m.advance(&pulse(1, 1.5));
        assert_eq!(m.tasks().calls.len(), 1);
        assert!(approx(m.tasks().calls.first().copied().unwrap(), 1.5));
    }

    #[test]
    fn zero_elapsed_pulse_runs_no_task() {
        let mut m = mind(Chores::with_queue(&[10.0]));
        m.advance(&pulse(1, 0.0));
        assert!(m.tasks().calls.is_empty());
        assert_eq!(m.tasks().started, 0);
    }

    #[test]
    fn idle_task_is_charged_one_standard_pulse() {
        let mut m = mind(Chores::stuck(Mode::Idle));
        m.advance(&pulse(1, 1.0));
        // One call per slice; each is charged the full slice.
        assert_eq!(m.tasks().calls.len(), 2);
    }

    #[test]
    fn task_that_never_uses_time_is_dropped() {
        let mut m = Mind::new(
            Colonist::new(),
            Chores::stuck(Mode::Idle),
            MindConfig {
                max_zero_execute: 3,
                ..MindConfig::default()
            },
        );
        m.advance(&pulse(1, 1.0));
        assert_eq!(m.tasks().calls.len(), 2);
        assert!(!m.tasks().cleared);

        // The count carries over pulses; the fourth idle call drops the task.
        m.advance(&pulse(2, 1.0));
        assert_eq!(m.tasks().calls.len(), 4);
        assert!(m.tasks().cleared);
        assert!(!m.tasks().has_active_task());
    }

    #[test]
    fn invalid_remaining_time_ends_the_slice() {
        let mut m = mind(Chores::stuck(Mode::Broken));
        m.advance(&pulse(1, 1.0));
        assert_eq!(m.tasks().calls.len(), 2);
    }

    #[test]
    fn task_calls_per_slice_are_capped() {
        let mut m = Mind::new(
            Colonist::new(),
            Chores::stuck(Mode::Trickle(0.01)),
            MindConfig {
                max_execute: 5,
                ..MindConfig::default()
            },
        );
        m.advance(&pulse(1, 0.5));
        assert_eq!(m.tasks().calls.len(), 5);
    }

    #[test]
    fn low_power_warns_but_keeps_working() {
        let mut colonist = Colonist::new();
        colonist.power = 2.0;
        let mut m = Mind::new(colonist, Chores::with_queue(&[10.0]), MindConfig::default());
        m.advance(&pulse(1, 1.0));
        assert!(approx(m.tasks().consumed, 1.0));
    }

    #[test]
    fn inoperable_worker_starts_nothing() {
        let mut colonist = Colonist::new();
        colonist.operable = false;
        let mut m = Mind::new(colonist, Chores::with_queue(&[10.0]), MindConfig::default());
        m.advance(&pulse(1, 1.0));
        assert_eq!(m.tasks().started, 0);
        assert!(m.tasks().calls.is_empty());
    }

    // ---- missions ----

    #[test]
    fn active_mission_is_resumed_before_new_tasks() {
        let mut m = mind(Chores::with_queue(&[10.0]));
        let (survey, shared) = Survey::shared();
        m.set_mission(Some(shared)).unwrap();
        m.advance(&pulse(1, 0.5));
        assert_eq!(survey.borrow().performed, 1);
        assert_eq!(m.tasks().started, 0);
        assert_eq!(m.tasks().task_name(), Some("collect samples"));
    }

    #[test]
    fn low_power_worker_does_not_resume_mission() {
        let mut colonist = Colonist::new();
        colonist.power = 1.0;
        let mut m = Mind::new(colonist, Chores::with_queue(&[10.0]), MindConfig::default());
        let (survey, shared) = Survey::shared();
        m.set_mission(Some(shared)).unwrap();
        m.advance(&pulse(1, 0.5));
        assert_eq!(survey.borrow().performed, 0);
        assert_eq!(m.tasks().started, 1);
    }

    #[test]
    fn done_mission_is_released_when_looking_for_work() {
        let mut m = mind(Chores::with_queue(&[10.0]));
        let (survey, shared) = Survey::shared();
        m.set_mission(Some(shared)).unwrap();
        survey.borrow_mut().done = true;
        assert!(m.has_mission());
        assert!(!m.has_active_mission());
        m.advance(&pulse(1, 0.5));
        assert!(!m.has_mission());
        assert_eq!(m.tasks().started, 1);
    }

    #[test]
    fn rejected_join_leaves_previous_mission_in_place() {
        let mut m = mind(Chores::with_queue(&[]));
        let (first, first_shared) = Survey::shared();
        m.set_mission(Some(first_shared.clone())).unwrap();

        let (second, second_shared) = Survey::shared();
        second.borrow_mut().reject = true;
        let err = m.set_mission(Some(second_shared)).unwrap_err();
        assert!(matches!(err, AgentError::Mission { .. }));

        assert!(Rc::ptr_eq(m.mission().unwrap(), &first_shared));
        assert_eq!(first.borrow().members, vec![m.worker().id()]);
        assert!(second.borrow().members.is_empty());
    }

    #[test]
    fn switching_missions_moves_membership_and_notifies() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut m = mind(Chores::with_queue(&[]));
        m.set_observer(Box::new(move |e: &MindEvent| sink.borrow_mut().push(e.clone())));

        let (first, first_shared) = Survey::shared();
        let (second, second_shared) = Survey::shared();
        m.set_mission(Some(first_shared)).unwrap();
        m.set_mission(Some(second_shared)).unwrap();

        let me = m.worker().id();
        assert!(first.borrow().members.is_empty());
        assert_eq!(second.borrow().members, vec![me]);
        let second_id = second.borrow().id;
        assert_eq!(events.borrow().len(), 2);
        assert_eq!(
            events.borrow().get(1),
            Some(&MindEvent::MissionChanged {
                worker: me,
                mission: Some(second_id)
            })
        );
    }

    #[test]
    fn stop_mission_does_not_tell_the_mission() {
        let mut m = mind(Chores::with_queue(&[]));
        let (survey, shared) = Survey::shared();
        m.set_mission(Some(shared)).unwrap();
        m.stop_mission();
        assert!(!m.has_mission());
        assert_eq!(survey.borrow().members.len(), 1);
    }

    #[test]
    fn busy_mission_still_counts_as_active() {
        let mut m = mind(Chores::with_queue(&[]));
        let (survey, shared) = Survey::shared();
        m.set_mission(Some(shared.clone())).unwrap();

        let _held = survey.borrow_mut();
        assert!(m.has_active_mission());
        let (_other, other_shared) = Survey::shared();
        assert!(!m.offer_mission(other_shared).unwrap());
        assert!(Rc::ptr_eq(m.mission().unwrap(), &shared));
    }

    #[test]
    fn weak_worker_declines_mission_offers() {
        let mut colonist = Colonist::new();
        colonist.performance = 0.1;
        let mut m = Mind::new(colonist, Chores::with_queue(&[]), MindConfig::default());
        let (_survey, shared) = Survey::shared();
        assert!(!m.offer_mission(shared).unwrap());
        assert!(!m.has_mission());
    }

    #[test]
    fn set_inactive_clears_tasks_and_leaves_mission() {
        let mut m = mind(Chores::with_queue(&[10.0]));
        let (survey, shared) = Survey::shared();
        m.set_mission(Some(shared)).unwrap();
        m.set_inactive();
        assert!(m.tasks().cleared);
        assert!(!m.has_mission());
        assert!(survey.borrow().members.is_empty());
    }

    // ---- jobs and lifecycle ----

    #[test]
    fn job_lock_releases_on_new_sol() {
        let mut m = mind(Chores::with_queue(&[]));
        assert!(m.assign_job(JobType::Botanist, false, "settlement").unwrap());
        assert!(m.is_job_locked());
        assert!(matches!(
            m.assign_job(JobType::Chef, false, "settlement"),
            Err(AgentError::JobLocked { .. })
        ));

        m.advance(&new_sol_pulse(1));
        assert!(!m.is_job_locked());
        assert!(m.assign_job(JobType::Chef, false, "settlement").unwrap());
    }

    #[test]
    fn politician_lock_never_releases() {
        let mut m = mind(Chores::with_queue(&[]));
        m.assign_job(JobType::Politician, false, "mission control").unwrap();
        m.advance(&new_sol_pulse(1));
        assert!(m.is_job_locked());
        assert!(m.assign_job(JobType::Engineer, true, "user").unwrap());
    }

    #[test]
    fn jobless_worker_takes_preferred_job() {
        let mut colonist = Colonist::new();
        colonist.preferred = Some(JobType::Areologist);
        let mut m = Mind::new(colonist, Chores::with_queue(&[]), MindConfig::default());
        m.advance(&pulse(1, 0.1));
        assert_eq!(m.job(), Some(JobType::Areologist));
    }

    #[test]
    fn retired_mind_asks_to_be_deregistered() {
        let mut m = mind(Chores::with_queue(&[10.0]));
        assert!(m.advance(&pulse(1, 0.5)));
        m.retire();
        assert!(!m.advance(&pulse(2, 0.5)));
        assert!(matches!(
            m.assign_job(JobType::Pilot, true, "user"),
            Err(AgentError::Retired { .. })
        ));
    }
}
