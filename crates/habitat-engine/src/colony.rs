//! Colonists for the demonstration colony.
//!
//! At start-up the engine creates `colony_size` colonists, gives each one a
//! shift slot and a preferred job, and wraps each in a [`Mind`]. A
//! colonist's chores depend on its shift status: on duty (or on call) it
//! works at its trade, otherwise it rests.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use habitat_agents::{Mind, MindConfig, ShiftManager, TaskManager, Worker};
use habitat_types::{JobType, WorkStatus, WorkerId, WorkerKind};

use crate::error::EngineError;

/// A colonist's mind, shared between the dispatcher and the engine.
pub type ColonistMind = Rc<RefCell<Mind<Colonist, Chores>>>;

/// Name pool for colonists; cycled when the colony is larger.
const NAME_POOL: &[&str] = &[
    "Amara", "Bohdan", "Chiara", "Dmitri", "Esme", "Farid", "Greta", "Hiro", "Ines", "Jonas",
    "Kaveh", "Lena", "Mateo", "Noor", "Oskar", "Priya",
];

/// Trades handed out round-robin.
const TRADES: &[JobType] = &[
    JobType::Engineer,
    JobType::Botanist,
    JobType::Technician,
    JobType::Areologist,
    JobType::Chef,
    JobType::Pilot,
];

// -----------------------------------------------------------------------
// Colonist
// -----------------------------------------------------------------------

/// A person living in the habitat.
#[derive(Debug)]
pub struct Colonist {
    id: WorkerId,
    name: String,
    trade: JobType,
    fitness: f64,
}

impl Colonist {
    /// Create a colonist with the given trade and fitness (0..=1).
    pub fn new(name: impl Into<String>, trade: JobType, fitness: f64) -> Self {
        Self {
            id: WorkerId::new(),
            name: name.into(),
            trade,
            fitness: fitness.clamp(0.0, 1.0),
        }
    }
}

impl Worker for Colonist {
    fn id(&self) -> WorkerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> WorkerKind {
        WorkerKind::Person
    }

    fn performance(&self) -> f64 {
        self.fitness
    }

    fn is_fit(&self) -> bool {
        self.fitness >= 0.5
    }

    fn preferred_job(&self) -> Option<JobType> {
        Some(self.trade)
    }
}

// -----------------------------------------------------------------------
// Chores
// -----------------------------------------------------------------------

/// The task currently being worked on.
#[derive(Debug, Clone)]
struct Chore {
    name: String,
    left: f64,
}

/// Task manager choosing chores by shift status.
#[derive(Debug)]
pub struct Chores {
    worker: WorkerId,
    trade: JobType,
    roster: Rc<RefCell<ShiftManager>>,
    rng: SmallRng,
    current: Option<Chore>,
    completed: u32,
    worked: f64,
}

impl Chores {
    /// Create the task manager for `worker`.
    pub fn new(
        worker: WorkerId,
        trade: JobType,
        roster: Rc<RefCell<ShiftManager>>,
        seed: u64,
    ) -> Self {
        Self {
            worker,
            trade,
            roster,
            rng: SmallRng::seed_from_u64(seed),
            current: None,
            completed: 0,
            worked: 0.0,
        }
    }

    /// Number of chores finished so far.
    pub const fn completed(&self) -> u32 {
        self.completed
    }

    /// Millisols spent on chores so far.
    pub const fn worked(&self) -> f64 {
        self.worked
    }

    fn status(&self) -> Option<WorkStatus> {
        self.roster
            .try_borrow()
            .ok()
            .and_then(|roster| roster.status(self.worker))
    }

    const fn trade_chore(&self) -> &'static str {
        match self.trade {
            JobType::Engineer => "maintain life support",
            JobType::Botanist => "tend greenhouse",
            JobType::Technician => "repair equipment",
            JobType::Areologist => "analyse samples",
            JobType::Chef => "prepare meals",
            JobType::Pilot => "service rover",
            JobType::Politician => "hold council",
        }
    }
}

impl TaskManager for Chores {
    fn has_active_task(&self) -> bool {
        self.current.is_some()
    }

    fn task_name(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.name.as_str())
    }

    fn execute_task(&mut self, time: f64, performance: f64) -> f64 {
        let Some(chore) = self.current.as_mut() else {
            return time;
        };
        // Slower workers need more time for the same chore.
        let rate = performance.max(0.1);
        let needed = chore.left / rate;
        let used = time.min(needed);
        chore.left = (chore.left - used * rate).max(0.0);
        self.worked += used;
        if chore.left <= 0.0 {
            debug!(worker = %self.worker, chore = %chore.name, "Chore finished");
            self.current = None;
            self.completed = self.completed.saturating_add(1);
        }
        time - used
    }

    fn start_new_task(&mut self, _worker: &dyn Worker) {
        let (name, span) = match self.status() {
            Some(WorkStatus::OnDuty | WorkStatus::OnCall) => (self.trade_chore(), 5.0..20.0),
            Some(WorkStatus::OnLeave) => ("off-base leave", 30.0..60.0),
            Some(WorkStatus::OffDuty) | None => ("rest", 10.0..40.0),
        };
        let left = self.rng.random_range(span);
        self.current = Some(Chore {
            name: String::from(name),
            left,
        });
    }

    fn assign_task(&mut self, task: &str) -> bool {
        if matches!(self.status(), Some(WorkStatus::OnLeave)) {
            return false;
        }
        self.current = Some(Chore {
            name: String::from(task),
            left: 15.0,
        });
        true
    }

    fn clear_all_tasks(&mut self, reason: &str) {
        if let Some(chore) = self.current.take() {
            debug!(worker = %self.worker, chore = %chore.name, reason, "Chore dropped");
        }
    }
}

// -----------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------

/// Create `count` colonists, each with a shift slot on `roster`.
pub fn spawn_colonists(
    count: u32,
    seed: u64,
    config: &MindConfig,
    roster: &Rc<RefCell<ShiftManager>>,
) -> Result<Vec<ColonistMind>, EngineError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut minds = Vec::new();
    let roll_call = NAME_POOL
        .iter()
        .cycle()
        .zip(TRADES.iter().cycle())
        .take(usize::try_from(count).unwrap_or(usize::MAX));

    for (offset, (name, trade)) in (0_u64..).zip(roll_call) {
        let colonist = Colonist::new(*name, *trade, rng.random_range(0.4..=1.0));
        let id = colonist.id();
        let shift = roster.borrow_mut().allocate_shift(id)?.shift();
        let chores = Chores::new(id, *trade, Rc::clone(roster), seed.wrapping_add(offset));
        let mind = Mind::new(colonist, chores, config.clone());
        info!(worker = %id, name = *name, trade = ?trade, shift, "Colonist arrived");
        minds.push(Rc::new(RefCell::new(mind)));
    }
    Ok(minds)
}
