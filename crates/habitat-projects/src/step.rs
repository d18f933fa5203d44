//! Project steps: one unit of work bound to one stage.
//!
//! The only way to obtain a [`StepInfo`] is [`StepInfo::new`], which rejects
//! stages that carry no work. A step implementation therefore cannot target
//! `Waiting`, `Done`, or `Aborted` no matter how it is written.

use std::cell::Cell;
use std::rc::Rc;

use habitat_types::Stage;

use crate::error::ProjectError;

/// The validated identity of a step: its target stage and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInfo {
    stage: Stage,
    description: String,
}

impl StepInfo {
    /// Create step metadata, rejecting stages without work.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::IllegalStepStage`] for `Waiting`, `Done`,
    /// and `Aborted`.
    pub fn new(stage: Stage, description: impl Into<String>) -> Result<Self, ProjectError> {
        if !stage.is_work_stage() {
            return Err(ProjectError::IllegalStepStage { stage });
        }
        Ok(Self {
            stage,
            description: description.into(),
        })
    }

    /// Return the stage this step is performed in.
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Return the human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// One unit of work inside a [`Project`](crate::Project).
///
/// The project calls [`start`](Self::start) exactly once when the step
/// becomes current, [`execute`](Self::execute) once per project execution
/// while it is current, and [`complete`](Self::complete) exactly once when
/// it stops being current (its work finished, or the project was aborted
/// while it was running). A step that never becomes current sees none of
/// these calls.
pub trait ProjectStep<W: ?Sized> {
    /// Return the step's stage and description.
    fn info(&self) -> &StepInfo;

    /// Called once when the step becomes the current step.
    fn start(&mut self) {}

    /// Do one round of work for `worker`. Return `true` when the step's
    /// work is finished.
    fn execute(&mut self, worker: &W) -> bool;

    /// Called once when the step stops being current.
    fn complete(&mut self) {}
}

// ---------------------------------------------------------------------------
// CountedStep
// ---------------------------------------------------------------------------

/// Observable counters of a [`CountedStep`].
///
/// Shared through an `Rc` so the owner can keep watching the step after it
/// has been boxed into a project.
#[derive(Debug, Default)]
pub struct StepCounters {
    started: Cell<u32>,
    completed: Cell<u32>,
    work_left: Cell<u32>,
}

impl StepCounters {
    /// Number of times `start` was called.
    pub fn start_count(&self) -> u32 {
        self.started.get()
    }

    /// Number of times `complete` was called.
    pub fn end_count(&self) -> u32 {
        self.completed.get()
    }

    /// Units of work still outstanding.
    pub fn work_left(&self) -> u32 {
        self.work_left.get()
    }
}

/// A step that finishes after a fixed number of executions.
///
/// Each execution consumes one unit of work regardless of the worker.
#[derive(Debug)]
pub struct CountedStep {
    info: StepInfo,
    counters: Rc<StepCounters>,
}

impl CountedStep {
    /// Create a step needing `work` executions in `stage`.
    ///
    /// A step with zero work finishes on its first execution.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::IllegalStepStage`] if `stage` carries no work.
    pub fn new(
        stage: Stage,
        description: impl Into<String>,
        work: u32,
    ) -> Result<Self, ProjectError> {
        let info = StepInfo::new(stage, description)?;
        let counters = Rc::new(StepCounters {
            work_left: Cell::new(work),
            ..StepCounters::default()
        });
        Ok(Self { info, counters })
    }

    /// Return a handle on this step's counters.
    pub fn counters(&self) -> Rc<StepCounters> {
        Rc::clone(&self.counters)
    }
}

impl<W: ?Sized> ProjectStep<W> for CountedStep {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn start(&mut self) {
        let c = &self.counters.started;
        c.set(c.get().saturating_add(1));
    }

    fn execute(&mut self, _worker: &W) -> bool {
        let left = self.counters.work_left.get().saturating_sub(1);
        self.counters.work_left.set(left);
        left == 0
    }

    fn complete(&mut self) {
        let c = &self.counters.completed;
        c.set(c.get().saturating_add(1));
    }
}
