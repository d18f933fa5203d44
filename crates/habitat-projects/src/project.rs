//! The staged project state machine.
//!
//! A [`Project`] starts in `Waiting` and holds a queue of remaining steps in
//! non-decreasing stage order. Each [`Project::execute`] call works on the
//! head of the queue:
//!
//! 1. If the head step has not started, the project moves to the step's
//!    stage (when different) and the step's `start` hook fires.
//! 2. The step executes once.
//! 3. If the step reports its work finished, its `complete` hook fires, it
//!    leaves the queue, and the next step (if any) becomes current at once.
//!    With no step left the project moves to `Done`.
//!
//! [`Project::abort`] moves to `Aborted` from any non-terminal stage. Once
//! `Done` or `Aborted`, execution is a no-op and mutation is refused.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use habitat_types::{ProjectId, Stage};

use crate::error::ProjectError;
use crate::step::ProjectStep;
use crate::transitions::StageTransitions;

/// Identifier of a step within one project, assigned in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepId(pub u64);

impl core::fmt::Display for StepId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct QueuedStep<W: ?Sized> {
    id: StepId,
    started: bool,
    step: Box<dyn ProjectStep<W>>,
}

/// A multi-step endeavour driven through its stages by repeated execution.
///
/// `W` is whatever the steps need to see of the worker doing the work.
pub struct Project<W: ?Sized> {
    id: ProjectId,
    name: String,
    stage: Stage,
    steps: VecDeque<QueuedStep<W>>,
    next_step: u64,
    abort_reason: Option<String>,
}

impl<W: ?Sized> core::fmt::Debug for Project<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Project")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("stage", &self.stage)
            .field("remaining_steps", &self.steps.len())
            .field("abort_reason", &self.abort_reason)
            .finish_non_exhaustive()
    }
}

impl<W: ?Sized> Project<W> {
    /// Create an empty project in `Waiting`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            stage: Stage::Waiting,
            steps: VecDeque::new(),
            next_step: 0,
            abort_reason: None,
        }
    }

    /// Return the project id.
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Return the project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the current stage.
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether the project is `Done` or `Aborted`.
    pub const fn is_finished(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Return why the project was aborted, if it was.
    pub fn abort_reason(&self) -> Option<&str> {
        self.abort_reason.as_deref()
    }

    /// Return the description of the step currently being worked on.
    pub fn current_step_description(&self) -> Option<&str> {
        self.steps
            .front()
            .filter(|q| q.started)
            .map(|q| q.step.info().description())
    }

    /// Return the number of steps not yet completed.
    pub fn remaining_steps(&self) -> usize {
        self.steps.len()
    }

    /// Queue a step at the end of the project.
    ///
    /// # Errors
    ///
    /// - [`ProjectError::Finished`] if the project is done or aborted.
    /// - [`ProjectError::NonMonotonicStep`] if the step's stage precedes the
    ///   stage of the last queued step, or the project's current stage.
    pub fn add_step(&mut self, step: Box<dyn ProjectStep<W>>) -> Result<StepId, ProjectError> {
        self.ensure_open()?;
        let stage = step.info().stage();
        let last = self
            .steps
            .back()
            .map_or(self.stage, |q| q.step.info().stage());
        if stage < last {
            return Err(ProjectError::NonMonotonicStep { stage, last });
        }

        let id = StepId(self.next_step);
        self.next_step = self.next_step.saturating_add(1);
        debug!(
            project = %self.name,
            step = %id,
            %stage,
            description = step.info().description(),
            "Step queued"
        );
        self.steps.push_back(QueuedStep {
            id,
            started: false,
            step,
        });
        Ok(id)
    }

    /// Remove a step that has not been started yet.
    ///
    /// # Errors
    ///
    /// - [`ProjectError::Finished`] if the project is done or aborted.
    /// - [`ProjectError::StepNotFound`] if no remaining step has this id.
    /// - [`ProjectError::StepStarted`] if the step is already running.
    pub fn remove_step(&mut self, id: StepId) -> Result<(), ProjectError> {
        self.ensure_open()?;
        let position = self
            .steps
            .iter()
            .position(|q| q.id == id)
            .ok_or(ProjectError::StepNotFound { id })?;
        if let Some(queued) = self.steps.get(position)
            && queued.started
        {
            return Err(ProjectError::StepStarted {
                id,
                description: queued.step.info().description().to_owned(),
            });
        }
        let _removed = self.steps.remove(position);
        debug!(project = %self.name, step = %id, "Step removed");
        Ok(())
    }

    /// Do one round of work on the current step for `worker`.
    ///
    /// Returns the stage after the call. A finished project is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::IllegalTransition`] if a stage change is
    /// refused by the transition table.
    pub fn execute(&mut self, worker: &W) -> Result<Stage, ProjectError> {
        if self.is_finished() {
            return Ok(self.stage);
        }
        if self.steps.is_empty() {
            self.move_to(Stage::Done)?;
            return Ok(self.stage);
        }

        self.enter_head()?;
        let finished = self
            .steps
            .front_mut()
            .is_some_and(|q| q.step.execute(worker));

        if finished {
            if let Some(mut done) = self.steps.pop_front() {
                done.step.complete();
                debug!(
                    project = %self.name,
                    step = %done.id,
                    description = done.step.info().description(),
                    "Step completed"
                );
            }
            if self.steps.is_empty() {
                self.move_to(Stage::Done)?;
            } else {
                self.enter_head()?;
            }
        }
        Ok(self.stage)
    }

    /// Stop the project for good.
    ///
    /// The running step, if any, receives its `complete` hook; steps that
    /// were never reached are left untouched. Aborting a finished project
    /// is a no-op.
    pub fn abort(&mut self, reason: impl Into<String>) {
        if self.is_finished() {
            return;
        }
        let reason = reason.into();
        if let Some(current) = self.steps.front_mut()
            && current.started
        {
            current.step.complete();
        }
        info!(
            project = %self.name,
            from = %self.stage,
            reason = %reason,
            "Project aborted"
        );
        self.stage = Stage::Aborted;
        self.abort_reason = Some(reason);
    }

    // ---- internals ----

    fn ensure_open(&self) -> Result<(), ProjectError> {
        if self.is_finished() {
            return Err(ProjectError::Finished {
                name: self.name.clone(),
                stage: self.stage,
            });
        }
        Ok(())
    }

    /// Make the head step current: move to its stage and start it once.
    fn enter_head(&mut self) -> Result<(), ProjectError> {
        let Some(head) = self.steps.front() else {
            return Ok(());
        };
        if head.started {
            return Ok(());
        }
        let stage = head.step.info().stage();
        if stage != self.stage {
            self.move_to(stage)?;
        }
        if let Some(head) = self.steps.front_mut() {
            head.started = true;
            head.step.start();
            debug!(
                project = %self.name,
                step = %head.id,
                description = head.step.info().description(),
                "Step started"
            );
        }
        Ok(())
    }

    fn move_to(&mut self, to: Stage) -> Result<(), ProjectError> {
        StageTransitions::check(self.stage, to)?;
        info!(project = %self.name, from = %self.stage, %to, "Project stage changed");
        self.stage = to;
        Ok(())
    }
}
