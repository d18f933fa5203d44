//! The worker contract.
//!
//! A worker is whatever body a [`Mind`](crate::Mind) drives: a person or a
//! robot. The mind only needs to read its condition.

use habitat_types::{JobType, WorkerId, WorkerKind};

/// Read-only view of an agent that can do work.
pub trait Worker {
    /// Return the worker's id.
    fn id(&self) -> WorkerId;

    /// Return the worker's display name.
    fn name(&self) -> &str;

    /// Return whether this is a person or a robot.
    fn kind(&self) -> WorkerKind;

    /// Whether the worker can act at all (alive, powered, not broken).
    fn is_operable(&self) -> bool {
        true
    }

    /// Remaining operating power in percent (battery charge for robots).
    fn power_level(&self) -> f64 {
        100.0
    }

    /// Performance rating in `[0, 1]`, used to scale task progress.
    fn performance(&self) -> f64 {
        1.0
    }

    /// Whether the worker is healthy enough to resume mission work.
    fn is_fit(&self) -> bool {
        true
    }

    /// The job this worker would pick if it had none.
    fn preferred_job(&self) -> Option<JobType> {
        None
    }
}
