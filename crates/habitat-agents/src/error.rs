//! Error types for the habitat-agents crate.
//!
//! Mind operations, mission membership, and shift setup each have their own
//! enum. Mission errors surface through [`AgentError`] when they interrupt a
//! mind operation.

use habitat_types::{JobType, MissionId, WorkerId};

/// Failures reported by a [`Mission`](crate::Mission) implementation.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    /// The mission is being accessed further up the call stack.
    #[error("mission is busy")]
    Busy,

    /// The mission refused to take the worker on.
    #[error("mission {mission} rejected worker {worker}: {reason}")]
    MemberRejected {
        /// The mission.
        mission: MissionId,
        /// The rejected worker.
        worker: WorkerId,
        /// Why the worker was rejected.
        reason: String,
    },

    /// The mission could not do its work this time.
    #[error("mission {mission} failed: {reason}")]
    Failed {
        /// The mission.
        mission: MissionId,
        /// Description of the failure.
        reason: String,
    },
}

/// Errors raised by [`Mind`](crate::Mind) operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A mission operation failed; nothing about the mind changed.
    #[error("mission error: {source}")]
    Mission {
        /// The underlying mission error.
        #[from]
        source: MissionError,
    },

    /// The worker's current job is locked until the next sol.
    #[error("worker {worker} is locked into {current:?}; cannot switch to {requested:?}")]
    JobLocked {
        /// The worker.
        worker: WorkerId,
        /// The locked job.
        current: JobType,
        /// The job that was asked for.
        requested: JobType,
    },

    /// The mind has been retired and accepts no further changes.
    #[error("worker {worker} is retired")]
    Retired {
        /// The worker.
        worker: WorkerId,
    },
}

/// Errors raised while building a shift pattern or managing slots.
#[derive(Debug, thiserror::Error)]
pub enum ShiftError {
    /// The shift pattern is unusable.
    #[error("invalid shift pattern: {reason}")]
    InvalidPattern {
        /// Explanation of what is wrong with the pattern.
        reason: String,
    },

    /// The worker already holds a shift slot.
    #[error("worker {worker} already has a shift slot")]
    AlreadyAllocated {
        /// The worker.
        worker: WorkerId,
    },

    /// The worker holds no shift slot.
    #[error("worker {worker} has no shift slot")]
    NotAllocated {
        /// The worker.
        worker: WorkerId,
    },
}
