//! Shared type definitions for the Habitat colony simulation.
//!
//! This crate is the single source of truth for the values that flow
//! between the clock, the agents, and the staged-workflow engine. It has
//! no simulation logic of its own beyond time arithmetic.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Project stages, work statuses, jobs, and worker kinds
//! - [`time`] -- [`MarsTime`] and the immutable [`ClockPulse`]
//! - [`temporal`] -- The [`Temporal`] capability implemented by every
//!   component that reacts to simulated time

pub mod enums;
pub mod ids;
pub mod temporal;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use enums::{JobType, Stage, WorkStatus, WorkerKind};
pub use ids::{MissionId, ProjectId, WorkerId};
pub use temporal::Temporal;
pub use time::{Boundary, ClockPulse, MILLISOLS_PER_SOL, MarsTime, SECONDS_PER_MILLISOL};
