//! Staged project engine for the Habitat colony simulation.
//!
//! A [`Project`] is an ordered queue of [`ProjectStep`]s, each bound to one
//! work [`Stage`]. Executing the project drives it forward through
//! `Waiting -> Preparation -> Active -> Closedown -> Done`, or sends it to
//! `Aborted`. Every stage change is checked against the explicit
//! [`StageTransitions`] table.
//!
//! # Modules
//!
//! - [`error`] -- [`ProjectError`]
//! - [`transitions`] -- The legal stage transition table
//! - [`step`] -- [`StepInfo`], the [`ProjectStep`] trait, and [`CountedStep`]
//! - [`project`] -- The [`Project`] state machine
//! - [`board`] -- [`ProjectBoard`], a pulse-driven host for projects
//!
//! [`Stage`]: habitat_types::Stage

pub mod board;
pub mod error;
pub mod project;
pub mod step;
pub mod transitions;

pub use board::ProjectBoard;
pub use error::ProjectError;
pub use project::{Project, StepId};
pub use step::{CountedStep, ProjectStep, StepCounters, StepInfo};
pub use transitions::StageTransitions;
