//! Worker minds and duty shifts for the Habitat colony simulation.
//!
//! A [`Mind`] turns the simulated time carried by each pulse into calls on
//! its worker's task manager and mission. A [`ShiftManager`] decides when
//! each worker is on duty and rotates workers through periodic leave.
//!
//! The concrete content of tasks and missions lives outside this crate; it
//! plugs in through the [`Worker`], [`TaskManager`], and [`Mission`] traits.
//!
//! # Modules
//!
//! - [`config`] -- [`MindConfig`] tuning values
//! - [`error`] -- [`AgentError`], [`MissionError`], [`ShiftError`]
//! - [`worker`] -- The [`Worker`] contract
//! - [`task`] -- The [`TaskManager`] contract
//! - [`mission`] -- The [`Mission`] contract and [`SharedMission`]
//! - [`mind`] -- The per-worker decision loop
//! - [`schedule`] -- A time-ordered [`EventSchedule`]
//! - [`shift`] -- Shift patterns, shifts, and shift slots
//! - [`roster`] -- The [`ShiftManager`] that allocates and rotates slots
//!
//! [`AgentError`]: error::AgentError
//! [`MissionError`]: error::MissionError
//! [`ShiftError`]: error::ShiftError

pub mod config;
pub mod error;
pub mod mind;
pub mod mission;
pub mod roster;
pub mod schedule;
pub mod shift;
pub mod task;
pub mod worker;

pub use config::MindConfig;
pub use error::{AgentError, MissionError, ShiftError};
pub use mind::{Mind, MindEvent, MindObserver};
pub use mission::{Mission, SharedMission};
pub use roster::{RosterEvent, ShiftManager};
pub use schedule::EventSchedule;
pub use shift::{Shift, ShiftPattern, ShiftSlot, ShiftSpec, SlotId};
pub use task::TaskManager;
pub use worker::Worker;
