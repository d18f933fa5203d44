//! Master clock, pulse delivery, and run loop for the Habitat simulation.
//!
//! This crate owns the one authoritative clock and the dispatcher that hands
//! every pulse to the registered listeners, in registration order, before
//! the next pulse is produced.
//!
//! # Modules
//!
//! - [`clock`] -- [`MasterClock`]: advances simulated time and stamps pulses.
//! - [`config`] -- Configuration loading from `habitat-config.yaml` into
//!   strongly-typed structs.
//! - [`dispatch`] -- [`PulseDispatcher`]: ordered, optionally throttled
//!   delivery to [`Temporal`] listeners.
//! - [`tick`] -- One tick: produce a pulse and deliver it.
//! - [`runner`] -- Bounded run loop around [`tick::run_tick`].
//!
//! [`MasterClock`]: clock::MasterClock
//! [`PulseDispatcher`]: dispatch::PulseDispatcher
//! [`Temporal`]: habitat_types::Temporal

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod runner;
pub mod tick;

pub use clock::{ClockError, MasterClock};
pub use config::{ConfigError, SimulationConfig};
pub use dispatch::{DeliveryReport, DispatchError, ListenerId, PulseDispatcher};
pub use runner::{
    NoOpCallback, RunnerError, SimulationEndReason, SimulationResult, TickCallback,
    log_simulation_end, run_simulation,
};
pub use tick::{Simulation, TickError, TickSummary, run_tick};
