//! Surface geometry and stall detection for the Habitat colony simulation.
//!
//! # Modules
//!
//! - [`coordinates`] -- Surface positions and the [`Distance`] metric
//! - [`error`] -- Error types ([`WatchdogError`], [`RecoveryError`])
//! - [`watchdog`] -- Staged recovery for goal-seeking activities that stall
//!
//! [`Distance`]: coordinates::Distance
//! [`WatchdogError`]: error::WatchdogError
//! [`RecoveryError`]: error::RecoveryError

pub mod coordinates;
pub mod error;
pub mod watchdog;

pub use coordinates::{Coordinates, Distance, MARS_RADIUS_KM};
pub use error::{RecoveryError, WatchdogError};
pub use watchdog::{
    RecoveryAction, RecoveryCallbacks, RecoveryHandler, StuckWatchdog, WatchdogConfig,
    WatchdogState,
};
