//! Error types for the habitat-world crate.

use crate::watchdog::RecoveryAction;

/// Errors raised while setting up a watchdog.
#[derive(Debug, thiserror::Error)]
pub enum WatchdogError {
    /// The watchdog configuration is unusable.
    #[error("invalid watchdog configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Failure reported by a recovery action.
///
/// Recovery failures never stop the simulation tick: the watchdog logs them
/// and carries on, so the next sampling cycle may retry or escalate.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// The action was attempted but could not be carried out.
    #[error("{action} failed: {reason}")]
    Failed {
        /// Which recovery action failed.
        action: RecoveryAction,
        /// Description of the failure.
        reason: String,
    },

    /// The monitored activity has no way to perform this action.
    #[error("{action} is not supported by this activity")]
    Unsupported {
        /// The unsupported recovery action.
        action: RecoveryAction,
    },
}
