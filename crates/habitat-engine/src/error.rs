//! Error types for the colony engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the colony engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: habitat_core::ConfigError,
    },

    /// Master clock initialization failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: habitat_core::ClockError,
    },

    /// The configured shift pattern is unusable.
    #[error("shift error: {source}")]
    Shift {
        /// The underlying shift error.
        #[from]
        source: habitat_agents::ShiftError,
    },

    /// A colonist could not be set up.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: habitat_agents::AgentError,
    },

    /// A construction project could not be assembled.
    #[error("project error: {source}")]
    Project {
        /// The underlying project error.
        #[from]
        source: habitat_projects::ProjectError,
    },

    /// The rover watchdog configuration is unusable.
    #[error("watchdog error: {source}")]
    Watchdog {
        /// The underlying watchdog error.
        #[from]
        source: habitat_world::WatchdogError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: habitat_core::RunnerError,
    },
}
