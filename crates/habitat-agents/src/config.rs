//! Tuning values for the worker decision loop.
//!
//! Loaded as the `agents` section of `habitat-config.yaml`; every field has
//! a default so a partial section is fine.

use serde::{Deserialize, Serialize};

/// Decision-loop tuning shared by every [`Mind`](crate::Mind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindConfig {
    /// Largest slice of time (millisols) handed to a task in one call.
    /// Zero means "hand over all remaining time at once".
    #[serde(default = "default_standard_pulse_time")]
    pub standard_pulse_time: f64,

    /// Power level (percent) at or below which a worker counts as low on
    /// power.
    #[serde(default = "default_low_power_threshold")]
    pub low_power_threshold: f64,

    /// Minimum simulated time (millisols) between two warnings of the same
    /// kind for one worker.
    #[serde(default = "default_low_power_warning_interval")]
    pub low_power_warning_interval: f64,

    /// Most task calls allowed in one slice.
    #[serde(default = "default_max_execute")]
    pub max_execute: u32,

    /// Most consecutive task calls that consume no time before the task is
    /// dropped. The count runs across slices and pulses.
    #[serde(default = "default_max_zero_execute")]
    pub max_zero_execute: u32,

    /// Lowest performance rating at which a worker accepts a new mission.
    #[serde(default = "default_min_mission_performance")]
    pub min_mission_performance: f64,
}

impl Default for MindConfig {
    fn default() -> Self {
        Self {
            standard_pulse_time: default_standard_pulse_time(),
            low_power_threshold: default_low_power_threshold(),
            low_power_warning_interval: default_low_power_warning_interval(),
            max_execute: default_max_execute(),
            max_zero_execute: default_max_zero_execute(),
            min_mission_performance: default_min_mission_performance(),
        }
    }
}

const fn default_standard_pulse_time() -> f64 {
    0.5
}

const fn default_low_power_threshold() -> f64 {
    5.0
}

const fn default_low_power_warning_interval() -> f64 {
    50.0
}

const fn default_max_execute() -> u32 {
    100
}

const fn default_max_zero_execute() -> u32 {
    100
}

const fn default_min_mission_performance() -> f64 {
    0.3
}
