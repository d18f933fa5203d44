//! Configuration loading and typed config structures for the Habitat
//! simulation.
//!
//! The canonical configuration lives in `habitat-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every section and
//! every field is optional; missing values take the defaults below.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::warn;

use habitat_agents::{MindConfig, ShiftError, ShiftPattern, ShiftSpec};
use habitat_world::WatchdogConfig;

/// Environment variable overriding `world.seed`.
pub const SEED_ENV_VAR: &str = "HABITAT_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `habitat-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, Earth epoch).
    #[serde(default)]
    pub world: WorldConfig,

    /// Start time and pulse width.
    #[serde(default)]
    pub time: TimeConfig,

    /// Worker decision-loop tuning.
    #[serde(default)]
    pub agents: MindConfig,

    /// Duty shift pattern and rotation policy.
    #[serde(default)]
    pub shifts: ShiftsConfig,

    /// Stall detection tuning.
    #[serde(default)]
    pub watchdog: WatchdogConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `HABITAT_SEED` environment variable overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        let seed = std::env::var(SEED_ENV_VAR).ok();
        self.world.apply_seed_override(seed.as_deref());
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable colony name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Earth instant of the mission start (sol 1, millisol 0).
    #[serde(default = "default_earth_epoch")]
    pub earth_epoch: DateTime<Utc>,
}

impl WorldConfig {
    /// Replace the seed with `value` when it parses as a `u64`.
    ///
    /// An unparsable value is logged and ignored.
    pub fn apply_seed_override(&mut self, value: Option<&str>) {
        let Some(raw) = value else {
            return;
        };
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = seed,
            Err(err) => warn!(
                var = SEED_ENV_VAR,
                value = raw,
                error = %err,
                "Ignoring seed override"
            ),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            earth_epoch: default_earth_epoch(),
        }
    }
}

/// Start time and pulse width.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeConfig {
    /// Mission sol the clock starts on (1-based).
    #[serde(default = "default_start_sol")]
    pub start_sol: u32,

    /// Time of sol the clock starts at, in `[0, 1000)`.
    #[serde(default)]
    pub start_millisol: f64,

    /// Simulated millisols covered by one standard pulse.
    #[serde(default = "default_millisols_per_pulse")]
    pub millisols_per_pulse: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            start_sol: default_start_sol(),
            start_millisol: 0.0,
            millisols_per_pulse: default_millisols_per_pulse(),
        }
    }
}

/// Duty shift pattern and rotation policy.
///
/// Validated into a [`ShiftPattern`] by [`ShiftsConfig::pattern`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShiftsConfig {
    /// Shift definitions in cycle order.
    #[serde(default = "default_shift_specs")]
    pub pattern: Vec<ShiftSpec>,

    /// Sols between two leave rotations.
    #[serde(default = "default_rotation_sols")]
    pub rotation_sols: u32,

    /// Sols a rotated worker stays on leave.
    #[serde(default = "default_rotation_leave_sols")]
    pub rotation_leave_sols: u32,

    /// Percentage of each shift sent on leave per rotation.
    #[serde(default = "default_max_on_leave")]
    pub max_on_leave: u32,
}

impl ShiftsConfig {
    /// Validate the section into a [`ShiftPattern`].
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::InvalidPattern`] if the shifts do not tile the
    /// sol or the rotation values are out of range.
    pub fn pattern(&self) -> Result<ShiftPattern, ShiftError> {
        ShiftPattern::new(
            self.pattern.clone(),
            self.rotation_sols,
            self.rotation_leave_sols,
            self.max_on_leave,
        )
    }
}

impl Default for ShiftsConfig {
    fn default() -> Self {
        Self {
            pattern: default_shift_specs(),
            rotation_sols: default_rotation_sols(),
            rotation_leave_sols: default_rotation_leave_sols(),
            max_on_leave: default_max_on_leave(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Simulation boundary configuration.
///
/// A value of 0 for `max_sols` or `max_pulses` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Sols of simulated time to run before stopping (0 = unlimited).
    #[serde(default = "default_max_sols")]
    pub max_sols: u32,

    /// Pulses to run before stopping (0 = unlimited).
    #[serde(default)]
    pub max_pulses: u64,

    /// Number of colonists the engine creates at start-up.
    #[serde(default = "default_colony_size")]
    pub colony_size: u32,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_sols: default_max_sols(),
            max_pulses: 0,
            colony_size: default_colony_size(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Schiaparelli Base")
}

const fn default_seed() -> u64 {
    42
}

fn default_earth_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2043, 9, 30, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

const fn default_start_sol() -> u32 {
    1
}

const fn default_millisols_per_pulse() -> f64 {
    1.0
}

fn default_shift_specs() -> Vec<ShiftSpec> {
    ShiftPattern::standard().shifts().to_vec()
}

const fn default_rotation_sols() -> u32 {
    10
}

const fn default_rotation_leave_sols() -> u32 {
    1
}

const fn default_max_on_leave() -> u32 {
    10
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_max_sols() -> u32 {
    3
}

const fn default_colony_size() -> u32 {
    6
}
