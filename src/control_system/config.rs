use crate::control_system::phase::Phase;
use crate::global_variables::{
    ALL_RED_SECS, BROADCAST_CAPACITY, CONFIG_PATH_ENV, DRAIN_PER_TICK, FLASHING_YELLOW_SECS,
    NON_PRIORITY_GREEN_SECS, NON_PRIORITY_YELLOW_SECS, PRIORITY_GREEN_SECS, PRIORITY_YELLOW_SECS,
    TICK_INTERVAL_MS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidNumber { field: &'static str, value: f64 },

    #[error("{field} is too long to represent as a duration (got {value} s)")]
    DwellOutOfRange { field: &'static str, value: f64 },

    #[error("tick_interval_ms must be greater than zero")]
    ZeroTickInterval,

    #[error("broadcast_capacity must be between 1 and {max} (got {value})")]
    BroadcastCapacityOutOfRange { value: usize, max: usize },
}

/// Upper bound on the snapshot channel; tokio allocates every slot up front.
pub const MAX_BROADCAST_CAPACITY: usize = 1 << 16;

/// Dwell time of every phase, in seconds. For priority green this is the minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    pub priority_green: f64,
    pub priority_yellow: f64,
    pub non_priority_green: f64,
    pub non_priority_yellow: f64,
    pub all_red: f64,
    pub flashing_yellow: f64,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            priority_green: PRIORITY_GREEN_SECS,
            priority_yellow: PRIORITY_YELLOW_SECS,
            non_priority_green: NON_PRIORITY_GREEN_SECS,
            non_priority_yellow: NON_PRIORITY_YELLOW_SECS,
            all_red: ALL_RED_SECS,
            flashing_yellow: FLASHING_YELLOW_SECS,
        }
    }
}

impl PhaseTimings {
    fn seconds(&self, phase: Phase) -> f64 {
        match phase {
            Phase::PriorityGreen => self.priority_green,
            Phase::PriorityYellow => self.priority_yellow,
            Phase::NonPriorityGreen => self.non_priority_green,
            Phase::NonPriorityYellow => self.non_priority_yellow,
            Phase::AllRed => self.all_red,
            Phase::FlashingYellow => self.flashing_yellow,
        }
    }

    /// Dwell of `phase`. Negative or NaN values read as zero, values too large
    /// for a [`Duration`] as [`Duration::MAX`].
    pub fn dwell(&self, phase: Phase) -> Duration {
        let seconds = self.seconds(phase);
        if seconds.is_nan() || seconds <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }

    fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("timings.priority_green", self.priority_green),
            ("timings.priority_yellow", self.priority_yellow),
            ("timings.non_priority_green", self.non_priority_green),
            ("timings.non_priority_yellow", self.non_priority_yellow),
            ("timings.all_red", self.all_red),
            ("timings.flashing_yellow", self.flashing_yellow),
        ]
    }
}

/// Tunables of the controller and its driver. Missing JSON fields fall back
/// to the defaults in `global_variables`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub timings: PhaseTimings,
    pub drain_per_tick: f64,
    pub tick_interval_ms: u64,
    pub broadcast_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timings: PhaseTimings::default(),
            drain_per_tick: DRAIN_PER_TICK,
            tick_interval_ms: TICK_INTERVAL_MS,
            broadcast_capacity: BROADCAST_CAPACITY,
        }
    }
}

impl ControllerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `INTERSECTION_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_json_file(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let numbers = self
            .timings
            .fields()
            .into_iter()
            .chain(std::iter::once(("drain_per_tick", self.drain_per_tick)));
        for (field, value) in numbers {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidNumber { field, value });
            }
        }
        for (field, value) in self.timings.fields() {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(ConfigError::DwellOutOfRange { field, value });
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.broadcast_capacity == 0 || self.broadcast_capacity > MAX_BROADCAST_CAPACITY {
            return Err(ConfigError::BroadcastCapacityOutOfRange {
                value: self.broadcast_capacity,
                max: MAX_BROADCAST_CAPACITY,
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
