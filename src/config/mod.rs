// src/config/mod.rs
//! Configuration management for the acquisition engine

pub mod constants;
pub mod loader;

pub use loader::{ConfigError, ConfigLoader};

use crate::hal::simulator::SimulatorConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete system configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemConfig {
    /// Engine timing and pool settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Settings for the simulated camera, when one is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulator: Option<SimulatorConfig>,
}

/// Acquisition engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Number of reusable buffers; also the result queue capacity
    #[serde(default = "defaults::pool_capacity")]
    pub pool_capacity: usize,

    /// Per-fill timeout handed to the source, milliseconds
    #[serde(default = "defaults::fill_timeout_ms")]
    pub fill_timeout_ms: u64,

    /// How long one checkout attempt waits for a free buffer, milliseconds
    #[serde(default = "defaults::checkout_timeout_ms")]
    pub checkout_timeout_ms: u64,

    /// Checkout retries after an exhausted pool before the session ends
    #[serde(default = "defaults::checkout_retries")]
    pub checkout_retries: u32,

    /// Base delay between checkout retries, milliseconds; scales linearly
    #[serde(default = "defaults::retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::{acquisition, pool};

    pub fn pool_capacity() -> usize {
        pool::DEFAULT_CAPACITY
    }
    pub fn fill_timeout_ms() -> u64 {
        acquisition::DEFAULT_FILL_TIMEOUT_MS
    }
    pub fn checkout_timeout_ms() -> u64 {
        pool::DEFAULT_CHECKOUT_TIMEOUT_MS
    }
    pub fn checkout_retries() -> u32 {
        acquisition::DEFAULT_CHECKOUT_RETRIES
    }
    pub fn retry_backoff_ms() -> u64 {
        acquisition::DEFAULT_RETRY_BACKOFF_MS
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_capacity: defaults::pool_capacity(),
            fill_timeout_ms: defaults::fill_timeout_ms(),
            checkout_timeout_ms: defaults::checkout_timeout_ms(),
            checkout_retries: defaults::checkout_retries(),
            retry_backoff_ms: defaults::retry_backoff_ms(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            simulator: None,
        }
    }
}

impl EngineConfig {
    /// Validate field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_capacity == 0 || self.pool_capacity > constants::pool::MAX_CAPACITY {
            return Err(ConfigError::Invalid {
                field: "engine.pool_capacity",
                reason: format!(
                    "must be 1..={}, got {}",
                    constants::pool::MAX_CAPACITY,
                    self.pool_capacity
                ),
            });
        }
        if self.fill_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "engine.fill_timeout_ms",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Per-fill timeout as a [`Duration`].
    pub fn fill_timeout(&self) -> Duration {
        Duration::from_millis(self.fill_timeout_ms)
    }

    /// Checkout timeout as a [`Duration`].
    pub fn checkout_timeout(&self) -> Duration {
        Duration::from_millis(self.checkout_timeout_ms)
    }

    /// Retry backoff base as a [`Duration`].
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl SystemConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if let Some(simulator) = &self.simulator {
            simulator.validate().map_err(|err| ConfigError::Invalid {
                field: "simulator",
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }
}
