// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Engine Configuration

use serde::{Deserialize, Serialize};

/// Default length of the full experience: three minutes.
pub const EXPERIENCE_DURATION_MS: u64 = 180_000;

/// Nominal clock increment and cadence.
pub const TICK_MS: u64 = 100;

/// Delay between survey completion and the reward request failing.
pub const REWARD_FAILURE_DELAY_MS: u64 = 2_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Fixed timing constants for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub experience_duration_ms: u64,
    pub tick_ms: u64,
    pub reward_failure_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            experience_duration_ms: EXPERIENCE_DURATION_MS,
            tick_ms: TICK_MS,
            reward_failure_delay_ms: REWARD_FAILURE_DELAY_MS,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed JSON, [`ConfigError::Invalid`] if
    /// the parsed values fail [`EngineConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.experience_duration_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "experience_duration_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.tick_ms > self.experience_duration_ms {
            return Err(ConfigError::Invalid {
                field: "tick_ms",
                reason: format!(
                    "{} exceeds experience_duration_ms {}",
                    self.tick_ms, self.experience_duration_ms
                ),
            });
        }
        Ok(())
    }
}
