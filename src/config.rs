//! Configuration management with validation and defaults

use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// Engine configuration with validation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Identity allowed to deliver randomness fulfillments. Callbacks from
    /// anyone else are rejected.
    pub oracle_identity: PlayerId,
    pub events: EventsConfig,
    pub limits: LimitsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oracle_identity: PlayerId::from("oracle"),
            events: EventsConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Broadcast channel capacity; lagging subscribers drop events.
    pub buffer_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 256,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Upper bound on a game's member capacity.
    pub max_members_ceiling: u32,
    /// Upper bound on description length in bytes.
    pub max_description_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_members_ceiling: 1024,
            max_description_bytes: 512,
        }
    }
}

impl EngineConfig {
    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.oracle_identity.0.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "oracle_identity must not be empty".to_string(),
            ));
        }

        if self.events.buffer_capacity == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "events.buffer_capacity must be > 0".to_string(),
            ));
        }

        // A capacity ceiling below two would make every game uncreatable.
        if self.limits.max_members_ceiling < 2 {
            return Err(ConfigValidationError::LogicalInconsistency(
                "limits.max_members_ceiling must be >= 2".to_string(),
            ));
        }

        if self.limits.max_description_bytes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "limits.max_description_bytes must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidValue(String),
    LogicalInconsistency(String),
    MissingRequired(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::InvalidValue(msg) => {
                write!(f, "Invalid configuration value: {}", msg)
            }
            ConfigValidationError::LogicalInconsistency(msg) => {
                write!(f, "Configuration logical inconsistency: {}", msg)
            }
            ConfigValidationError::MissingRequired(msg) => {
                write!(f, "Missing required configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}
