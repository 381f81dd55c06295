//! Configuration for the edge router

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a routing configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for local orthogonal routing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Departure distance from a port before the first turn
    pub extension_length: f64,

    /// Uniform inflation applied to every device box
    pub obstacle_padding: f64,

    /// Obstacles farther than this from a port are ignored for that port
    pub local_search_radius: f64,

    /// Number of segments near each end that are collision-checked
    pub protected_segments_count: usize,

    /// Offset beyond an obstacle when routing around it
    pub clearance: f64,

    /// When false, edges get a plain two-segment connector
    pub enable_collision_detection: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            extension_length: 30.0,
            obstacle_padding: 10.0,
            local_search_radius: 200.0,
            protected_segments_count: 2,
            clearance: 10.0,
            enable_collision_detection: true,
        }
    }
}

/// TOML structure: `[routing]` table, every key optional
#[derive(Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    routing: RoutingConfig,
}

impl RoutingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the `[routing]` table from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load the `[routing]` table from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        Ok(parsed.routing)
    }

    /// Set the port extension length
    pub fn with_extension_length(mut self, length: f64) -> Self {
        self.extension_length = length;
        self
    }

    /// Set the obstacle padding
    pub fn with_obstacle_padding(mut self, padding: f64) -> Self {
        self.obstacle_padding = padding;
        self
    }

    /// Set the local search radius
    pub fn with_local_search_radius(mut self, radius: f64) -> Self {
        self.local_search_radius = radius;
        self
    }

    /// Set how many segments near each endpoint are checked
    pub fn with_protected_segments(mut self, count: usize) -> Self {
        self.protected_segments_count = count;
        self
    }

    /// Set the detour clearance
    pub fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    /// Enable or disable obstacle-aware routing
    pub fn with_collision_detection(mut self, enabled: bool) -> Self {
        self.enable_collision_detection = enabled;
        self
    }
}
