use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read layout config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid layout config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

/// Spacing constants for turning a level partition into canvas coordinates.
///
/// Missing fields in a config file take their default value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// X of the first level.
    pub base_x: f64,
    /// Horizontal distance between consecutive levels.
    pub level_spacing: f64,
    /// Vertical distance between nodes sharing a level.
    pub node_spacing: f64,
    /// Line each level is vertically centred on.
    pub center_y: f64,
    /// No node is placed above this y.
    pub min_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_x: 100.0,
            level_spacing: 300.0,
            node_spacing: 150.0,
            center_y: 300.0,
            min_y: 50.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("base_x", self.base_x),
            ("level_spacing", self.level_spacing),
            ("node_spacing", self.node_spacing),
            ("center_y", self.center_y),
            ("min_y", self.min_y),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        for (field, value) in [
            ("level_spacing", self.level_spacing),
            ("node_spacing", self.node_spacing),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}
