use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::core::{DEFAULT_SIDE, Triangle};

/// Rendered size of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl WidgetSize {
    /// Edge length of the square triangle area in pixels
    pub fn pixels(&self) -> u32 {
        match self {
            WidgetSize::Sm => 192,
            WidgetSize::Md => 256,
            WidgetSize::Lg => 384,
        }
    }
}

impl std::str::FromStr for WidgetSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sm" => Ok(WidgetSize::Sm),
            "md" => Ok(WidgetSize::Md),
            "lg" => Ok(WidgetSize::Lg),
            other => Err(ConfigError::UnknownSize(other.to_string())),
        }
    }
}

/// User-facing configuration for a dosha balance widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub size: WidgetSize,
    pub interactive: bool,
    pub settle_delay_ms: u64,
    pub triangle_side: f64,
}

impl WidgetConfig {
    pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
    pub const MAX_SETTLE_DELAY_MS: u64 = 60_000;
    pub const MIN_SIDE: f64 = 50.0;
    pub const MAX_SIDE: f64 = 1000.0;

    /// Parses a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WidgetConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Loads a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn sanitize_side(value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(Self::MIN_SIDE, Self::MAX_SIDE)
        } else {
            DEFAULT_SIDE
        }
    }

    /// Returns a copy with every field pulled into its valid range
    pub fn sanitized(mut self) -> Self {
        self.triangle_side = Self::sanitize_side(self.triangle_side);
        self.settle_delay_ms = self.settle_delay_ms.min(Self::MAX_SETTLE_DELAY_MS);
        self
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn triangle(&self) -> Triangle {
        Triangle::equilateral(Self::sanitize_side(self.triangle_side))
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            size: WidgetSize::default(),
            interactive: false,
            settle_delay_ms: Self::DEFAULT_SETTLE_DELAY_MS,
            triangle_side: DEFAULT_SIDE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown widget size '{0}' (expected sm, md or lg)")]
    UnknownSize(String),
}
