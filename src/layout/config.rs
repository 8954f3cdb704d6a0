//! Configuration for packing, animation and drag behavior

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a grid configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read grid config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse grid config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid grid config: {0}")]
    Invalid(String),
}

/// Configuration options for a grid instance
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Fixed number of columns
    pub column_count: usize,

    /// Duration of reorder and release transitions, in milliseconds
    pub animation_duration_ms: u64,

    /// Pointer travel (px) after which a press becomes a drag
    pub click_threshold: f64,

    /// Fraction of the scroll viewport, per edge, that triggers auto-scroll
    pub autoscroll_margin: f64,

    /// Scroll step per frame when the pointer sits on the viewport edge
    pub autoscroll_speed: f64,

    /// Upper bound on row retries during one pack
    pub pack_attempt_limit: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            column_count: 4,
            animation_duration_ms: 200,
            click_threshold: 0.0,
            autoscroll_margin: 0.1,
            autoscroll_speed: 20.0,
            pack_attempt_limit: 10_000,
        }
    }
}

/// TOML structure for a standalone config file
#[derive(Deserialize)]
struct TomlGridFile {
    #[serde(default)]
    grid: GridConfig,
}

impl GridConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the `[grid]` table of a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the `[grid]` table of a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlGridFile = toml::from_str(content)?;
        parsed.grid.validate()?;
        Ok(parsed.grid)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.column_count == 0 {
            return Err(ConfigError::Invalid("column_count must be at least 1".into()));
        }
        if !(0.0..=0.5).contains(&self.autoscroll_margin) {
            return Err(ConfigError::Invalid(format!(
                "autoscroll_margin must be within 0..=0.5, got {}",
                self.autoscroll_margin
            )));
        }
        Ok(())
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// Set the column count
    pub fn with_column_count(mut self, columns: usize) -> Self {
        self.column_count = columns;
        self
    }

    /// Set the transition duration
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration_ms = duration.as_millis() as u64;
        self
    }

    /// Set the click threshold
    pub fn with_click_threshold(mut self, threshold: f64) -> Self {
        self.click_threshold = threshold;
        self
    }

    /// Set the auto-scroll trigger margin and maximum speed
    pub fn with_autoscroll(mut self, margin: f64, speed: f64) -> Self {
        self.autoscroll_margin = margin;
        self.autoscroll_speed = speed;
        self
    }

    /// Set the packing retry bound
    pub fn with_pack_attempt_limit(mut self, limit: usize) -> Self {
        self.pack_attempt_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.column_count, 4);
        assert_eq!(config.animation_duration(), Duration::from_millis(200));
        assert_eq!(config.click_threshold, 0.0);
        assert_eq!(config.autoscroll_margin, 0.1);
        assert_eq!(config.autoscroll_speed, 20.0);
        assert_eq!(config.pack_attempt_limit, 10_000);
    }

    #[test]
    fn test_builder_pattern() {
        let config = GridConfig::new()
            .with_column_count(3)
            .with_animation_duration(Duration::from_millis(120))
            .with_autoscroll(0.2, 5.0);

        assert_eq!(config.column_count, 3);
        assert_eq!(config.animation_duration_ms, 120);
        assert_eq!(config.autoscroll_margin, 0.2);
        assert_eq!(config.autoscroll_speed, 5.0);
    }

    #[test]
    fn test_from_toml_partial_table() {
        let config = GridConfig::from_toml_str(
            r#"
            [grid]
            column_count = 6
            animation_duration_ms = 150
            "#,
        )
        .unwrap();
        assert_eq!(config.column_count, 6);
        assert_eq!(config.animation_duration_ms, 150);
        assert_eq!(config.autoscroll_margin, 0.1);
    }

    #[test]
    fn test_from_toml_rejects_zero_columns() {
        let err = GridConfig::from_toml_str("[grid]\ncolumn_count = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_toml_syntax_error() {
        let err = GridConfig::from_toml_str("[grid\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
