use std::path::Path;

use serde::{Deserialize, Serialize};

/// Vertical distance between two consecutive lines of a hologram.
pub const DEFAULT_LINE_GAP: f64 = 0.25;

/// Radius (in blocks) within which observers are shown a hologram.
pub const DEFAULT_VIEW_RADIUS: u32 = 64;

/// Errors from loading a [`HologramConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the hologram service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HologramConfig {
    /// Vertical gap between lines.
    pub line_gap: f64,
    /// Proximity radius used by the tracker.
    pub view_radius: u32,
    /// Bound on queued commands. `None` means unbounded.
    pub queue_capacity: Option<usize>,
}

impl Default for HologramConfig {
    fn default() -> Self {
        Self {
            line_gap: DEFAULT_LINE_GAP,
            view_radius: DEFAULT_VIEW_RADIUS,
            queue_capacity: None,
        }
    }
}

impl HologramConfig {
    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.line_gap.is_finite() || self.line_gap <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "line_gap must be a positive number, got {}",
                self.line_gap
            )));
        }
        if self.queue_capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HologramConfig::default();
        assert_eq!(config.line_gap, 0.25);
        assert_eq!(config.view_radius, 64);
        assert!(config.queue_capacity.is_none());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = HologramConfig::from_yaml_str("view_radius: 16\n").unwrap();
        assert_eq!(config.view_radius, 16);
        assert_eq!(config.line_gap, DEFAULT_LINE_GAP);
    }

    #[test]
    fn full_yaml() {
        let yaml = "line_gap: 0.3\nview_radius: 32\nqueue_capacity: 128\n";
        let config = HologramConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.line_gap, 0.3);
        assert_eq!(config.queue_capacity, Some(128));
    }

    #[test]
    fn rejects_non_positive_gap() {
        let err = HologramConfig::from_yaml_str("line_gap: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = HologramConfig::from_yaml_str("queue_capacity: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = HologramConfig::from_yaml_str("view_radius: [nope").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = HologramConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
