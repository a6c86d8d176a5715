//! Configuration management for the pose filters and the stream front-end

use crate::constants::{
    DEFAULT_FRAME_INTERVAL_MS, DEFAULT_OUTPUT_PRECISION, DEFAULT_PREDICTOR_ALPHA, DEFAULT_PREDICTOR_DELTA_MS,
    DEFAULT_SMOOTHER_ALPHA, DEFAULT_SMOOTHER_GAMMA, DISABLED_THRESHOLD,
};
use crate::tracker::PoseTracker;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_disabled(threshold: &f64) -> bool {
    *threshold == DISABLED_THRESHOLD
}

/// Persisted parameters of a DES smoother
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SmootherConfig {
    /// Translation level coefficient, (0, 1]
    pub trans_alpha: f64,

    /// Translation trend coefficient, [0, 1]
    pub trans_gamma: f64,

    /// Rotation level coefficient, (0, 1]
    pub rot_alpha: f64,

    /// Rotation trend coefficient, [0, 1]
    pub rot_gamma: f64,

    /// Maximum distance between consecutive raw samples; `<= 0` disables
    #[serde(skip_serializing_if = "is_disabled")]
    pub trans_threshold: f64,

    /// Maximum angle (radians) between consecutive raw samples; `<= 0` disables
    #[serde(skip_serializing_if = "is_disabled")]
    pub rot_threshold: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self::uniform(DEFAULT_SMOOTHER_ALPHA, DEFAULT_SMOOTHER_GAMMA)
    }
}

impl SmootherConfig {
    /// Same alpha and gamma for translation and rotation, gating disabled
    #[must_use]
    pub const fn uniform(alpha: f64, gamma: f64) -> Self {
        Self {
            trans_alpha: alpha,
            trans_gamma: gamma,
            rot_alpha: alpha,
            rot_gamma: gamma,
            trans_threshold: DISABLED_THRESHOLD,
            rot_threshold: DISABLED_THRESHOLD,
        }
    }

    /// Check coefficient ranges
    ///
    /// # Errors
    ///
    /// Returns an error if an alpha is outside (0, 1] or a gamma outside [0, 1]
    pub fn validate(&self) -> Result<()> {
        let alpha_ok = |a: f64| a > 0.0 && a <= 1.0;
        let gamma_ok = |g: f64| (0.0..=1.0).contains(&g);

        if !alpha_ok(self.trans_alpha) || !alpha_ok(self.rot_alpha) {
            return Err(Error::FilterError(format!(
                "Alpha must be in (0, 1], got translation {} and rotation {}",
                self.trans_alpha, self.rot_alpha
            )));
        }
        if !gamma_ok(self.trans_gamma) || !gamma_ok(self.rot_gamma) {
            return Err(Error::FilterError(format!(
                "Gamma must be in [0, 1], got translation {} and rotation {}",
                self.trans_gamma, self.rot_gamma
            )));
        }
        Ok(())
    }

    /// Serialize to a YAML document
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize smoother: {e}")))
    }

    /// Parse and validate a YAML document; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a value is out of range
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse smoother: {e}")))?;
        config.validate().map_err(|e| Error::ConfigError(e.to_string()))?;
        Ok(config)
    }
}

/// Persisted parameters of a DES predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PredictorConfig {
    /// Translation smoothing coefficient, (0, 1)
    pub trans_alpha: f64,

    /// Rotation smoothing coefficient, (0, 1)
    pub rot_alpha: f64,

    /// Milliseconds between two samples, used to turn a horizon into a step count
    #[serde(rename = "Delta")]
    pub delta_ms: u32,

    /// Maximum distance between consecutive raw samples; `<= 0` disables
    #[serde(skip_serializing_if = "is_disabled")]
    pub trans_threshold: f64,

    /// Maximum angle (radians) between consecutive raw samples; `<= 0` disables
    #[serde(skip_serializing_if = "is_disabled")]
    pub rot_threshold: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self::uniform(DEFAULT_PREDICTOR_ALPHA, DEFAULT_PREDICTOR_DELTA_MS)
    }
}

impl PredictorConfig {
    /// Same alpha for translation and rotation, gating disabled
    #[must_use]
    pub const fn uniform(alpha: f64, delta_ms: u32) -> Self {
        Self {
            trans_alpha: alpha,
            rot_alpha: alpha,
            delta_ms,
            trans_threshold: DISABLED_THRESHOLD,
            rot_threshold: DISABLED_THRESHOLD,
        }
    }

    /// Check coefficient ranges
    ///
    /// # Errors
    ///
    /// Returns an error if an alpha is outside (0, 1) or the delta is zero
    pub fn validate(&self) -> Result<()> {
        let alpha_ok = |a: f64| a > 0.0 && a < 1.0;

        if !alpha_ok(self.trans_alpha) || !alpha_ok(self.rot_alpha) {
            return Err(Error::FilterError(format!(
                "Alpha must be in (0, 1), got translation {} and rotation {}",
                self.trans_alpha, self.rot_alpha
            )));
        }
        if self.delta_ms == 0 {
            return Err(Error::FilterError("Delta must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Serialize to a YAML document
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize predictor: {e}")))
    }

    /// Parse and validate a YAML document; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a value is out of range
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse predictor: {e}")))?;
        config.validate().map_err(|e| Error::ConfigError(e.to_string()))?;
        Ok(config)
    }
}

/// Filters attached to one tracked entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Smoother applied to every observation
    pub smoother: Option<SmootherConfig>,

    /// Predictor used to bridge missing observations
    pub predictor: Option<PredictorConfig>,

    /// Missing observations bridged before the pose is reported lost; negative holds forever
    pub max_dropouts: i32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            smoother: Some(SmootherConfig::uniform(0.5, 0.5)),
            predictor: Some(PredictorConfig::default()),
            max_dropouts: 5,
        }
    }
}

/// Stream front-end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Milliseconds between two input lines
    pub frame_interval_ms: f64,

    /// Decimals written per output value
    pub precision: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            precision: DEFAULT_OUTPUT_PRECISION,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter configuration
    pub tracking: TrackingConfig,

    /// Stream configuration
    pub stream: StreamConfig,
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or validated
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the tracking pipeline described by this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a filter configuration is invalid
    pub fn create_tracker(&self) -> Result<PoseTracker> {
        PoseTracker::from_config(&self.tracking)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if let Some(smoother) = &self.tracking.smoother {
            smoother.validate().map_err(|e| Error::ConfigError(e.to_string()))?;
        }
        if let Some(predictor) = &self.tracking.predictor {
            predictor.validate().map_err(|e| Error::ConfigError(e.to_string()))?;
        }

        if !(self.stream.frame_interval_ms.is_finite() && self.stream.frame_interval_ms > 0.0) {
            return Err(Error::ConfigError("Frame interval must be a positive number".to_string()));
        }
        if self.stream.precision > 17 {
            return Err(Error::ConfigError("Precision must be at most 17 decimals".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Pose filter configuration

# Filters for the tracked entity
tracking:
  smoother:
    TransAlpha: 0.5
    TransGamma: 0.5
    RotAlpha: 0.5
    RotGamma: 0.5
    # TransThreshold: 0.25
    # RotThreshold: 0.5
  predictor:
    TransAlpha: 0.5
    RotAlpha: 0.5
    Delta: 50
  max_dropouts: 5

# Input stream settings
stream:
  frame_interval_ms: 33.333
  precision: 6
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.tracking.smoother, Some(SmootherConfig::uniform(0.5, 0.5)));
        assert_eq!(config.tracking.predictor, Some(PredictorConfig::uniform(0.5, 50)));
        assert_eq!(config.tracking.max_dropouts, 5);
        assert_eq!(config.stream.precision, 6);
    }

    #[test]
    fn test_smoother_keys() {
        let config = SmootherConfig {
            trans_threshold: 0.25,
            ..SmootherConfig::uniform(0.3, 0.6)
        };
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("TransAlpha: 0.3"));
        assert!(yaml.contains("RotGamma: 0.6"));
        assert!(yaml.contains("TransThreshold: 0.25"));
        assert!(!yaml.contains("RotThreshold"));
    }

    #[test]
    fn test_predictor_keys() {
        let yaml = PredictorConfig::uniform(0.4, 20).to_yaml().unwrap();
        assert!(yaml.contains("Delta: 20"));
        assert!(!yaml.contains("TransThreshold"));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let smoother = SmootherConfig::from_yaml("TransAlpha: 0.25\n").unwrap();
        assert_eq!(smoother.trans_alpha, 0.25);
        assert_eq!(smoother.rot_alpha, DEFAULT_SMOOTHER_ALPHA);
        assert_eq!(smoother.trans_threshold, DISABLED_THRESHOLD);

        let predictor = PredictorConfig::from_yaml("RotThreshold: 0.2\n").unwrap();
        assert_eq!(predictor.delta_ms, DEFAULT_PREDICTOR_DELTA_MS);
        assert_eq!(predictor.rot_threshold, 0.2);
    }

    #[test]
    fn test_load_validates_ranges() {
        assert!(matches!(SmootherConfig::from_yaml("TransAlpha: 0\n"), Err(Error::ConfigError(_))));
        assert!(matches!(SmootherConfig::from_yaml("RotGamma: 1.5\n"), Err(Error::ConfigError(_))));
        assert!(matches!(PredictorConfig::from_yaml("TransAlpha: 1.0\n"), Err(Error::ConfigError(_))));
        assert!(matches!(PredictorConfig::from_yaml("Delta: 0\n"), Err(Error::ConfigError(_))));
        assert!(matches!(SmootherConfig::from_yaml("TransAlpha: [1, 2]\n"), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.stream.frame_interval_ms = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tracking.predictor = Some(PredictorConfig::uniform(1.0, 50));
        assert!(config.validate().is_err());
    }
}
