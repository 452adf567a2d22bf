//! Tunable thresholds for the analysis engine.
//!
//! Every constant the analyzers depend on lives here so that a single value
//! can be passed around instead of scattering literals across modules. The
//! defaults produce the documented profile format; change them only when the
//! consumer of the profile expects different thresholds.
//!
//! # Example
//!
//! ```rust
//! use insight_engine::config::EngineConfig;
//!
//! let config = EngineConfig::builder()
//!     .sample_size(500)
//!     .outlier_sample_limit(25)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.sample_size, 500);
//! assert_eq!(config.numeric_threshold, 0.8);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Configuration shared by all analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Leading rows sampled by the numeric column classifier
    pub sample_size: usize,
    /// Fraction of sampled non-missing cells that must parse as numbers
    pub numeric_threshold: f64,
    /// Fence width as a multiple of the interquartile range
    pub iqr_multiplier: f64,
    /// Minimum number of valid values before outliers are searched
    pub min_outlier_values: usize,
    /// Maximum number of outlier samples kept per column
    pub outlier_sample_limit: usize,
    /// Absolute coefficient a pair must exceed to be reported as strong
    pub strong_correlation_threshold: f64,
    /// Minimum number of valid points before a trend is fitted
    pub min_trend_points: usize,
    /// Decimal places kept in reported statistics
    pub decimal_places: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            numeric_threshold: 0.8,
            iqr_multiplier: 1.5,
            min_outlier_values: 5,
            outlier_sample_limit: 10,
            strong_correlation_threshold: 0.5,
            min_trend_points: 3,
            decimal_places: 4,
        }
    }
}

impl EngineConfig {
    /// Creates a builder starting from the default configuration.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Checks that every value is within its legal range.
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(EngineError::configuration("sample_size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.numeric_threshold) {
            return Err(EngineError::configuration(format!(
                "numeric_threshold must be within [0, 1], got {}",
                self.numeric_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.strong_correlation_threshold) {
            return Err(EngineError::configuration(format!(
                "strong_correlation_threshold must be within [0, 1], got {}",
                self.strong_correlation_threshold
            )));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(EngineError::configuration(format!(
                "iqr_multiplier must be a non-negative number, got {}",
                self.iqr_multiplier
            )));
        }
        if self.decimal_places > 12 {
            return Err(EngineError::configuration(format!(
                "decimal_places must be at most 12, got {}",
                self.decimal_places
            )));
        }
        Ok(())
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the number of leading rows sampled for numeric classification
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Set the numeric fraction a column must exceed
    pub fn numeric_threshold(mut self, threshold: f64) -> Self {
        self.config.numeric_threshold = threshold;
        self
    }

    /// Set the IQR fence multiplier
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.config.iqr_multiplier = multiplier;
        self
    }

    /// Set the minimum number of values needed for outlier detection
    pub fn min_outlier_values(mut self, count: usize) -> Self {
        self.config.min_outlier_values = count;
        self
    }

    /// Set how many outliers are kept per column
    pub fn outlier_sample_limit(mut self, limit: usize) -> Self {
        self.config.outlier_sample_limit = limit;
        self
    }

    /// Set the strong correlation cut-off
    pub fn strong_correlation_threshold(mut self, threshold: f64) -> Self {
        self.config.strong_correlation_threshold = threshold;
        self
    }

    /// Set the minimum number of points needed for trend fitting
    pub fn min_trend_points(mut self, count: usize) -> Self {
        self.config.min_trend_points = count;
        self
    }

    /// Set the number of decimal places kept in reported values
    pub fn decimal_places(mut self, places: u32) -> Self {
        self.config.decimal_places = places;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_size, 100);
        assert_eq!(config.numeric_threshold, 0.8);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.min_outlier_values, 5);
        assert_eq!(config.outlier_sample_limit, 10);
        assert_eq!(config.strong_correlation_threshold, 0.5);
        assert_eq!(config.min_trend_points, 3);
        assert_eq!(config.decimal_places, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(EngineConfig::builder().sample_size(0).build().is_err());
        assert!(EngineConfig::builder().numeric_threshold(1.5).build().is_err());
        assert!(EngineConfig::builder()
            .strong_correlation_threshold(-0.1)
            .build()
            .is_err());
        assert!(EngineConfig::builder().iqr_multiplier(-1.0).build().is_err());
        assert!(EngineConfig::builder()
            .iqr_multiplier(f64::NAN)
            .build()
            .is_err());
        assert!(EngineConfig::builder().decimal_places(20).build().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"sample_size": 250, "iqr_multiplier": 3.0}"#).unwrap();
        assert_eq!(config.sample_size, 250);
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.outlier_sample_limit, 10);
    }
}
