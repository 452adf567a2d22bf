//! Shared, read-only input for a single analysis run.

use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::logging::LogConfig;

use super::inference::NumericColumnClassifier;
use super::math::{round_to, saturate};

/// Everything the analyzers need: the dataset, the thresholds and the
/// numeric column set, which is classified once and shared.
#[derive(Debug, Clone)]
pub struct AnalysisContext<'a> {
    dataset: &'a Dataset,
    config: &'a EngineConfig,
    log_config: LogConfig,
    numeric_columns: Vec<String>,
}

impl<'a> AnalysisContext<'a> {
    /// Creates a context and classifies the dataset's numeric columns.
    pub fn new(dataset: &'a Dataset, config: &'a EngineConfig) -> Self {
        let numeric_columns = NumericColumnClassifier::from_config(config).classify(dataset);
        Self::with_numeric_columns(dataset, config, numeric_columns)
    }

    /// Creates a context with a precomputed numeric column set.
    pub fn with_numeric_columns(
        dataset: &'a Dataset,
        config: &'a EngineConfig,
        numeric_columns: Vec<String>,
    ) -> Self {
        Self {
            dataset,
            config,
            log_config: LogConfig::default(),
            numeric_columns,
        }
    }

    /// Replaces the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.log_config
    }

    /// Columns classified as numeric, in first-row order.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Finite values of `column` in row order.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.dataset.numeric_values(column)
    }

    /// Rounds `value` to the configured number of decimals.
    ///
    /// Every reported float passes through here, so infinities saturate to
    /// `±f64::MAX` and NaN becomes zero.
    pub fn round(&self, value: f64) -> f64 {
        round_to(saturate(value), self.config.decimal_places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Row;

    #[test]
    fn test_round_never_reports_non_finite_values() {
        let dataset = Dataset::from_rows(vec![Row::from_pairs([("x", 1.0)])]);
        let config = EngineConfig::default();
        let ctx = AnalysisContext::new(&dataset, &config);

        assert_eq!(ctx.round(1.234_56), 1.2346);
        assert_eq!(ctx.round(f64::INFINITY), f64::MAX);
        assert_eq!(ctx.round(f64::NEG_INFINITY), -f64::MAX);
        assert_eq!(ctx.round(f64::NAN), 0.0);
    }
}
