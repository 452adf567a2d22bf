//! Numeric column classification.
//!
//! A column is numeric when more than `numeric_threshold` of its non-missing
//! cells among the first `sample_size` rows parse as finite numbers. The
//! heuristic is lossy on purpose: `["1", "2", "N/A"]` plus enough numbers is
//! numeric, while IDs such as `"A01"` never are. A column with no
//! non-missing sampled cells is not numeric.
//!
//! # Example
//!
//! ```rust
//! use insight_engine::analyzers::inference::NumericColumnClassifier;
//! use insight_engine::dataset::Dataset;
//! use serde_json::json;
//!
//! let dataset = Dataset::from_json(&json!([
//!     {"id": "A01", "amount": "10"},
//!     {"id": "A02", "amount": 12.5},
//! ]))
//! .unwrap();
//!
//! let classifier = NumericColumnClassifier::new();
//! assert_eq!(classifier.classify(&dataset), vec!["amount".to_string()]);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::dataset::{Cell, Dataset};

/// Sampling outcome for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    /// Column name
    pub column: String,
    /// Sampled cells that were neither null, absent nor empty
    pub eligible: usize,
    /// Eligible cells that parsed as finite numbers
    pub numeric_matches: usize,
    /// `numeric_matches / eligible`, zero when nothing was eligible
    pub numeric_fraction: f64,
    /// Whether the column is treated as numeric downstream
    pub is_numeric: bool,
}

/// Builder for [`NumericColumnClassifier`]
#[derive(Debug, Clone)]
pub struct NumericColumnClassifierBuilder {
    sample_size: usize,
    numeric_threshold: f64,
}

impl NumericColumnClassifierBuilder {
    /// Set the number of leading rows to sample
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Set the fraction of numeric cells a column must exceed
    pub fn numeric_threshold(mut self, threshold: f64) -> Self {
        self.numeric_threshold = threshold;
        self
    }

    pub fn build(self) -> NumericColumnClassifier {
        NumericColumnClassifier {
            sample_size: self.sample_size,
            numeric_threshold: self.numeric_threshold,
        }
    }
}

/// Decides which columns every numeric analyzer operates on.
#[derive(Debug, Clone)]
pub struct NumericColumnClassifier {
    sample_size: usize,
    numeric_threshold: f64,
}

impl Default for NumericColumnClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NumericColumnClassifier {
    /// Creates a classifier with the default thresholds.
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    /// Creates a classifier using the thresholds of `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            sample_size: config.sample_size,
            numeric_threshold: config.numeric_threshold,
        }
    }

    pub fn builder() -> NumericColumnClassifierBuilder {
        let defaults = EngineConfig::default();
        NumericColumnClassifierBuilder {
            sample_size: defaults.sample_size,
            numeric_threshold: defaults.numeric_threshold,
        }
    }

    /// Returns the numeric columns of `dataset` in first-row order.
    #[instrument(skip_all, fields(rows = dataset.row_count()))]
    pub fn classify(&self, dataset: &Dataset) -> Vec<String> {
        let numeric: Vec<String> = dataset
            .columns()
            .into_iter()
            .map(|column| self.classify_column(dataset, column))
            .filter(|c| c.is_numeric)
            .map(|c| c.column)
            .collect();
        debug!(numeric_columns = numeric.len(), "Classified numeric columns");
        numeric
    }

    /// Samples a single column and reports how it was classified.
    pub fn classify_column(&self, dataset: &Dataset, column: &str) -> ColumnClassification {
        let mut eligible = 0usize;
        let mut numeric_matches = 0usize;

        for cell in dataset.column(column).take(self.sample_size).flatten() {
            if cell.is_missing() {
                continue;
            }
            eligible += 1;
            if Cell::as_number(cell).is_some() {
                numeric_matches += 1;
            }
        }

        let numeric_fraction = if eligible == 0 {
            0.0
        } else {
            numeric_matches as f64 / eligible as f64
        };

        ColumnClassification {
            column: column.to_string(),
            eligible,
            numeric_matches,
            numeric_fraction,
            is_numeric: eligible > 0 && numeric_fraction > self.numeric_threshold,
        }
    }
}
