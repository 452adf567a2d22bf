//! IQR fence outlier detection.
//!
//! Fences come from the same floor-index quartiles as the descriptive
//! statistics: `lower = q1 - k * iqr`, `upper = q3 + k * iqr`. Every row is
//! then scanned in original order and values strictly outside the fences are
//! flagged. Only the first `outlier_sample_limit` flagged rows are kept as
//! samples; the count and percentage always cover all of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::dataset::Cell;
use crate::log_column;

use super::context::AnalysisContext;
use super::math::{saturate, sorted, Quartiles};
use super::traits::Analyzer;

/// Side of the fence an outlier falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Below the lower fence
    Low,
    /// Above the upper fence
    High,
}

/// Inclusive range of values considered normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fences {
    pub lower: f64,
    pub upper: f64,
}

impl Fences {
    /// Tukey fences around the quartiles of an ascending slice; `None` when
    /// it is empty. Fences saturate at `±f64::MAX`.
    pub fn from_sorted(sorted: &[f64], multiplier: f64) -> Option<Self> {
        let quartiles = Quartiles::from_sorted(sorted)?;
        let iqr = quartiles.iqr();
        Some(Self {
            lower: saturate(quartiles.q1 - multiplier * iqr),
            upper: saturate(quartiles.q3 + multiplier * iqr),
        })
    }

    /// Severity of `value`, or `None` when it lies within the fences.
    pub fn classify(&self, value: f64) -> Option<Severity> {
        if value < self.lower {
            Some(Severity::Low)
        } else if value > self.upper {
            Some(Severity::High)
        } else {
            None
        }
    }
}

/// One flagged row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlier {
    pub row_index: usize,
    pub value: f64,
    pub severity: Severity,
}

/// Outliers found in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierReport {
    /// Total number of flagged rows
    pub count: usize,
    /// Flagged rows as a percentage of all dataset rows
    pub percentage: f64,
    pub bounds: Fences,
    /// First flagged rows in row order
    pub outliers: Vec<Outlier>,
}

/// Flags values outside the IQR fences of each numeric column.
#[derive(Debug, Clone, Default)]
pub struct OutlierDetector;

impl OutlierDetector {
    pub fn new() -> Self {
        Self
    }

    /// Scans one column; `None` when it has too few values or no outliers.
    pub fn detect_column(&self, ctx: &AnalysisContext<'_>, column: &str) -> Option<OutlierReport> {
        let config = ctx.config();
        let values = sorted(&ctx.numeric_values(column));
        if values.len() < config.min_outlier_values.max(1) {
            return None;
        }

        let fences = Fences::from_sorted(&values, config.iqr_multiplier)?;
        let mut count = 0usize;
        let mut samples = Vec::new();

        for (row_index, cell) in ctx.dataset().column(column).enumerate() {
            let Some(value) = cell.and_then(Cell::as_number) else {
                continue;
            };
            if let Some(severity) = fences.classify(value) {
                count += 1;
                if samples.len() < config.outlier_sample_limit {
                    samples.push(Outlier {
                        row_index,
                        value,
                        severity,
                    });
                }
            }
        }

        if count == 0 {
            return None;
        }

        let rows = ctx.dataset().row_count() as f64;
        Some(OutlierReport {
            count,
            percentage: ctx.round(count as f64 / rows * 100.0),
            bounds: Fences {
                lower: ctx.round(fences.lower),
                upper: ctx.round(fences.upper),
            },
            outliers: samples,
        })
    }
}

impl Analyzer for OutlierDetector {
    type Output = BTreeMap<String, OutlierReport>;

    #[instrument(skip_all, fields(columns = ctx.numeric_columns().len()))]
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Self::Output {
        let mut reports = BTreeMap::new();
        for column in ctx.numeric_columns() {
            if let Some(report) = self.detect_column(ctx, column) {
                log_column!(
                    ctx.log_config(),
                    column = %column,
                    outliers = report.count,
                    "Detected outliers"
                );
                reports.insert(column.clone(), report);
            }
        }
        reports
    }

    fn name(&self) -> &str {
        "outliers"
    }

    fn description(&self) -> &str {
        "IQR fence outlier detection per numeric column"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::math::round_to;
    use crate::config::EngineConfig;
    use crate::dataset::{Dataset, Row};

    fn column(values: Vec<Cell>) -> Dataset {
        Dataset::from_rows(
            values
                .into_iter()
                .map(|v| Row::from_pairs([("x", v)]))
                .collect(),
        )
    }

    fn detect(dataset: &Dataset, config: &EngineConfig) -> Option<OutlierReport> {
        let ctx = AnalysisContext::with_numeric_columns(dataset, config, vec!["x".to_string()]);
        OutlierDetector::new().detect_column(&ctx, "x")
    }

    #[test]
    fn test_high_outlier_detected() {
        let dataset = column([1.0, 2.0, 3.0, 4.0, 100.0].map(Cell::from).to_vec());
        let report = detect(&dataset, &EngineConfig::default()).unwrap();
        assert_eq!(report.bounds.lower, -1.0);
        assert_eq!(report.bounds.upper, 7.0);
        assert_eq!(report.count, 1);
        assert_eq!(report.percentage, 20.0);
        assert_eq!(
            report.outliers,
            vec![Outlier {
                row_index: 4,
                value: 100.0,
                severity: Severity::High
            }]
        );
    }

    #[test]
    fn test_low_outlier_and_original_row_indices() {
        let dataset = column(vec![
            Cell::from("skip"),
            Cell::from(-50.0),
            Cell::Null,
            Cell::from(10.0),
            Cell::from(11.0),
            Cell::from(12.0),
            Cell::from(13.0),
        ]);
        let report = detect(&dataset, &EngineConfig::default()).unwrap();
        assert_eq!(report.outliers.len(), 1);
        assert_eq!(report.outliers[0].row_index, 1);
        assert_eq!(report.outliers[0].severity, Severity::Low);
        // percentage is relative to all rows, not only parsed ones
        assert_eq!(report.percentage, round_to(100.0 / 7.0, 4));
    }

    #[test]
    fn test_requires_more_than_four_values() {
        let dataset = column([1.0, 2.0, 3.0, 100.0].map(Cell::from).to_vec());
        assert!(detect(&dataset, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_no_report_without_outliers() {
        let dataset = column((1..=10).map(|i| Cell::from(i as f64)).collect());
        assert!(detect(&dataset, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_sample_is_capped_in_row_order() {
        let mut values: Vec<Cell> = (0..100).map(|_| Cell::from(5.0)).collect();
        values.extend((0..15).map(|i| Cell::from(1000.0 + i as f64)));
        let dataset = column(values);

        let report = detect(&dataset, &EngineConfig::default()).unwrap();
        assert_eq!(report.count, 15);
        assert_eq!(report.outliers.len(), 10);
        let indices: Vec<usize> = report.outliers.iter().map(|o| o.row_index).collect();
        assert_eq!(indices, (100..110).collect::<Vec<_>>());

        let config = EngineConfig::builder().outlier_sample_limit(3).build().unwrap();
        assert_eq!(detect(&dataset, &config).unwrap().outliers.len(), 3);
    }

    #[test]
    fn test_fences_stay_finite_for_extreme_values() {
        assert!(Fences::from_sorted(&[], 1.5).is_none());

        let fences = Fences::from_sorted(&[-1.0e308, -1.0e308, 1.0e308, 1.0e308], 1.5).unwrap();
        assert_eq!(fences.lower, -f64::MAX);
        assert_eq!(fences.upper, f64::MAX);

        let mut values = vec![Cell::from(0.0); 8];
        values.push(Cell::from(1.0e308));
        let report = detect(&column(values), &EngineConfig::default()).unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.outliers[0].value, 1.0e308);
        assert!(report.bounds.lower.is_finite() && report.bounds.upper.is_finite());
    }

    #[test]
    fn test_values_on_fence_are_not_outliers() {
        // q1 = 2, q3 = 4, upper fence = 7 exactly
        let dataset = column([1.0, 2.0, 3.0, 4.0, 7.0].map(Cell::from).to_vec());
        assert!(detect(&dataset, &EngineConfig::default()).is_none());
    }
}
