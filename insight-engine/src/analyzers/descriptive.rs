//! Descriptive statistics for numeric columns.
//!
//! For every numeric column all finite values are collected (unparseable
//! cells are dropped, never fatal), sorted, and summarized. Quartiles are
//! read off the sorted values at `floor(n * p)` without interpolation, so the
//! reported median of an even-length column is the upper middle element.
//! Variance is the population variance. Skewness and excess kurtosis use the
//! bias-corrected sample formulas and are defined as zero wherever those
//! formulas would divide by zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::log_column;

use super::context::AnalysisContext;
use super::math::{finite_or_zero, overflow_scale, saturate, sorted, Quartiles};
use super::traits::Analyzer;

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

/// Raw (unrounded) moments of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl Moments {
    /// Population moments of a sample; `None` when it is empty.
    ///
    /// Sums run over values divided by [`overflow_scale`], so any finite
    /// input gives a finite mean and standard deviation. Only the variance
    /// can exceed the `f64` range, in which case it saturates at `f64::MAX`.
    pub fn population(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let scale = overflow_scale(values.iter().copied());
        let mean = values.iter().map(|v| v / scale).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|v| (v / scale - mean).powi(2))
            .sum::<f64>()
            / n;
        Some(Self {
            mean: saturate(mean * scale),
            variance: saturate(variance * scale * scale),
            std_dev: saturate(variance.sqrt() * scale),
        })
    }
}

/// Most frequent value of an ascending slice; ties go to the lowest value.
pub fn mode(sorted: &[f64]) -> Option<f64> {
    let mut best = *sorted.first()?;
    let mut best_count = 0usize;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let run = sorted[i..].iter().take_while(|v| **v == value).count();
        if run > best_count {
            best = value;
            best_count = run;
        }
        i += run;
    }
    Some(best)
}

/// Standardized values `(v - mean) / std_dev`, computed on the scaled
/// sample so that large magnitudes do not overflow the difference.
fn standardized<'a>(values: &'a [f64], moments: &Moments) -> impl Iterator<Item = f64> + 'a {
    let scale = overflow_scale(values.iter().copied());
    let mean = moments.mean / scale;
    let std_dev = moments.std_dev / scale;
    values.iter().map(move |v| (v / scale - mean) / std_dev)
}

/// Adjusted Fisher–Pearson skewness; zero for `n <= 2` or zero spread.
pub fn skewness(values: &[f64], moments: &Moments) -> f64 {
    let n = values.len() as f64;
    if values.len() <= 2 || moments.std_dev == 0.0 {
        return 0.0;
    }
    let sum: f64 = standardized(values, moments).map(|z| z.powi(3)).sum();
    finite_or_zero((n / ((n - 1.0) * (n - 2.0))) * sum)
}

/// Bias-corrected excess kurtosis; zero for `n <= 3` or zero spread.
pub fn kurtosis(values: &[f64], moments: &Moments) -> f64 {
    let n = values.len() as f64;
    if values.len() <= 3 || moments.std_dev == 0.0 {
        return 0.0;
    }
    let sum: f64 = standardized(values, moments).map(|z| z.powi(4)).sum();
    let scale = (n * (n + 1.0)) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let correction = (3.0 * (n - 1.0).powi(2)) / ((n - 2.0) * (n - 3.0));
    finite_or_zero(scale * sum - correction)
}

/// Computes a [`ColumnProfile`] for every numeric column with at least one value.
#[derive(Debug, Clone, Default)]
pub struct DescriptiveStatistics;

impl DescriptiveStatistics {
    pub fn new() -> Self {
        Self
    }

    /// Profiles a single column; `None` when it holds no finite value.
    pub fn profile_column(&self, ctx: &AnalysisContext<'_>, column: &str) -> Option<ColumnProfile> {
        let values = sorted(&ctx.numeric_values(column));
        let moments = Moments::population(&values)?;
        let quartiles = Quartiles::from_sorted(&values)?;
        let most_frequent = mode(&values)?;
        let n = values.len();
        let min = values[0];
        let max = values[n - 1];

        Some(ColumnProfile {
            count: n,
            mean: ctx.round(moments.mean),
            median: ctx.round(quartiles.median),
            mode: ctx.round(most_frequent),
            min: ctx.round(min),
            max: ctx.round(max),
            range: ctx.round(max - min),
            q1: ctx.round(quartiles.q1),
            q3: ctx.round(quartiles.q3),
            iqr: ctx.round(quartiles.iqr()),
            variance: ctx.round(moments.variance),
            std_dev: ctx.round(moments.std_dev),
            skewness: ctx.round(skewness(&values, &moments)),
            kurtosis: ctx.round(kurtosis(&values, &moments)),
        })
    }
}

impl Analyzer for DescriptiveStatistics {
    type Output = BTreeMap<String, ColumnProfile>;

    #[instrument(skip_all, fields(columns = ctx.numeric_columns().len()))]
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Self::Output {
        let mut stats = BTreeMap::new();
        for column in ctx.numeric_columns() {
            if let Some(profile) = self.profile_column(ctx, column) {
                log_column!(
                    ctx.log_config(),
                    column = %column,
                    count = profile.count,
                    mean = profile.mean,
                    "Profiled numeric column"
                );
                stats.insert(column.clone(), profile);
            }
        }
        stats
    }

    fn name(&self) -> &str {
        "descriptive_statistics"
    }

    fn description(&self) -> &str {
        "Central tendency, dispersion and shape of each numeric column"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::dataset::{Cell, Dataset, Row};

    fn column_dataset(values: &[Cell]) -> Dataset {
        Dataset::from_rows(
            values
                .iter()
                .map(|v| Row::from_pairs([("x", v.clone())]))
                .collect(),
        )
    }

    fn numbers(values: &[f64]) -> Dataset {
        column_dataset(&values.iter().map(|v| Cell::Number(*v)).collect::<Vec<_>>())
    }

    fn profile(dataset: &Dataset) -> Option<ColumnProfile> {
        let config = EngineConfig::default();
        let ctx = AnalysisContext::with_numeric_columns(dataset, &config, vec!["x".to_string()]);
        DescriptiveStatistics::new().profile_column(&ctx, "x")
    }

    #[test]
    fn test_scenario_with_single_extreme_value() {
        let p = profile(&numbers(&[1.0, 2.0, 3.0, 4.0, 100.0])).unwrap();
        assert_eq!(p.count, 5);
        assert_eq!(p.mean, 22.0);
        assert_eq!(p.median, 3.0);
        assert_eq!(p.q1, 2.0);
        assert_eq!(p.q3, 4.0);
        assert_eq!(p.iqr, 2.0);
        assert_eq!(p.min, 1.0);
        assert_eq!(p.max, 100.0);
        assert_eq!(p.range, 99.0);
        // population variance: (441+400+361+324+6084)/5
        assert_eq!(p.variance, 1522.0);
        assert_eq!(p.std_dev, 39.0128);
        assert!(p.skewness > 0.0);
    }

    #[test]
    fn test_even_length_median_is_upper_middle() {
        let p = profile(&numbers(&[4.0, 1.0, 3.0, 2.0])).unwrap();
        assert_eq!(p.median, 3.0);
        assert_eq!(p.q1, 2.0);
        assert_eq!(p.q3, 4.0);
    }

    #[test]
    fn test_mode_prefers_lowest_among_ties() {
        assert_eq!(mode(&[1.0, 2.0, 2.0, 3.0, 3.0]), Some(2.0));
        assert_eq!(mode(&[1.0, 2.0, 3.0]), Some(1.0));
        assert_eq!(mode(&[5.0, 5.0, 5.0, 6.0]), Some(5.0));
        assert_eq!(mode(&[-1.0, 4.0, 4.0, 4.0]), Some(4.0));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn test_single_value_has_zero_shape() {
        let p = profile(&numbers(&[7.0])).unwrap();
        assert_eq!(p.count, 1);
        assert_eq!(p.variance, 0.0);
        assert_eq!(p.std_dev, 0.0);
        assert_eq!(p.skewness, 0.0);
        assert_eq!(p.kurtosis, 0.0);
        assert_eq!(p.q1, 7.0);
        assert_eq!(p.q3, 7.0);
    }

    #[test]
    fn test_small_samples_are_guarded() {
        let two = profile(&numbers(&[1.0, 3.0])).unwrap();
        assert_eq!(two.skewness, 0.0);
        assert_eq!(two.kurtosis, 0.0);
        assert_eq!(two.std_dev, 1.0);

        let three = profile(&numbers(&[1.0, 2.0, 10.0])).unwrap();
        assert_ne!(three.skewness, 0.0);
        assert_eq!(three.kurtosis, 0.0);
    }

    #[test]
    fn test_unparseable_cells_are_dropped() {
        let mut cells = vec![Cell::from("abc"); 999];
        cells.push(Cell::from("5"));
        let p = profile(&column_dataset(&cells)).unwrap();
        assert_eq!(p.count, 1);
        assert_eq!(p.mean, 5.0);
    }

    #[test]
    fn test_column_without_values_has_no_profile() {
        assert!(profile(&column_dataset(&[Cell::Null, Cell::from("x")])).is_none());
    }

    #[test]
    fn test_symmetric_sample_has_zero_skew() {
        let p = profile(&numbers(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        assert_eq!(p.skewness, 0.0);
        assert_eq!(p.kurtosis, 2.625);
    }

    #[test]
    fn test_extreme_magnitudes_stay_finite() {
        let p = profile(&numbers(&[1.0e308, 1.0e308, -1.0e308, 1.0e308, 5.0])).unwrap();
        for value in [
            p.mean, p.median, p.mode, p.min, p.max, p.range, p.q1, p.q3, p.iqr, p.variance,
            p.std_dev, p.skewness, p.kurtosis,
        ] {
            assert!(value.is_finite(), "{p:?}");
        }
        assert!((p.mean - 4.0e307).abs() < 1.0e293);
        assert_eq!(p.range, f64::MAX);
        assert_eq!(p.variance, f64::MAX);
        assert!(p.std_dev > 7.9e307 && p.std_dev < 8.1e307);
        assert!(p.skewness < 0.0);
    }

    #[test]
    fn test_population_moments_of_empty_sample() {
        assert!(Moments::population(&[]).is_none());
        let m = Moments::population(&[2.0, 4.0]).unwrap();
        assert_eq!((m.mean, m.variance, m.std_dev), (3.0, 1.0, 1.0));
    }

    #[test]
    fn test_analyze_only_reports_numeric_columns() {
        let dataset = Dataset::from_rows(vec![
            Row::from_pairs([("x", Cell::from(1.0)), ("name", Cell::from("a"))]),
            Row::from_pairs([("x", Cell::from(2.0)), ("name", Cell::from("b"))]),
        ]);
        let config = EngineConfig::default();
        let ctx = AnalysisContext::new(&dataset, &config);
        let stats = DescriptiveStatistics::new().analyze(&ctx);
        assert_eq!(stats.len(), 1);
        assert!(stats.contains_key("x"));
    }
}
