//! Pairwise Pearson correlation across numeric columns.
//!
//! Each coefficient is computed from the rows where both cells parse as
//! numbers. Fewer than two such rows, or a zero denominator, yield zero. The
//! matrix is symmetric with an exact unit diagonal; pairs whose absolute
//! coefficient exceeds the strong threshold are listed separately, strongest
//! first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::dataset::{Cell, Dataset};

use super::buckets::{correlation_strength, Strength};
use super::context::AnalysisContext;
use super::math::overflow_scale;
use super::traits::Analyzer;

/// Running sums for one column pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PearsonSums {
    pub n: u64,
    pub sum_x: f64,
    pub sum_y: f64,
    pub sum_xy: f64,
    pub sum_x2: f64,
    pub sum_y2: f64,
}

impl PearsonSums {
    /// Accumulates the rows of `dataset` where both columns are numeric.
    ///
    /// Each side is divided by its [`overflow_scale`] first; the coefficient
    /// does not depend on the scale of either column.
    pub fn collect(dataset: &Dataset, x: &str, y: &str) -> Self {
        let pairs: Vec<(f64, f64)> = dataset
            .rows()
            .iter()
            .filter_map(|row| {
                let x = row.get(x).and_then(Cell::as_number)?;
                let y = row.get(y).and_then(Cell::as_number)?;
                Some((x, y))
            })
            .collect();
        let scale_x = overflow_scale(pairs.iter().map(|(x, _)| *x));
        let scale_y = overflow_scale(pairs.iter().map(|(_, y)| *y));

        let mut sums = Self::default();
        for (x, y) in pairs {
            sums.push(x / scale_x, y / scale_y);
        }
        sums
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.n += 1;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xy += x * y;
        self.sum_x2 += x * x;
        self.sum_y2 += y * y;
    }

    /// Pearson coefficient, clamped to `[-1, 1]`; zero when undefined.
    pub fn coefficient(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        let n = self.n as f64;
        let numerator = n * self.sum_xy - self.sum_x * self.sum_y;
        let denominator = ((n * self.sum_x2 - self.sum_x * self.sum_x)
            * (n * self.sum_y2 - self.sum_y * self.sum_y))
            .sqrt();
        if denominator == 0.0 || !denominator.is_finite() {
            return 0.0;
        }
        let r = numerator / denominator;
        if r.is_finite() {
            r.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// A pair of distinct columns whose correlation exceeds the strong threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationPair {
    pub column1: String,
    pub column2: String,
    pub correlation: f64,
    pub strength: Strength,
}

/// Correlation matrix plus the ranked list of strong pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMatrix {
    pub matrix: BTreeMap<String, BTreeMap<String, f64>>,
    pub strong_correlations: Vec<CorrelationPair>,
}

impl CorrelationMatrix {
    /// Looks up the coefficient of an ordered column pair.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.matrix.get(a).and_then(|row| row.get(b)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

/// Builds the [`CorrelationMatrix`] over all numeric columns.
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine;

impl CorrelationEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for CorrelationEngine {
    type Output = CorrelationMatrix;

    #[instrument(skip_all, fields(columns = ctx.numeric_columns().len()))]
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Self::Output {
        let columns = ctx.numeric_columns();
        let mut matrix: BTreeMap<String, BTreeMap<String, f64>> = columns
            .iter()
            .map(|c| (c.clone(), BTreeMap::from([(c.clone(), 1.0)])))
            .collect();

        for (i, a) in columns.iter().enumerate() {
            for b in &columns[i + 1..] {
                let r = ctx.round(PearsonSums::collect(ctx.dataset(), a, b).coefficient());
                if let Some(row) = matrix.get_mut(a) {
                    row.insert(b.clone(), r);
                }
                if let Some(row) = matrix.get_mut(b) {
                    row.insert(a.clone(), r);
                }
            }
        }

        let threshold = ctx.config().strong_correlation_threshold;
        let mut strong_correlations = Vec::new();
        for a in columns {
            for b in columns {
                // lexical order keeps one entry per unordered pair
                if a >= b {
                    continue;
                }
                let Some(r) = matrix.get(a).and_then(|row| row.get(b)).copied() else {
                    continue;
                };
                if r.abs() > threshold {
                    strong_correlations.push(CorrelationPair {
                        column1: a.clone(),
                        column2: b.clone(),
                        correlation: r,
                        strength: correlation_strength(r),
                    });
                }
            }
        }
        strong_correlations.sort_by(|x, y| y.correlation.abs().total_cmp(&x.correlation.abs()));

        debug!(
            strong_pairs = strong_correlations.len(),
            "Computed correlation matrix"
        );

        CorrelationMatrix {
            matrix,
            strong_correlations,
        }
    }

    fn name(&self) -> &str {
        "correlation"
    }

    fn description(&self) -> &str {
        "Pairwise Pearson correlation between numeric columns"
    }
}
