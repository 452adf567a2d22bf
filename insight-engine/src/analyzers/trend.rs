//! Linear trend estimation over row order.
//!
//! Points are `(row index, value)` pairs that keep the original row index of
//! every parseable cell, so gaps left by unparseable cells stretch the x
//! axis instead of being compacted away. A least-squares line is fitted
//! through them and evaluated one step past the valid points to produce a
//! prediction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::dataset::Cell;
use crate::log_column;

use super::buckets::{Confidence, Strength, PREDICTION_CONFIDENCE, TREND_SIGNIFICANCE};
use super::context::AnalysisContext;
use super::math::{overflow_scale, round_to};
use super::traits::Analyzer;

/// Decimal places kept for slopes, which are often tiny on long series.
const SLOPE_DECIMALS: u32 = 6;

/// Sign of the fitted slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increasing,
    Decreasing,
    Stable,
}

impl Direction {
    /// Exact zero is the only stable slope.
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            Direction::Increasing
        } else if slope < 0.0 {
            Direction::Decreasing
        } else {
            Direction::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increasing => "increasing",
            Direction::Decreasing => "decreasing",
            Direction::Stable => "stable",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinary least-squares fit of value on row index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub points: usize,
}

impl LinearFit {
    /// Fits a line through `points`; `None` for an empty slice or when the
    /// fitted line does not fit in the `f64` range.
    ///
    /// A degenerate x spread yields a zero slope, and a constant series
    /// yields an R² of zero. The y values are divided by their
    /// [`overflow_scale`] while accumulating and the coefficients scaled
    /// back afterwards.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let scale = overflow_scale(points.iter().map(|(_, y)| *y));
        let scaled: Vec<(f64, f64)> = points.iter().map(|(x, y)| (*x, y / scale)).collect();

        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
        for (x, y) in &scaled {
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_x2 += x * x;
        }

        let denominator = n * sum_x2 - sum_x * sum_x;
        let slope = if denominator == 0.0 {
            0.0
        } else {
            (n * sum_xy - sum_x * sum_y) / denominator
        };
        let intercept = (sum_y - slope * sum_x) / n;

        let mean_y = sum_y / n;
        let total: f64 = scaled.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
        let residual: f64 = scaled
            .iter()
            .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
            .sum();
        let r_squared = if total == 0.0 {
            0.0
        } else {
            1.0 - residual / total
        };

        let fit = Self {
            slope: slope * scale,
            intercept: intercept * scale,
            r_squared,
            points: points.len(),
        };
        [fit.slope, fit.intercept, fit.r_squared]
            .iter()
            .all(|v| v.is_finite())
            .then_some(fit)
    }

    /// Evaluates the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// One-step-ahead prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPrediction {
    pub next_predicted_value: f64,
    pub confidence: Confidence,
}

/// Trend of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub direction: Direction,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub significance: Strength,
    pub prediction: TrendPrediction,
}

impl TrendReport {
    /// `None` when the prediction leaves the `f64` range.
    fn from_fit(fit: &LinearFit, places: u32) -> Option<Self> {
        let next = fit.predict(fit.points as f64);
        if !next.is_finite() {
            return None;
        }
        Some(Self {
            direction: Direction::from_slope(fit.slope),
            slope: round_to(fit.slope, SLOPE_DECIMALS.max(places)),
            intercept: round_to(fit.intercept, places),
            r_squared: round_to(fit.r_squared, places),
            significance: TREND_SIGNIFICANCE.classify(fit.r_squared),
            prediction: TrendPrediction {
                next_predicted_value: round_to(next, places),
                confidence: PREDICTION_CONFIDENCE.classify(fit.r_squared),
            },
        })
    }
}

/// Fits a [`TrendReport`] for each numeric column with enough valid points.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Valid `(row index, value)` points of a column.
    pub fn points(ctx: &AnalysisContext<'_>, column: &str) -> Vec<(f64, f64)> {
        ctx.dataset()
            .column(column)
            .enumerate()
            .filter_map(|(index, cell)| {
                cell.and_then(Cell::as_number)
                    .map(|value| (index as f64, value))
            })
            .collect()
    }

    /// Fits one column; `None` when it has too few valid points or the fit
    /// overflows.
    pub fn analyze_column(&self, ctx: &AnalysisContext<'_>, column: &str) -> Option<TrendReport> {
        let points = Self::points(ctx, column);
        if points.len() < ctx.config().min_trend_points.max(1) {
            return None;
        }
        let fit = LinearFit::fit(&points)?;
        TrendReport::from_fit(&fit, ctx.config().decimal_places)
    }
}

impl Analyzer for TrendAnalyzer {
    type Output = BTreeMap<String, TrendReport>;

    #[instrument(skip_all, fields(columns = ctx.numeric_columns().len()))]
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Self::Output {
        let mut trends = BTreeMap::new();
        for column in ctx.numeric_columns() {
            if let Some(report) = self.analyze_column(ctx, column) {
                log_column!(
                    ctx.log_config(),
                    column = %column,
                    direction = ?report.direction,
                    r_squared = report.r_squared,
                    "Fitted trend"
                );
                trends.insert(column.clone(), report);
            }
        }
        trends
    }

    fn name(&self) -> &str {
        "trends"
    }

    fn description(&self) -> &str {
        "Least-squares trend of each numeric column over row order"
    }
}
