//! Qualitative buckets derived from numeric scores.
//!
//! Each ladder is an ordered table of `(threshold, bucket)` steps checked
//! top-down; the first step the score reaches wins and the fallback applies
//! below the last step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a ladder step compares the score against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `score >= threshold`
    Inclusive,
    /// `score > threshold`
    Exclusive,
}

/// An ordered threshold table.
#[derive(Debug, Clone, Copy)]
pub struct Ladder<T: 'static> {
    steps: &'static [(f64, T)],
    fallback: T,
    bound: Bound,
}

impl<T: Copy> Ladder<T> {
    pub const fn new(steps: &'static [(f64, T)], fallback: T, bound: Bound) -> Self {
        Self {
            steps,
            fallback,
            bound,
        }
    }

    /// Returns the bucket for `score`.
    pub fn classify(&self, score: f64) -> T {
        self.steps
            .iter()
            .find(|(threshold, _)| match self.bound {
                Bound::Inclusive => score >= *threshold,
                Bound::Exclusive => score > *threshold,
            })
            .map_or(self.fallback, |(_, bucket)| *bucket)
    }

    pub fn steps(&self) -> &'static [(f64, T)] {
        self.steps
    }
}

/// Five-step strength scale shared by correlations and trend fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    #[serde(rename = "very weak")]
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    #[serde(rename = "very strong")]
    VeryStrong,
}

impl Strength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::VeryWeak => "very weak",
            Strength::Weak => "weak",
            Strength::Moderate => "moderate",
            Strength::Strong => "strong",
            Strength::VeryStrong => "very strong",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence attached to a one-step-ahead prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correlation strength by absolute coefficient.
pub const CORRELATION_STRENGTH: Ladder<Strength> = Ladder::new(
    &[
        (0.9, Strength::VeryStrong),
        (0.7, Strength::Strong),
        (0.5, Strength::Moderate),
        (0.3, Strength::Weak),
    ],
    Strength::VeryWeak,
    Bound::Inclusive,
);

/// Trend significance by coefficient of determination.
pub const TREND_SIGNIFICANCE: Ladder<Strength> = Ladder::new(
    &[
        (0.8, Strength::VeryStrong),
        (0.6, Strength::Strong),
        (0.4, Strength::Moderate),
        (0.2, Strength::Weak),
    ],
    Strength::VeryWeak,
    Bound::Inclusive,
);

/// Prediction confidence by coefficient of determination.
pub const PREDICTION_CONFIDENCE: Ladder<Confidence> = Ladder::new(
    &[(0.7, Confidence::High), (0.4, Confidence::Medium)],
    Confidence::Low,
    Bound::Exclusive,
);

/// Strength bucket for a correlation coefficient of either sign.
pub fn correlation_strength(coefficient: f64) -> Strength {
    CORRELATION_STRENGTH.classify(coefficient.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_strength_boundaries() {
        assert_eq!(correlation_strength(0.9), Strength::VeryStrong);
        assert_eq!(correlation_strength(-0.95), Strength::VeryStrong);
        assert_eq!(correlation_strength(0.8999), Strength::Strong);
        assert_eq!(correlation_strength(0.7), Strength::Strong);
        assert_eq!(correlation_strength(-0.5), Strength::Moderate);
        assert_eq!(correlation_strength(0.3), Strength::Weak);
        assert_eq!(correlation_strength(0.1), Strength::VeryWeak);
    }

    #[test]
    fn test_trend_significance_boundaries() {
        assert_eq!(TREND_SIGNIFICANCE.classify(1.0), Strength::VeryStrong);
        assert_eq!(TREND_SIGNIFICANCE.classify(0.8), Strength::VeryStrong);
        assert_eq!(TREND_SIGNIFICANCE.classify(0.6), Strength::Strong);
        assert_eq!(TREND_SIGNIFICANCE.classify(0.4), Strength::Moderate);
        assert_eq!(TREND_SIGNIFICANCE.classify(0.2), Strength::Weak);
        assert_eq!(TREND_SIGNIFICANCE.classify(0.19), Strength::VeryWeak);
        assert_eq!(TREND_SIGNIFICANCE.classify(0.0), Strength::VeryWeak);
    }

    #[test]
    fn test_prediction_confidence_is_exclusive() {
        assert_eq!(PREDICTION_CONFIDENCE.classify(0.71), Confidence::High);
        assert_eq!(PREDICTION_CONFIDENCE.classify(0.7), Confidence::Medium);
        assert_eq!(PREDICTION_CONFIDENCE.classify(0.41), Confidence::Medium);
        assert_eq!(PREDICTION_CONFIDENCE.classify(0.4), Confidence::Low);
        assert_eq!(PREDICTION_CONFIDENCE.classify(f64::NAN), Confidence::Low);
    }

    #[test]
    fn test_ladders_are_descending() {
        for ladder in [CORRELATION_STRENGTH, TREND_SIGNIFICANCE] {
            let thresholds: Vec<f64> = ladder.steps().iter().map(|(t, _)| *t).collect();
            assert!(thresholds.windows(2).all(|w| w[0] > w[1]));
        }
    }

    #[test]
    fn test_bucket_serialization() {
        assert_eq!(
            serde_json::to_string(&Strength::VeryStrong).unwrap(),
            "\"very strong\""
        );
        assert_eq!(serde_json::to_string(&Strength::Weak).unwrap(), "\"weak\"");
        assert_eq!(serde_json::to_string(&Confidence::High).unwrap(), "\"high\"");
        assert_eq!(Strength::Moderate.to_string(), "moderate");
    }
}
