//! Dataset-wide data quality scoring.
//!
//! Four sub-scores, each on a 0–100 scale, are computed over *all* columns
//! regardless of numeric classification:
//!
//! - **completeness**: share of non-missing cells among `rows × first-row columns`
//! - **uniqueness**: share of rows that are not exact duplicates of an
//!   earlier row (key order is part of a row's identity)
//! - **consistency**: share of observed columns holding at most two primitive
//!   kinds, null included
//! - **validity**: 100 minus 10 for every first-row column holding more than
//!   two kinds (absent cells count as null), floored at zero
//!
//! Consistency and validity share a trigger but are computed independently
//! and kept separate.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{instrument, warn};

use crate::dataset::{Cell, CellKind, Dataset, Row};

use super::context::AnalysisContext;
use super::math::round_to;
use super::traits::Analyzer;

/// Decimal places kept for quality scores.
const SCORE_DECIMALS: u32 = 2;

/// A column is inconsistent once it holds more than this many kinds.
const MAX_KINDS_PER_COLUMN: usize = 2;

/// Points deducted from validity for each mixed-kind column.
const VALIDITY_PENALTY: f64 = 10.0;

/// Raw issue counts behind the scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssues {
    pub missing_values: usize,
    pub duplicate_rows: usize,
    pub inconsistent_types: usize,
}

/// Recommendation emitted when a sub-score falls below its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    ImproveMissingValueHandling,
    RemoveDuplicateRecords,
    StandardizeTypes,
    ApplyValidationRules,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::ImproveMissingValueHandling => "Improve missing values handling",
            Recommendation::RemoveDuplicateRecords => "Remove duplicate records",
            Recommendation::StandardizeTypes => "Standardize data types and formats",
            Recommendation::ApplyValidationRules => "Apply data validation rules",
        }
    }
}

/// Score thresholds below which each recommendation fires, in output order.
const RECOMMENDATION_TRIGGERS: [(Recommendation, f64); 4] = [
    (Recommendation::ImproveMissingValueHandling, 90.0),
    (Recommendation::RemoveDuplicateRecords, 95.0),
    (Recommendation::StandardizeTypes, 85.0),
    (Recommendation::ApplyValidationRules, 90.0),
];

/// Quality scores for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub overall_score: f64,
    pub completeness: f64,
    pub uniqueness: f64,
    pub consistency: f64,
    pub validity: f64,
    pub issues: QualityIssues,
    pub recommendations: Vec<String>,
}

/// Unrounded sub-scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub completeness: f64,
    pub uniqueness: f64,
    pub consistency: f64,
    pub validity: f64,
}

impl SubScores {
    /// Recommendations triggered by these scores, in fixed order.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let scores = [
            self.completeness,
            self.uniqueness,
            self.consistency,
            self.validity,
        ];
        RECOMMENDATION_TRIGGERS
            .iter()
            .zip(scores)
            .filter(|((_, threshold), score)| score < threshold)
            .map(|((recommendation, _), _)| *recommendation)
            .collect()
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        100.0
    } else {
        (part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// Scores completeness, uniqueness, consistency and validity.
#[derive(Debug, Clone, Default)]
pub struct DataQualityAssessor;

impl DataQualityAssessor {
    pub fn new() -> Self {
        Self
    }

    /// Counts null, empty and absent cells.
    ///
    /// Every present entry of every row is inspected, plus one missing cell
    /// per first-row column that a row lacks.
    pub fn count_missing(dataset: &Dataset) -> usize {
        let columns = dataset.columns();
        dataset
            .rows()
            .iter()
            .map(|row| {
                let present = row.iter().filter(|(_, cell)| cell.is_missing()).count();
                let absent = columns.iter().filter(|c| row.get(c).is_none()).count();
                present + absent
            })
            .sum()
    }

    /// Counts rows that exactly repeat an earlier row, key order included.
    pub fn count_duplicates(dataset: &Dataset) -> usize {
        let mut seen: HashSet<[u8; 32]> = HashSet::with_capacity(dataset.row_count());
        dataset
            .rows()
            .iter()
            .filter(|row| !seen.insert(Self::fingerprint(row)))
            .count()
    }

    fn fingerprint(row: &Row) -> [u8; 32] {
        let mut hasher = Sha256::new();
        match serde_json::to_vec(row) {
            Ok(bytes) => hasher.update(&bytes),
            Err(e) => {
                // Row serialization is infallible in practice; fall back to Debug
                warn!(error = %e, "Failed to serialize row for duplicate detection");
                hasher.update(format!("{row:?}").as_bytes());
            }
        }
        hasher.finalize().into()
    }

    /// Kinds seen per column across the present entries of all rows.
    pub fn observed_kinds(dataset: &Dataset) -> BTreeMap<String, BTreeSet<CellKind>> {
        let mut kinds: BTreeMap<String, BTreeSet<CellKind>> = BTreeMap::new();
        for row in dataset.rows() {
            for (column, cell) in row.iter() {
                kinds.entry(column.to_string()).or_default().insert(cell.kind());
            }
        }
        kinds
    }

    /// Number of first-row columns whose values, absent ones included, span
    /// more than two kinds.
    pub fn mixed_kind_columns(dataset: &Dataset) -> usize {
        dataset
            .columns()
            .into_iter()
            .filter(|column| {
                let kinds: BTreeSet<CellKind> = dataset.column(column).map(Cell::kind_of).collect();
                kinds.len() > MAX_KINDS_PER_COLUMN
            })
            .count()
    }

    /// Computes unrounded sub-scores and the raw issue counts.
    pub fn score(dataset: &Dataset) -> (SubScores, QualityIssues) {
        let rows = dataset.row_count();
        let total_cells = rows * dataset.column_count();

        let missing_values = Self::count_missing(dataset);
        let duplicate_rows = Self::count_duplicates(dataset);

        let kinds = Self::observed_kinds(dataset);
        let inconsistent_types = kinds
            .values()
            .filter(|k| k.len() > MAX_KINDS_PER_COLUMN)
            .count();

        let validity_penalty = Self::mixed_kind_columns(dataset) as f64 * VALIDITY_PENALTY;

        let scores = SubScores {
            completeness: percentage(total_cells.saturating_sub(missing_values), total_cells),
            uniqueness: percentage(rows - duplicate_rows, rows),
            consistency: percentage(kinds.len() - inconsistent_types, kinds.len()),
            validity: (100.0 - validity_penalty).max(0.0),
        };

        (
            scores,
            QualityIssues {
                missing_values,
                duplicate_rows,
                inconsistent_types,
            },
        )
    }

    /// Builds the full report for `dataset`.
    pub fn assess(dataset: &Dataset) -> QualityReport {
        let (scores, issues) = Self::score(dataset);

        let completeness = round_to(scores.completeness, SCORE_DECIMALS);
        let uniqueness = round_to(scores.uniqueness, SCORE_DECIMALS);
        let consistency = round_to(scores.consistency, SCORE_DECIMALS);
        let validity = round_to(scores.validity, SCORE_DECIMALS);
        let overall_score = round_to(
            (completeness + uniqueness + consistency + validity) / 4.0,
            SCORE_DECIMALS,
        );

        QualityReport {
            overall_score,
            completeness,
            uniqueness,
            consistency,
            validity,
            issues,
            recommendations: scores
                .recommendations()
                .iter()
                .map(|r| r.message().to_string())
                .collect(),
        }
    }
}

impl Analyzer for DataQualityAssessor {
    type Output = QualityReport;

    #[instrument(skip_all, fields(rows = ctx.dataset().row_count()))]
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Self::Output {
        Self::assess(ctx.dataset())
    }

    fn name(&self) -> &str {
        "data_quality"
    }

    fn description(&self) -> &str {
        "Completeness, uniqueness, consistency and validity scores"
    }

    fn requires_numeric_columns(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(value: serde_json::Value) -> Dataset {
        Dataset::from_json(&value).unwrap()
    }

    #[test]
    fn test_clean_dataset_scores_perfectly() {
        let report = DataQualityAssessor::assess(&dataset(json!([
            {"a": 1, "b": "x"},
            {"a": 2, "b": "y"},
        ])));
        assert_eq!(report.completeness, 100.0);
        assert_eq!(report.uniqueness, 100.0);
        assert_eq!(report.consistency, 100.0);
        assert_eq!(report.validity, 100.0);
        assert_eq!(report.overall_score, 100.0);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.issues, QualityIssues::default());
    }

    #[test]
    fn test_missing_values_lower_completeness() {
        let report = DataQualityAssessor::assess(&dataset(json!([
            {"a": 1, "b": null},
            {"a": "", "b": "y"},
            {"a": 3},
            {"a": 4, "b": "z"},
        ])));
        // null, empty string and the absent "b": 3 of 8 cells
        assert_eq!(report.issues.missing_values, 3);
        assert_eq!(report.completeness, 62.5);
        assert_eq!(
            report.recommendations,
            vec!["Improve missing values handling".to_string()]
        );
    }

    #[test]
    fn test_duplicates_respect_key_order() {
        let report = DataQualityAssessor::assess(&dataset(json!([
            {"a": 1, "b": 2},
            {"a": 1, "b": 2},
            {"b": 2, "a": 1},
            {"a": 3, "b": 4},
        ])));
        assert_eq!(report.issues.duplicate_rows, 1);
        assert_eq!(report.uniqueness, 75.0);
        assert!(report
            .recommendations
            .contains(&"Remove duplicate records".to_string()));
    }

    #[test]
    fn test_two_kinds_are_consistent() {
        let report = DataQualityAssessor::assess(&dataset(json!([
            {"a": 1}, {"a": "two"}, {"a": 3},
        ])));
        assert_eq!(report.issues.inconsistent_types, 0);
        assert_eq!(report.consistency, 100.0);
        assert_eq!(report.validity, 100.0);
    }

    #[test]
    fn test_three_kinds_penalize_consistency_and_validity() {
        let report = DataQualityAssessor::assess(&dataset(json!([
            {"a": 1, "b": 1},
            {"a": "two", "b": 2},
            {"a": null, "b": 3},
        ])));
        assert_eq!(report.issues.inconsistent_types, 1);
        assert_eq!(report.consistency, 50.0);
        assert_eq!(report.validity, 90.0);
        assert_eq!(
            report.recommendations,
            vec![
                "Improve missing values handling".to_string(),
                "Standardize data types and formats".to_string(),
            ]
        );
    }

    #[test]
    fn test_absent_cells_only_affect_validity() {
        // "a" holds numbers and strings; the absent cell adds a null kind for
        // validity but is never observed by the consistency scan
        let report = DataQualityAssessor::assess(&dataset(json!([
            {"a": 1, "b": 1},
            {"a": "x", "b": 2},
            {"b": 3},
        ])));
        assert_eq!(report.issues.inconsistent_types, 0);
        assert_eq!(report.consistency, 100.0);
        assert_eq!(report.validity, 90.0);
    }

    #[test]
    fn test_validity_floors_at_zero() {
        let mut row1 = serde_json::Map::new();
        let mut row2 = serde_json::Map::new();
        let mut row3 = serde_json::Map::new();
        for i in 0..12 {
            let key = format!("c{i}");
            row1.insert(key.clone(), json!(1));
            row2.insert(key.clone(), json!("s"));
            row3.insert(key, json!(true));
        }
        let report = DataQualityAssessor::assess(&dataset(json!([row1, row2, row3])));
        assert_eq!(report.validity, 0.0);
        assert_eq!(report.consistency, 0.0);
        assert_eq!(report.issues.inconsistent_types, 12);
    }

    #[test]
    fn test_overall_is_mean_of_rounded_scores() {
        let report = DataQualityAssessor::assess(&dataset(json!([
            {"a": 1, "b": null, "c": 3},
            {"a": 1, "b": null, "c": 3},
            {"a": 2, "b": "x", "c": 4},
        ])));
        let expected = round_to(
            (report.completeness + report.uniqueness + report.consistency + report.validity) / 4.0,
            2,
        );
        assert_eq!(report.overall_score, expected);
        assert_eq!(report.completeness, 77.78);
        assert_eq!(report.uniqueness, 66.67);
    }

    #[test]
    fn test_recommendation_thresholds() {
        let scores = SubScores {
            completeness: 90.0,
            uniqueness: 94.99,
            consistency: 85.0,
            validity: 89.0,
        };
        assert_eq!(
            scores.recommendations(),
            vec![
                Recommendation::RemoveDuplicateRecords,
                Recommendation::ApplyValidationRules
            ]
        );
    }

    #[test]
    fn test_report_serializes_with_snake_case_keys() {
        let report = DataQualityAssessor::assess(&dataset(json!([{"a": 1}])));
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("overall_score").is_some());
        assert!(value["issues"].get("missing_values").is_some());
    }
}
