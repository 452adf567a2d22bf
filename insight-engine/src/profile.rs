//! The analysis profile: the engine's single output value.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::{ColumnProfile, CorrelationMatrix, OutlierReport, QualityReport, TrendReport};
use crate::dataset::Metadata;

/// Metadata keys written by the engine; caller entries with these names are replaced.
pub const RESERVED_METADATA_KEYS: [&str; 4] =
    ["rowCount", "columnCount", "processingTime", "analyzedAt"];

/// Caller metadata echoed back, plus the facts recorded by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetadata {
    /// Caller-supplied entries, echoed unmodified
    #[serde(flatten)]
    pub extra: Metadata,
    pub row_count: usize,
    /// Number of keys in the first row
    pub column_count: usize,
    /// Wall-clock duration of the analysis in milliseconds
    pub processing_time: u64,
    pub analyzed_at: DateTime<Utc>,
}

impl ProfileMetadata {
    /// Builds metadata, dropping caller entries that collide with engine keys.
    pub fn new(
        mut extra: Metadata,
        row_count: usize,
        column_count: usize,
        processing_time: u64,
        analyzed_at: DateTime<Utc>,
    ) -> Self {
        for key in RESERVED_METADATA_KEYS {
            extra.remove(key);
        }
        Self {
            extra,
            row_count,
            column_count,
            processing_time,
            analyzed_at,
        }
    }
}

/// Complete statistical profile of a dataset.
///
/// Constructed fresh by every call to
/// [`AnalysisEngine::analyze`](crate::engine::AnalysisEngine::analyze) and
/// never mutated afterwards. All maps are ordered by column name, so two
/// profiles of the same dataset serialize identically apart from
/// `processingTime` and `analyzedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisProfile {
    pub descriptive_stats: BTreeMap<String, ColumnProfile>,
    pub correlation_matrix: CorrelationMatrix,
    pub data_quality: QualityReport,
    pub outliers: BTreeMap<String, OutlierReport>,
    pub trends: BTreeMap<String, TrendReport>,
    pub metadata: ProfileMetadata,
}

impl AnalysisProfile {
    /// Columns that received descriptive statistics.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.descriptive_stats.keys().map(String::as_str)
    }

    /// Serializes the profile with its wire key names.
    pub fn to_json(&self) -> crate::error::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
