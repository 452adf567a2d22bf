//! The analysis orchestrator.
//!
//! [`AnalysisEngine`] is a plain value holding configuration only. Each call
//! classifies the numeric columns once, runs every analyzer against the same
//! immutable [`Dataset`] and assembles a fresh [`AnalysisProfile`].
//!
//! # Example
//!
//! ```rust
//! use insight_engine::dataset::Metadata;
//! use insight_engine::engine::AnalysisEngine;
//! use serde_json::json;
//!
//! let engine = AnalysisEngine::new();
//! let profile = engine
//!     .analyze_json(&json!([{"x": 1}, {"x": 2}, {"x": 3}]), Metadata::new())
//!     .unwrap();
//!
//! assert_eq!(profile.metadata.row_count, 3);
//! assert_eq!(profile.descriptive_stats["x"].mean, 2.0);
//! ```

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::analyzers::{
    AnalysisContext, Analyzer, CorrelationEngine, DataQualityAssessor, DescriptiveStatistics,
    OutlierDetector, TrendAnalyzer,
};
use crate::config::EngineConfig;
use crate::dataset::{Dataset, Metadata};
use crate::error::{EngineError, Result};
use crate::logging::{truncate_field, LogConfig};
use crate::profile::{AnalysisProfile, ProfileMetadata};
use crate::{log_data_op, perf_debug};

/// Stateless analysis engine.
#[derive(Debug, Clone, Default)]
pub struct AnalysisEngine {
    config: EngineConfig,
    log_config: LogConfig,
}

impl AnalysisEngine {
    /// Creates an engine with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            log_config: LogConfig::default(),
        })
    }

    pub fn builder() -> AnalysisEngineBuilder {
        AnalysisEngineBuilder::default()
    }

    /// Replaces the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.log_config
    }

    /// Profiles `dataset`, echoing `metadata` into the result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] when the dataset has no rows.
    /// Nothing else fails: unusable cells and columns are skipped.
    #[instrument(skip_all, fields(rows = dataset.row_count(), columns = dataset.column_count()))]
    pub fn analyze(&self, dataset: &Dataset, metadata: Metadata) -> Result<AnalysisProfile> {
        if dataset.is_empty() {
            return Err(EngineError::invalid_input(
                "Invalid or empty data provided for analysis",
            ));
        }

        let started = Instant::now();
        log_data_op!(
            self.log_config,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Starting dataset analysis"
        );

        let ctx = AnalysisContext::new(dataset, &self.config).with_log_config(self.log_config.clone());
        perf_debug!(
            self.log_config,
            numeric_columns = %truncate_field(
                &ctx.numeric_columns().join(", "),
                self.log_config.max_field_length
            ),
            "Classified numeric columns"
        );

        let descriptive_stats = run(&DescriptiveStatistics::new(), &ctx);
        let correlation_matrix = run(&CorrelationEngine::new(), &ctx);
        let data_quality = run(&DataQualityAssessor::new(), &ctx);
        let outliers = run(&OutlierDetector::new(), &ctx);
        let trends = run(&TrendAnalyzer::new(), &ctx);

        let processing_time = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log_data_op!(
            self.log_config,
            processing_time_ms = processing_time,
            quality_score = data_quality.overall_score,
            outlier_columns = outliers.len(),
            "Completed dataset analysis"
        );

        Ok(AnalysisProfile {
            descriptive_stats,
            correlation_matrix,
            data_quality,
            outliers,
            trends,
            metadata: ProfileMetadata::new(
                metadata,
                dataset.row_count(),
                dataset.column_count(),
                processing_time,
                Utc::now(),
            ),
        })
    }

    /// Parses a JSON array of objects and profiles it.
    pub fn analyze_json(&self, rows: &Value, metadata: Metadata) -> Result<AnalysisProfile> {
        let dataset = Dataset::from_json(rows)?;
        self.analyze(&dataset, metadata)
    }

    /// Runs [`analyze`](Self::analyze) on tokio's blocking pool.
    ///
    /// Large datasets keep a worker busy for the whole computation; request
    /// handlers should call this instead of `analyze` so other tasks on the
    /// runtime keep making progress.
    pub async fn analyze_offloaded(
        &self,
        dataset: Arc<Dataset>,
        metadata: Metadata,
    ) -> Result<AnalysisProfile> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.analyze(&dataset, metadata)).await?
    }
}

fn run<A: Analyzer>(analyzer: &A, ctx: &AnalysisContext<'_>) -> A::Output {
    debug!(
        analyzer = analyzer.name(),
        numeric_only = analyzer.requires_numeric_columns(),
        "{}",
        analyzer.description()
    );
    analyzer.analyze(ctx)
}

/// Builder for [`AnalysisEngine`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisEngineBuilder {
    config: EngineConfig,
    log_config: LogConfig,
}

impl AnalysisEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Validates the configuration and builds the engine.
    pub fn build(self) -> Result<AnalysisEngine> {
        Ok(AnalysisEngine::with_config(self.config)?.with_log_config(self.log_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_dataset_is_rejected() {
        let err = AnalysisEngine::new()
            .analyze(&Dataset::default(), Metadata::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_non_array_input_is_rejected() {
        let engine = AnalysisEngine::new();
        for input in [json!(null), json!({"a": 1}), json!("rows"), json!([])] {
            let err = engine.analyze_json(&input, Metadata::new()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)), "{input}");
        }
    }

    #[test]
    fn test_builder_validates_config() {
        let config = EngineConfig {
            sample_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            AnalysisEngine::builder().config(config).build(),
            Err(EngineError::Configuration(_))
        ));
        assert!(AnalysisEngine::builder()
            .log_config(LogConfig::verbose())
            .build()
            .is_ok());
    }

    #[test]
    fn test_profile_sections_are_populated() {
        let rows = json!([
            {"x": 1, "y": 2, "label": "a"},
            {"x": 2, "y": 4, "label": "b"},
            {"x": 3, "y": 6, "label": "c"},
            {"x": 4, "y": 8, "label": "d"},
            {"x": 100, "y": 200, "label": "e"},
        ]);
        let profile = AnalysisEngine::new()
            .analyze_json(&rows, Metadata::new())
            .unwrap();

        assert_eq!(profile.numeric_columns().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(profile.correlation_matrix.get("x", "y"), Some(1.0));
        assert!(profile.outliers.contains_key("x"));
        assert!(profile.trends.contains_key("y"));
        assert_eq!(profile.metadata.column_count, 3);
        assert_eq!(profile.data_quality.overall_score, 100.0);
    }

    #[tokio::test]
    async fn test_offloaded_analysis_matches_inline() {
        let dataset = Arc::new(
            Dataset::from_json(&json!([{"v": 1}, {"v": 3}, {"v": 2}, {"v": 5}])).unwrap(),
        );
        let engine = AnalysisEngine::new();
        let offloaded = engine
            .analyze_offloaded(Arc::clone(&dataset), Metadata::new())
            .await
            .unwrap();
        let inline = engine.analyze(&dataset, Metadata::new()).unwrap();
        assert_eq!(offloaded.descriptive_stats, inline.descriptive_stats);
        assert_eq!(offloaded.trends, inline.trends);
    }
}
