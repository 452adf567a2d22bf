//! Rendering of analysis profiles for people and machines.
//!
//! This module provides formatters that turn an [`AnalysisProfile`] into JSON,
//! human-readable console text, or Markdown for reports.
//!
//! # Examples
//!
//! ```rust
//! use insight_engine::dataset::Metadata;
//! use insight_engine::engine::AnalysisEngine;
//! use insight_engine::formatters::{FormatterConfig, HumanFormatter, ProfileFormatter};
//! use serde_json::json;
//!
//! let profile = AnalysisEngine::new()
//!     .analyze_json(&json!([{"x": 1}, {"x": 2}, {"x": 3}]), Metadata::new())
//!     .unwrap();
//!
//! let formatter = HumanFormatter::with_config(FormatterConfig::minimal());
//! let output = formatter.format(&profile).unwrap();
//! assert!(output.contains("Rows: 3"));
//! ```

use std::fmt::{self, Write};

use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::profile::AnalysisProfile;

/// Configuration options for formatting profiles.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the per-column descriptive statistics
    pub include_column_stats: bool,
    /// Include the sampled outlier rows of each column
    pub include_outlier_samples: bool,
    /// Maximum number of columns listed per section (`None` for all)
    pub max_columns: Option<usize>,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include the analysis timestamp
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_column_stats: true,
            include_outlier_samples: true,
            max_columns: None,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the summary.
    pub fn minimal() -> Self {
        Self {
            include_column_stats: false,
            include_outlier_samples: false,
            max_columns: Some(0),
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Creates a detailed configuration showing everything.
    pub fn detailed() -> Self {
        Self::default()
    }

    /// Creates a configuration suitable for CI logs.
    pub fn ci() -> Self {
        Self {
            include_column_stats: true,
            include_outlier_samples: false,
            max_columns: Some(25),
            use_colors: false,
            include_timestamps: true,
        }
    }

    /// Sets whether to include per-column statistics.
    pub fn with_column_stats(mut self, include: bool) -> Self {
        self.include_column_stats = include;
        self
    }

    /// Sets whether to include outlier samples.
    pub fn with_outlier_samples(mut self, include: bool) -> Self {
        self.include_outlier_samples = include;
        self
    }

    /// Sets the maximum number of columns listed per section.
    pub fn with_max_columns(mut self, max: usize) -> Self {
        self.max_columns = Some(max);
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn column_limit(&self) -> usize {
        self.max_columns.unwrap_or(usize::MAX)
    }
}

/// Trait for formatting analysis profiles into different output formats.
///
/// # Examples
///
/// ```rust
/// use insight_engine::formatters::ProfileFormatter;
/// use insight_engine::profile::AnalysisProfile;
///
/// struct QualityOnly;
///
/// impl ProfileFormatter for QualityOnly {
///     fn format(&self, profile: &AnalysisProfile) -> insight_engine::Result<String> {
///         Ok(format!("quality: {}", profile.data_quality.overall_score))
///     }
/// }
/// ```
pub trait ProfileFormatter {
    /// Formats a profile into a string representation.
    fn format(&self, profile: &AnalysisProfile) -> Result<String>;

    /// Formats a profile with custom configuration.
    fn format_with_config(
        &self,
        profile: &AnalysisProfile,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(profile)
    }
}

fn render_error(e: fmt::Error) -> EngineError {
    EngineError::Serialization(format!("Failed to render profile: {e}"))
}

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{color}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// Formats profiles as JSON with their wire key names.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops the sections a configuration excludes.
fn filter_profile_for_config(profile: &AnalysisProfile, config: &FormatterConfig) -> Result<Value> {
    let mut value = profile.to_json()?;
    if let Some(object) = value.as_object_mut() {
        if !config.include_column_stats {
            object.remove("descriptiveStats");
        }
        if !config.include_outlier_samples {
            if let Some(Value::Object(outliers)) = object.get_mut("outliers") {
                for report in outliers.values_mut() {
                    if let Some(report) = report.as_object_mut() {
                        report.remove("outliers");
                    }
                }
            }
        }
    }
    Ok(value)
}

impl ProfileFormatter for JsonFormatter {
    fn format(&self, profile: &AnalysisProfile) -> Result<String> {
        self.format_with_config(profile, &self.config)
    }

    fn format_with_config(
        &self,
        profile: &AnalysisProfile,
        config: &FormatterConfig,
    ) -> Result<String> {
        let filtered = filter_profile_for_config(profile, config)?;
        let output = if self.pretty {
            serde_json::to_string_pretty(&filtered)?
        } else {
            serde_json::to_string(&filtered)?
        };
        Ok(output)
    }
}

/// Formats profiles as console text.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a new human formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    /// Creates a new human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn render(out: &mut String, profile: &AnalysisProfile, config: &FormatterConfig) -> fmt::Result {
        let meta = &profile.metadata;
        let quality = &profile.data_quality;
        let limit = config.column_limit();

        writeln!(out)?;
        writeln!(out, "📊 {}", paint("Analysis Profile", "1", config.use_colors))?;
        writeln!(out)?;
        writeln!(out, "   Rows: {}", meta.row_count)?;
        writeln!(out, "   Columns: {}", meta.column_count)?;
        writeln!(out, "   Numeric Columns: {}", profile.descriptive_stats.len())?;
        writeln!(out, "   Processing Time: {}ms", meta.processing_time)?;
        if config.include_timestamps {
            writeln!(out, "   Analyzed At: {}", meta.analyzed_at)?;
        }

        let score_color = if quality.overall_score >= 90.0 {
            "32"
        } else if quality.overall_score >= 70.0 {
            "33"
        } else {
            "31"
        };
        writeln!(out)?;
        writeln!(
            out,
            "🧪 Data Quality: {}",
            paint(&format!("{:.2}%", quality.overall_score), score_color, config.use_colors)
        )?;
        writeln!(out, "   Completeness: {:.2}%", quality.completeness)?;
        writeln!(out, "   Uniqueness: {:.2}%", quality.uniqueness)?;
        writeln!(out, "   Consistency: {:.2}%", quality.consistency)?;
        writeln!(out, "   Validity: {:.2}%", quality.validity)?;
        for recommendation in &quality.recommendations {
            writeln!(out, "   ⚠️  {recommendation}")?;
        }

        if config.include_column_stats && !profile.descriptive_stats.is_empty() && limit > 0 {
            writeln!(out)?;
            writeln!(out, "📈 Column Statistics:")?;
            for (column, stats) in profile.descriptive_stats.iter().take(limit) {
                writeln!(
                    out,
                    "   {column}: n={} mean={} median={} stdDev={} min={} max={}",
                    stats.count, stats.mean, stats.median, stats.std_dev, stats.min, stats.max
                )?;
            }
            let hidden = profile.descriptive_stats.len().saturating_sub(limit);
            if hidden > 0 {
                writeln!(out, "   ... and {hidden} more columns")?;
            }
        }

        let strong = &profile.correlation_matrix.strong_correlations;
        if !strong.is_empty() && limit > 0 {
            writeln!(out)?;
            writeln!(out, "🔗 Strong Correlations:")?;
            for pair in strong.iter().take(limit) {
                writeln!(
                    out,
                    "   {} ↔ {}: {} ({})",
                    pair.column1, pair.column2, pair.correlation, pair.strength
                )?;
            }
        }

        if !profile.outliers.is_empty() && limit > 0 {
            writeln!(out)?;
            writeln!(out, "🔍 Outliers:")?;
            for (column, report) in profile.outliers.iter().take(limit) {
                writeln!(
                    out,
                    "   {column}: {} outliers ({:.2}%) outside [{}, {}]",
                    report.count, report.percentage, report.bounds.lower, report.bounds.upper
                )?;
                if config.include_outlier_samples {
                    for outlier in &report.outliers {
                        writeln!(
                            out,
                            "      row {}: {} ({:?})",
                            outlier.row_index, outlier.value, outlier.severity
                        )?;
                    }
                }
            }
        }

        if !profile.trends.is_empty() && limit > 0 {
            writeln!(out)?;
            writeln!(out, "📉 Trends:")?;
            for (column, trend) in profile.trends.iter().take(limit) {
                writeln!(
                    out,
                    "   {column}: {} (slope={}, R²={}, {}), next ≈ {} ({} confidence)",
                    trend.direction,
                    trend.slope,
                    trend.r_squared,
                    trend.significance,
                    trend.prediction.next_predicted_value,
                    trend.prediction.confidence
                )?;
            }
        }

        writeln!(out)
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileFormatter for HumanFormatter {
    fn format(&self, profile: &AnalysisProfile) -> Result<String> {
        self.format_with_config(profile, &self.config)
    }

    fn format_with_config(
        &self,
        profile: &AnalysisProfile,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        Self::render(&mut output, profile, config).map_err(render_error)?;
        Ok(output)
    }
}

/// Formats profiles as Markdown suitable for reports.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a new Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    /// Creates a new Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }

    fn render(
        &self,
        out: &mut String,
        profile: &AnalysisProfile,
        config: &FormatterConfig,
    ) -> fmt::Result {
        let h = "#".repeat(self.heading_level as usize);
        let meta = &profile.metadata;
        let quality = &profile.data_quality;
        let limit = config.column_limit();

        writeln!(out, "{h} Analysis Profile")?;
        writeln!(out)?;
        writeln!(out, "**Rows:** {}  ", meta.row_count)?;
        writeln!(out, "**Columns:** {}  ", meta.column_count)?;
        writeln!(out, "**Processing Time:** {}ms", meta.processing_time)?;
        if config.include_timestamps {
            writeln!(out, "**Analyzed At:** {}", meta.analyzed_at)?;
        }

        writeln!(out)?;
        writeln!(out, "{h}# Data Quality")?;
        writeln!(out)?;
        writeln!(out, "| Score | Value |")?;
        writeln!(out, "|-------|-------|")?;
        writeln!(out, "| Overall | {:.2}% |", quality.overall_score)?;
        writeln!(out, "| Completeness | {:.2}% |", quality.completeness)?;
        writeln!(out, "| Uniqueness | {:.2}% |", quality.uniqueness)?;
        writeln!(out, "| Consistency | {:.2}% |", quality.consistency)?;
        writeln!(out, "| Validity | {:.2}% |", quality.validity)?;
        if !quality.recommendations.is_empty() {
            writeln!(out)?;
            for recommendation in &quality.recommendations {
                writeln!(out, "- {recommendation}")?;
            }
        }

        if config.include_column_stats && !profile.descriptive_stats.is_empty() && limit > 0 {
            writeln!(out)?;
            writeln!(out, "{h}# Column Statistics")?;
            writeln!(out)?;
            writeln!(out, "| Column | Count | Mean | Median | Std Dev | Min | Max |")?;
            writeln!(out, "|--------|-------|------|--------|---------|-----|-----|")?;
            for (column, s) in profile.descriptive_stats.iter().take(limit) {
                writeln!(
                    out,
                    "| {column} | {} | {} | {} | {} | {} | {} |",
                    s.count, s.mean, s.median, s.std_dev, s.min, s.max
                )?;
            }
        }

        let strong = &profile.correlation_matrix.strong_correlations;
        if !strong.is_empty() && limit > 0 {
            writeln!(out)?;
            writeln!(out, "{h}# Strong Correlations")?;
            writeln!(out)?;
            writeln!(out, "| Column 1 | Column 2 | Coefficient | Strength |")?;
            writeln!(out, "|----------|----------|-------------|----------|")?;
            for pair in strong.iter().take(limit) {
                writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    pair.column1, pair.column2, pair.correlation, pair.strength
                )?;
            }
        }

        if !profile.outliers.is_empty() && limit > 0 {
            writeln!(out)?;
            writeln!(out, "{h}# Outliers")?;
            writeln!(out)?;
            writeln!(out, "| Column | Count | Percentage | Lower | Upper |")?;
            writeln!(out, "|--------|-------|------------|-------|-------|")?;
            for (column, r) in profile.outliers.iter().take(limit) {
                writeln!(
                    out,
                    "| {column} | {} | {:.2}% | {} | {} |",
                    r.count, r.percentage, r.bounds.lower, r.bounds.upper
                )?;
            }
        }

        if !profile.trends.is_empty() && limit > 0 {
            writeln!(out)?;
            writeln!(out, "{h}# Trends")?;
            writeln!(out)?;
            writeln!(out, "| Column | Direction | Slope | R² | Next Value | Confidence |")?;
            writeln!(out, "|--------|-----------|-------|----|------------|------------|")?;
            for (column, t) in profile.trends.iter().take(limit) {
                writeln!(
                    out,
                    "| {column} | {} | {} | {} | {} | {} |",
                    t.direction,
                    t.slope,
                    t.r_squared,
                    t.prediction.next_predicted_value,
                    t.prediction.confidence
                )?;
            }
        }

        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileFormatter for MarkdownFormatter {
    fn format(&self, profile: &AnalysisProfile) -> Result<String> {
        self.format_with_config(profile, &self.config)
    }

    fn format_with_config(
        &self,
        profile: &AnalysisProfile,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        self.render(&mut output, profile, config)
            .map_err(render_error)?;
        Ok(output)
    }
}
