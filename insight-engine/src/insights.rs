//! Narrative insight generation around a finished profile.
//!
//! The engine does not produce prose itself. An [`InsightGenerator`] turns a
//! prompt built from the [`AnalysisProfile`] into free text, and
//! [`InsightService`] wraps that text into [`InsightRecord`]s and
//! [`BusinessReport`]s. The generator may be missing or failing at any time;
//! insight requests then degrade to [`InsightRecord::fallback`] while the
//! statistical profile is returned untouched.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use insight_engine::dataset::{Dataset, Metadata};
//! use insight_engine::engine::AnalysisEngine;
//! use insight_engine::insights::{InsightGenerator, InsightService, InsightTemplate};
//! use insight_engine::profile::AnalysisProfile;
//! use serde_json::json;
//!
//! #[derive(Debug)]
//! struct Echo;
//!
//! #[async_trait]
//! impl InsightGenerator for Echo {
//!     async fn generate_insights(
//!         &self,
//!         profile: &AnalysisProfile,
//!         _template: &InsightTemplate,
//!     ) -> insight_engine::Result<String> {
//!         Ok(format!("{} rows analyzed", profile.metadata.row_count))
//!     }
//!
//!     fn model_name(&self) -> &str {
//!         "echo"
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let dataset = Arc::new(Dataset::from_json(&json!([{"x": 1}, {"x": 2}])).unwrap());
//! let service = InsightService::new(Arc::new(Echo));
//! let outcome = service
//!     .analyze(&AnalysisEngine::new(), dataset, Metadata::new())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(outcome.insights.full_response, "2 rows analyzed");
//! assert_eq!(outcome.insights.model, "echo");
//! # })
//! ```

use std::fmt::{self, Debug, Write};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::dataset::{Dataset, Metadata};
use crate::engine::AnalysisEngine;
use crate::error::{EngineError, Result};
use crate::profile::AnalysisProfile;

/// Minimum absolute coefficient for a pair to be mentioned in a prompt.
const PROMPT_CORRELATION_THRESHOLD: f64 = 0.5;

/// Style of business report requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTemplate {
    #[default]
    Detailed,
    Executive,
    Technical,
}

impl ReportTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTemplate::Detailed => "detailed",
            ReportTemplate::Executive => "executive",
            ReportTemplate::Technical => "technical",
        }
    }
}

impl fmt::Display for ReportTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the generator is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsightTemplate {
    /// Free-form list of insights
    Insights,
    /// A structured report for stakeholders
    Report(ReportTemplate),
}

/// Source of narrative text for a profile.
///
/// Implementations wrap a text-generation backend. They receive the finished
/// profile and return raw text; wrapping it into records and reports is done
/// by [`InsightService`].
#[async_trait]
pub trait InsightGenerator: Debug + Send + Sync {
    /// Produces narrative text for `profile`.
    async fn generate_insights(
        &self,
        profile: &AnalysisProfile,
        template: &InsightTemplate,
    ) -> Result<String>;

    /// Name recorded as the `model` of generated records.
    fn model_name(&self) -> &str;
}

/// Generator used when no backend is configured; every call fails.
#[derive(Debug, Clone, Default)]
pub struct DisabledInsightGenerator;

#[async_trait]
impl InsightGenerator for DisabledInsightGenerator {
    async fn generate_insights(
        &self,
        _profile: &AnalysisProfile,
        _template: &InsightTemplate,
    ) -> Result<String> {
        Err(EngineError::insight_unavailable(
            "text generation API key not configured",
        ))
    }

    fn model_name(&self) -> &str {
        "disabled"
    }
}

fn render_error(e: fmt::Error) -> EngineError {
    EngineError::Serialization(format!("Failed to render insight prompt: {e}"))
}

/// Prompt text describing a profile.
pub struct InsightPrompt;

impl InsightPrompt {
    /// Renders the prompt for `template`.
    pub fn build(profile: &AnalysisProfile, template: &InsightTemplate) -> Result<String> {
        let mut prompt = String::new();
        Self::render(&mut prompt, profile, template).map_err(render_error)?;
        Ok(prompt)
    }

    fn render(
        out: &mut String,
        profile: &AnalysisProfile,
        template: &InsightTemplate,
    ) -> fmt::Result {
        Self::render_profile(out, profile)?;
        if let InsightTemplate::Report(report) = template {
            write!(
                out,
                "\n\nGenerate a {report} report for business stakeholders."
            )?;
        }
        Ok(())
    }

    fn render_profile(out: &mut String, profile: &AnalysisProfile) -> fmt::Result {
        let quality = &profile.data_quality;

        writeln!(
            out,
            "You are a senior data scientist. Analyze this dataset and provide actionable insights."
        )?;
        writeln!(out)?;
        writeln!(out, "DATASET OVERVIEW:")?;
        writeln!(out, "- Rows: {}", profile.metadata.row_count)?;
        writeln!(out, "- Columns: {}", profile.metadata.column_count)?;
        writeln!(out, "- Data Quality Score: {}%", quality.overall_score)?;
        writeln!(out)?;

        writeln!(out, "STATS:")?;
        if profile.descriptive_stats.is_empty() {
            writeln!(out, "No stats available")?;
        }
        for (column, stats) in &profile.descriptive_stats {
            writeln!(
                out,
                "- {column}: mean={}, median={}, stdDev={}",
                stats.mean, stats.median, stats.std_dev
            )?;
        }
        writeln!(out)?;

        writeln!(out, "CORRELATIONS:")?;
        if profile.correlation_matrix.is_empty() {
            writeln!(out, "No correlations available")?;
        } else {
            let mut any = false;
            for (a, row) in &profile.correlation_matrix.matrix {
                for (b, r) in row {
                    if a != b && r.abs() > PROMPT_CORRELATION_THRESHOLD {
                        writeln!(out, "{a} ↔ {b}: {:.1}%", r * 100.0)?;
                        any = true;
                    }
                }
            }
            if !any {
                writeln!(out, "No strong correlations found")?;
            }
        }
        writeln!(out)?;

        writeln!(out, "DATA QUALITY:")?;
        writeln!(out, "- Completeness: {}%", quality.completeness)?;
        writeln!(out, "- Uniqueness: {}%", quality.uniqueness)?;
        writeln!(out, "- Validity: {}%", quality.validity)?;
        writeln!(out, "- Consistency: {}%", quality.consistency)?;
        writeln!(out)?;

        writeln!(out, "OUTLIERS:")?;
        if profile.outliers.is_empty() {
            writeln!(out, "No outliers detected")?;
        }
        for (column, report) in &profile.outliers {
            writeln!(
                out,
                "- {column}: {} outliers ({:.2}%)",
                report.count, report.percentage
            )?;
        }
        writeln!(out)?;

        writeln!(out, "TRENDS:")?;
        if profile.trends.is_empty() {
            writeln!(out, "No trends found")?;
        }
        for (column, trend) in &profile.trends {
            writeln!(
                out,
                "- {column}: {} trend (R²={})",
                trend.direction, trend.r_squared
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Please provide:")?;
        writeln!(out, "1. Key Business Insights")?;
        writeln!(out, "2. Data Quality Assessment")?;
        writeln!(out, "3. Patterns & Correlations")?;
        writeln!(out, "4. Risks")?;
        writeln!(out, "5. Opportunities")?;
        write!(out, "6. Actionable Recommendations")
    }
}

/// A single narrative finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: String,
    pub finding: String,
    pub confidence: f64,
    pub priority: String,
    pub impact: String,
}

impl Insight {
    fn general(finding: impl Into<String>) -> Self {
        Self {
            category: "general".to_string(),
            finding: finding.into(),
            confidence: 0.8,
            priority: "medium".to_string(),
            impact: "moderate".to_string(),
        }
    }
}

/// Insights generated for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRecord {
    pub insights: Vec<Insight>,
    pub full_response: String,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

impl InsightRecord {
    /// Wraps generator output as a single general insight.
    pub fn from_response(text: impl Into<String>, model: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            insights: vec![Insight::general(text.clone())],
            full_response: text,
            generated_at: Utc::now(),
            model: model.into(),
        }
    }

    /// Record substituted when the generator is unavailable or fails.
    pub fn fallback() -> Self {
        Self {
            insights: vec![Insight::general("Analysis completed. AI insights unavailable.")],
            full_response: "Fallback response.".to_string(),
            generated_at: Utc::now(),
            model: "fallback".to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.model == "fallback"
    }
}

/// One titled block of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub content: String,
}

/// A business report built from generator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessReport {
    pub title: String,
    pub template: ReportTemplate,
    pub sections: Vec<ReportSection>,
    pub full_content: String,
    pub word_count: usize,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

impl BusinessReport {
    pub fn from_response(
        text: impl Into<String>,
        template: ReportTemplate,
        model: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            title: format!("{template} Data Analysis Report"),
            template,
            sections: vec![ReportSection {
                title: "Report".to_string(),
                content: text.clone(),
            }],
            word_count: text.split_whitespace().count(),
            full_content: text,
            generated_at: Utc::now(),
            model: model.into(),
        }
    }
}

/// A profile together with the insights generated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub profile: AnalysisProfile,
    pub insights: InsightRecord,
}

/// Runs the generator and wraps its output.
#[derive(Debug, Clone)]
pub struct InsightService {
    generator: Arc<dyn InsightGenerator>,
}

impl Default for InsightService {
    fn default() -> Self {
        Self::disabled()
    }
}

impl InsightService {
    pub fn new(generator: Arc<dyn InsightGenerator>) -> Self {
        Self { generator }
    }

    /// A service whose insight requests always fall back.
    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledInsightGenerator))
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Generates insights, propagating generator failures.
    #[instrument(skip_all, fields(model = self.generator.model_name()))]
    pub async fn insights(&self, profile: &AnalysisProfile) -> Result<InsightRecord> {
        let text = self
            .generator
            .generate_insights(profile, &InsightTemplate::Insights)
            .await?;
        Ok(InsightRecord::from_response(text, self.generator.model_name()))
    }

    /// Generates insights, substituting [`InsightRecord::fallback`] on failure.
    pub async fn insights_or_fallback(&self, profile: &AnalysisProfile) -> InsightRecord {
        match self.insights(profile).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, model = self.generator.model_name(), "Insight generation failed, using fallback");
                InsightRecord::fallback()
            }
        }
    }

    /// Generates a business report. Failures are returned to the caller.
    #[instrument(skip_all, fields(model = self.generator.model_name(), template = %template))]
    pub async fn report(
        &self,
        profile: &AnalysisProfile,
        template: ReportTemplate,
    ) -> Result<BusinessReport> {
        let text = self
            .generator
            .generate_insights(profile, &InsightTemplate::Report(template))
            .await?;
        let report = BusinessReport::from_response(text, template, self.generator.model_name());
        info!(words = report.word_count, "Generated business report");
        Ok(report)
    }

    /// Profiles `dataset` off the async runtime, then attaches insights.
    ///
    /// Only the analysis can fail; insight failures fall back.
    pub async fn analyze(
        &self,
        engine: &AnalysisEngine,
        dataset: Arc<Dataset>,
        metadata: Metadata,
    ) -> Result<AnalysisOutcome> {
        let profile = engine.analyze_offloaded(dataset, metadata).await?;
        let insights = self.insights_or_fallback(&profile).await;
        Ok(AnalysisOutcome { profile, insights })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> AnalysisProfile {
        AnalysisEngine::new()
            .analyze_json(
                &json!([
                    {"x": 1, "y": 2},
                    {"x": 2, "y": 4},
                    {"x": 3, "y": 6},
                    {"x": 4, "y": 8},
                    {"x": 100, "y": 200},
                ]),
                Metadata::new(),
            )
            .unwrap()
    }

    #[test]
    fn test_prompt_sections() {
        let prompt = InsightPrompt::build(&profile(), &InsightTemplate::Insights).unwrap();
        assert!(prompt.starts_with("You are a senior data scientist."));
        assert!(prompt.contains("- Rows: 5"));
        assert!(prompt.contains("- x: mean=22, median=3, stdDev=39.0128"));
        assert!(prompt.contains("x ↔ y: 100.0%"));
        assert!(prompt.contains("y ↔ x: 100.0%"));
        assert!(!prompt.contains("x ↔ x"));
        assert!(prompt.contains("- x: 1 outliers (20.00%)"));
        assert!(prompt.contains("- x: increasing trend (R²="));
        assert!(prompt.ends_with("6. Actionable Recommendations"));
    }

    #[test]
    fn test_report_prompt_appends_template() {
        let prompt = InsightPrompt::build(
            &profile(),
            &InsightTemplate::Report(ReportTemplate::Executive),
        )
        .unwrap();
        assert!(prompt.ends_with("Generate a executive report for business stakeholders."));
    }

    #[test]
    fn test_prompt_render_failures_surface_as_errors() {
        let err = render_error(fmt::Error);
        assert!(matches!(err, EngineError::Serialization(_)));
        assert!(err.to_string().contains("insight prompt"));
    }

    #[test]
    fn test_fallback_record() {
        let record = InsightRecord::fallback();
        assert!(record.is_fallback());
        assert_eq!(record.full_response, "Fallback response.");
        assert_eq!(record.insights.len(), 1);
        assert_eq!(
            record.insights[0].finding,
            "Analysis completed. AI insights unavailable."
        );
        assert_eq!(record.insights[0].category, "general");
    }

    #[test]
    fn test_business_report_from_response() {
        let report = BusinessReport::from_response(
            "  Revenue grew\nsteadily.  ",
            ReportTemplate::Technical,
            "mock",
        );
        assert_eq!(report.title, "technical Data Analysis Report");
        assert_eq!(report.word_count, 3);
        assert_eq!(report.sections[0].title, "Report");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["template"], json!("technical"));
        assert!(value.get("fullContent").is_some());
    }

    #[tokio::test]
    async fn test_disabled_service_falls_back() {
        let service = InsightService::disabled();
        let profile = profile();

        let record = service.insights_or_fallback(&profile).await;
        assert!(record.is_fallback());

        let err = service
            .report(&profile, ReportTemplate::Detailed)
            .await
            .unwrap_err();
        assert!(err.is_insight_error());
    }
}
