//! Core analyzer trait.

use std::fmt::Debug;

use serde::Serialize;

use super::context::AnalysisContext;

/// A component that derives one section of the profile from a dataset.
///
/// Analyzers never fail: unparseable cells and columns with too few values
/// are skipped, so the output simply omits them. They hold no mutable state
/// and may run in any order or in parallel against the same context.
///
/// # Example
///
/// ```rust
/// use insight_engine::analyzers::{AnalysisContext, Analyzer};
/// use insight_engine::config::EngineConfig;
/// use insight_engine::dataset::{Dataset, Row};
///
/// #[derive(Debug)]
/// struct RowCounter;
///
/// impl Analyzer for RowCounter {
///     type Output = usize;
///
///     fn analyze(&self, ctx: &AnalysisContext<'_>) -> Self::Output {
///         ctx.dataset().row_count()
///     }
///
///     fn name(&self) -> &str {
///         "row_counter"
///     }
/// }
///
/// let dataset = Dataset::from_rows(vec![Row::from_pairs([("a", 1.0)])]);
/// let config = EngineConfig::default();
/// let ctx = AnalysisContext::new(&dataset, &config);
/// assert_eq!(RowCounter.analyze(&ctx), 1);
/// ```
pub trait Analyzer: Send + Sync + Debug {
    /// The profile section produced by this analyzer.
    type Output: Serialize + Send;

    /// Computes the profile section.
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Self::Output;

    /// Returns the name of this analyzer.
    fn name(&self) -> &str;

    /// Returns a description of what this analyzer computes.
    fn description(&self) -> &str {
        ""
    }

    /// Whether the analyzer only looks at columns classified as numeric.
    fn requires_numeric_columns(&self) -> bool {
        true
    }
}
