//! Statistical analyzers that make up an analysis profile.
//!
//! Each analyzer implements [`Analyzer`] and reads a shared
//! [`AnalysisContext`], which holds the dataset, the engine configuration and
//! the numeric columns picked by the [`NumericColumnClassifier`]. Analyzers
//! never fail: a column without enough usable values is simply left out of
//! that analyzer's output.
//!
//! ## Available Analyzers
//!
//! - **Descriptive statistics** (`descriptive`): mean, quartiles, dispersion and shape
//! - **Correlation** (`correlation`): pairwise Pearson matrix and strong pairs
//! - **Data quality** (`quality`): completeness, uniqueness, consistency, validity
//! - **Outliers** (`outliers`): IQR fence detection with sampled rows
//! - **Trends** (`trend`): least-squares fit over row order with a prediction
//!
//! ## Example Usage
//!
//! ```rust
//! use insight_engine::analyzers::{AnalysisContext, Analyzer, DescriptiveStatistics};
//! use insight_engine::config::EngineConfig;
//! use insight_engine::dataset::Dataset;
//! use serde_json::json;
//!
//! let dataset = Dataset::from_json(&json!([
//!     {"price": 10.5, "sku": "a"},
//!     {"price": 12.0, "sku": "b"},
//!     {"price": 9.75, "sku": "c"},
//! ]))
//! .unwrap();
//! let config = EngineConfig::default();
//! let ctx = AnalysisContext::new(&dataset, &config);
//!
//! assert_eq!(ctx.numeric_columns(), ["price".to_string()]);
//! let stats = DescriptiveStatistics::new().analyze(&ctx);
//! assert_eq!(stats["price"].count, 3);
//! ```

pub mod buckets;
pub mod context;
pub mod correlation;
pub mod descriptive;
pub mod inference;
pub mod math;
pub mod outliers;
pub mod quality;
pub mod traits;
pub mod trend;

pub use buckets::{correlation_strength, Confidence, Strength};
pub use context::AnalysisContext;
pub use correlation::{CorrelationEngine, CorrelationMatrix, CorrelationPair, PearsonSums};
pub use descriptive::{ColumnProfile, DescriptiveStatistics};
pub use inference::{ColumnClassification, NumericColumnClassifier, NumericColumnClassifierBuilder};
pub use outliers::{Fences, Outlier, OutlierDetector, OutlierReport, Severity};
pub use quality::{DataQualityAssessor, QualityIssues, QualityReport, Recommendation};
pub use traits::Analyzer;
pub use trend::{Direction, LinearFit, TrendAnalyzer, TrendPrediction, TrendReport};
