//! # Insight Engine - Statistical Profiling for Tabular Data
//!
//! Insight Engine turns an in-memory table (rows of named, loosely-typed
//! cells) into a structured statistical profile: per-column descriptive
//! statistics, a Pearson correlation matrix, a data quality score, IQR
//! outliers and least-squares trends. The engine performs no I/O; it is a
//! pure function of the dataset and a caller-supplied metadata map.
//!
//! ## Quick Start
//!
//! ```rust
//! use insight_engine::prelude::*;
//! use serde_json::json;
//!
//! # fn example() -> insight_engine::Result<()> {
//! let rows = json!([
//!     {"month": 1, "revenue": 1200.5, "region": "north"},
//!     {"month": 2, "revenue": 1350.0, "region": "south"},
//!     {"month": 3, "revenue": 1410.25, "region": "north"},
//!     {"month": 4, "revenue": "1525", "region": "east"},
//! ]);
//!
//! let mut metadata = Metadata::new();
//! metadata.insert("fileName".into(), json!("revenue.csv"));
//!
//! let profile = AnalysisEngine::new().analyze_json(&rows, metadata)?;
//!
//! // "region" is text, so only the two numeric columns are profiled
//! assert_eq!(profile.descriptive_stats.len(), 2);
//! assert_eq!(profile.metadata.row_count, 4);
//!
//! let summary = HumanFormatter::new().format(&profile)?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## What Gets Computed
//!
//! - **Numeric classification**: a column is numeric when more than 80% of the
//!   non-missing cells in the first 100 rows parse as finite numbers
//! - **Descriptive statistics**: mean, floor-index quartiles, mode, population
//!   variance, skewness and excess kurtosis
//! - **Correlation**: symmetric Pearson matrix with ranked strong pairs
//! - **Data quality**: completeness, uniqueness, consistency and validity
//!   scores with recommendations
//! - **Outliers**: Tukey fences with the first flagged rows sampled
//! - **Trends**: least-squares slope over row order with a one-step prediction
//!
//! ## Architecture
//!
//! - **`dataset`**: `Cell`, `Row` and `Dataset` with numeric parse semantics
//! - **`analyzers`**: one analyzer per profile section behind the `Analyzer` trait
//! - **`engine`**: the `AnalysisEngine` orchestrator, inline or on tokio's blocking pool
//! - **`profile`**: the serializable `AnalysisProfile`
//! - **`insights`**: prompt building and fallback handling for text-generation backends
//! - **`formatters`**: JSON, console and Markdown rendering
//! - **`config`** / **`logging`**: thresholds and `tracing` setup

pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod formatters;
pub mod insights;
pub mod logging;
pub mod prelude;
pub mod profile;

pub use error::{EngineError, Result};
