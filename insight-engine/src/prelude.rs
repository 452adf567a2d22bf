//! Prelude for commonly used types and traits in insight-engine.

pub use crate::analyzers::Analyzer;
pub use crate::config::EngineConfig;
pub use crate::dataset::{Cell, Dataset, Metadata, Row};
pub use crate::engine::AnalysisEngine;
pub use crate::error::{EngineError, Result};
pub use crate::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, ProfileFormatter};
pub use crate::insights::{InsightGenerator, InsightRecord, InsightService, InsightTemplate};
pub use crate::logging::LogConfig;
pub use crate::profile::AnalysisProfile;
