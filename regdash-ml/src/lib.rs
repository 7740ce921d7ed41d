//! # regdash-ml — evaluation engine for pre-trained regression models
//!
//! Loads serialized model pipelines and a held-out dataset, scores every model,
//! and turns (actual, predicted) series into metrics, residual statistics,
//! cross-model rankings and chart-ready summaries.
//!
//! ## Layout
//!
//! - [`eval`] — the pure evaluation engine: metrics, residuals, ranking, charts
//! - [`interpretability`] — feature importance from model capabilities
//! - [`inference`] — the [`RegressionModel`] trait, JSON pipelines and the [`ModelStore`]
//! - [`data`] — CSV loading, target split, synthetic fallback, input validation
//! - [`dashboard`] — a session tying one dataset to one model store
//!
//! ```no_run
//! use regdash_ml::{Dashboard, RegdashConfig};
//! use std::path::Path;
//!
//! let config = RegdashConfig::default();
//! let dashboard = Dashboard::from_config(&config, Path::new("."))?;
//! let ranking = dashboard.compare()?;
//! println!("{:?}", ranking.best);
//! # Ok::<(), regdash_ml::EvalError>(())
//! ```

// Foundation
pub mod config;
pub mod error;
pub mod persistence;

// Engine
pub mod eval;
pub mod interpretability;

// Models & data
pub mod data;
pub mod inference;

pub mod dashboard;

// Re-exports
pub use config::{ConfigOverrides, RegdashConfig, load_config};
pub use dashboard::{
    ChartBundle, Dashboard, EvaluationReport, ImportanceView, ModelEvaluation, PredictionResult,
};
pub use data::{DataTable, FeatureTable, FeatureValue};
pub use error::{EvalError, Result};
pub use eval::{
    ChartOptions, Metric, MetricRecord, RankingTable, ResidualSummary, TargetSummary,
};
pub use inference::{ModelPipeline, ModelStore, RegressionModel};
pub use interpretability::{FeatureImportance, ImportanceCapability};
