//! Evaluation engine: metrics, residuals, model ranking, target distribution
//! and chart summaries.
//!
//! Every function here is pure: inputs are borrowed slices and outputs are
//! freshly computed values. Nothing is cached between calls.

pub mod charts;
pub mod metrics;
pub mod ranking;
pub mod residuals;
pub mod target;

pub use charts::ChartOptions;
pub use metrics::{Metric, MetricRecord, compute_metrics, compute_residuals, format_metric};
pub use ranking::{RankingTable, rank_models};
pub use residuals::{ResidualSummary, residual_summary};
pub use target::{TargetSummary, target_summary};
