//! Distribution of the held-out target.

use crate::error::{EvalError, Result};
use crate::eval::charts::{HistogramBin, error_histogram};
use serde::{Deserialize, Serialize};

/// Central tendency, spread and histogram of the target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub count: usize,
    pub mean: f64,
    /// Average of the two middle values for an even count.
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub histogram: Vec<HistogramBin>,
}

pub fn target_summary(targets: &[f64], bins: usize) -> Result<TargetSummary> {
    if targets.is_empty() {
        return Err(EvalError::EmptyInput("target series has no values"));
    }
    let n = targets.len() as f64;
    let mean = targets.iter().sum::<f64>() / n;
    let variance = targets.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;

    Ok(TargetSummary {
        count: targets.len(),
        mean,
        median: median(targets),
        std: variance.sqrt(),
        histogram: error_histogram(targets, bins)?,
    })
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
