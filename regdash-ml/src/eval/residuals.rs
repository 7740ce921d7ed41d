//! Residual statistics.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// Summary statistics of a residual series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualSummary {
    /// Bias indicator, near zero for an unbiased model.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub max_abs: f64,
    pub min_abs: f64,
}

pub fn residual_summary(residuals: &[f64]) -> Result<ResidualSummary> {
    if residuals.is_empty() {
        return Err(EvalError::EmptyInput("residual series has no values"));
    }
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    let (min_abs, max_abs) = residuals
        .iter()
        .map(|r| r.abs())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    Ok(ResidualSummary {
        mean,
        std: variance.sqrt(),
        max_abs,
        min_abs,
    })
}
