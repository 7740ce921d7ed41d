//! Chart-ready summaries consumed by the presentation layer.
//!
//! Nothing here draws anything. Each builder turns engine output into plain
//! point/bar/bin data that a renderer can plot directly.

use crate::error::{EvalError, Result};
use crate::eval::metrics::{Metric, MetricRecord, compute_residuals};
use crate::eval::ranking::best_index;
use serde::{Deserialize, Serialize};

/// Options shared by the chart builders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Number of leading samples shown in the line comparison.
    pub sample_size: usize,
    /// Number of bins in the residual histogram.
    pub histogram_bins: usize,
    /// Number of features kept in the importance chart.
    pub top_n: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            sample_size: 100,
            histogram_bins: 30,
            top_n: 15,
        }
    }
}

/// Actual vs predicted scatter with the perfect-prediction diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityPlot {
    pub points: Vec<(f64, f64)>,
    /// The diagonal runs from `(lo, lo)` to `(hi, hi)`.
    pub diagonal: (f64, f64),
}

pub fn parity_plot(actual: &[f64], predicted: &[f64]) -> Result<ParityPlot> {
    // validates the shape
    compute_residuals(actual, predicted)?;
    let (lo, hi) = actual
        .iter()
        .chain(predicted.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    Ok(ParityPlot {
        points: actual.iter().copied().zip(predicted.iter().copied()).collect(),
        diagonal: (lo, hi),
    })
}

/// Residual against predicted value, plotted around a zero line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualScatter {
    pub points: Vec<(f64, f64)>,
}

pub fn residual_scatter(actual: &[f64], predicted: &[f64]) -> Result<ResidualScatter> {
    let residuals = compute_residuals(actual, predicted)?;
    Ok(ResidualScatter {
        points: predicted.iter().copied().zip(residuals).collect(),
    })
}

/// Leading samples of both series, indexed by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleLines {
    pub indices: Vec<usize>,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

pub fn sample_lines(actual: &[f64], predicted: &[f64], sample_size: usize) -> Result<SampleLines> {
    compute_residuals(actual, predicted)?;
    let n = sample_size.min(actual.len());
    Ok(SampleLines {
        indices: (0..n).collect(),
        actual: actual[..n].to_vec(),
        predicted: predicted[..n].to_vec(),
    })
}

/// One histogram bin covering `[lower, upper)`; the last bin is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of residuals over `[min, max]`.
///
/// A constant series produces a single bin holding every value. Infinite
/// values are rejected; a span too wide for `f64` is binned at half scale.
pub fn error_histogram(residuals: &[f64], bins: usize) -> Result<Vec<HistogramBin>> {
    if residuals.is_empty() {
        return Err(EvalError::EmptyInput("residual series has no values"));
    }
    if bins == 0 {
        return Err(EvalError::invalid_input("histogram needs at least one bin"));
    }
    let (lo, hi) = residuals
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return Err(EvalError::invalid_input("histogram values must be finite"));
    }

    if hi == lo {
        return Ok(vec![HistogramBin {
            lower: lo,
            upper: hi,
            count: residuals.len(),
        }]);
    }

    // Work at half scale when hi - lo overflows
    let scale = if (hi - lo).is_finite() { 1.0 } else { 0.5 };
    let span = hi * scale - lo * scale;
    let width = span / bins as f64;
    let mut counts = vec![0usize; bins];
    for &r in residuals {
        let idx = ((r * scale - lo * scale) / width) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    let bound = |i: usize| lo + (width * i as f64) / scale;
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: bound(i),
            upper: if i + 1 == bins { hi } else { bound(i + 1) },
            count,
        })
        .collect())
}

/// One bar in the model comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonBar {
    pub model: String,
    pub value: f64,
    pub is_best: bool,
}

/// Bars for one metric across models, highlighting the winner.
pub fn model_comparison(
    per_model: &[(String, MetricRecord)],
    metric: Metric,
) -> Result<Vec<ComparisonBar>> {
    if per_model.is_empty() {
        return Err(EvalError::EmptyInput("no models to compare"));
    }
    let best = best_index(per_model.iter().map(|(_, m)| m.get(metric)), metric);
    Ok(per_model
        .iter()
        .enumerate()
        .map(|(i, (model, metrics))| ComparisonBar {
            model: model.clone(),
            value: metrics.get(metric),
            is_best: i == best,
        })
        .collect())
}
