//! Regression error metrics over a pair of (actual, predicted) series.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the scalar metrics reported for a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "MSE")]
    Mse,
    #[serde(rename = "RMSE")]
    Rmse,
    #[serde(rename = "MAE")]
    Mae,
    #[serde(rename = "R2")]
    R2,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Mse, Metric::Rmse, Metric::Mae, Metric::R2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mse => "MSE",
            Self::Rmse => "RMSE",
            Self::Mae => "MAE",
            Self::R2 => "R2",
        }
    }

    /// R2 is a score; the others are errors.
    pub fn higher_is_better(&self) -> bool {
        matches!(self, Self::R2)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MSE" => Ok(Self::Mse),
            "RMSE" => Ok(Self::Rmse),
            "MAE" => Ok(Self::Mae),
            "R2" | "R2 SCORE" | "R²" | "R² SCORE" => Ok(Self::R2),
            other => Err(EvalError::invalid_input(format!("unknown metric '{other}'"))),
        }
    }
}

/// Metric record for one model scored against one held-out set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "MSE")]
    pub mse: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
}

impl MetricRecord {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mse => self.mse,
            Metric::Rmse => self.rmse,
            Metric::Mae => self.mae,
            Metric::R2 => self.r2,
        }
    }
}

fn check_shape(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(EvalError::shape(actual.len(), predicted.len()));
    }
    if actual.is_empty() {
        return Err(EvalError::EmptyInput("sample series has no values"));
    }
    Ok(())
}

/// Element-wise `actual[i] - predicted[i]`.
pub fn compute_residuals(actual: &[f64], predicted: &[f64]) -> Result<Vec<f64>> {
    check_shape(actual, predicted)?;
    Ok(actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| a - p)
        .collect())
}

/// Compute MSE, RMSE, MAE and R2.
///
/// When every actual value is identical the R2 denominator is zero. In that
/// case R2 is `1.0` if every prediction is exact and `f64::NEG_INFINITY`
/// otherwise.
pub fn compute_metrics(actual: &[f64], predicted: &[f64]) -> Result<MetricRecord> {
    let residuals = compute_residuals(actual, predicted)?;
    let n = residuals.len() as f64;

    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let abs_sum: f64 = residuals.iter().map(|r| r.abs()).sum();
    let mean_actual = actual.iter().sum::<f64>() / n;
    let sst: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();

    let mse = sse / n;
    let record = MetricRecord {
        mse,
        rmse: mse.sqrt(),
        mae: abs_sum / n,
        r2: r_squared(sse, sst),
    };
    tracing::debug!(n = residuals.len(), mse = record.mse, r2 = record.r2, "computed metrics");
    Ok(record)
}

fn r_squared(sse: f64, sst: f64) -> f64 {
    if sst == 0.0 {
        if sse == 0.0 {
            return 1.0;
        }
        tracing::warn!(sse, "R2 undefined for constant actual values; reporting -inf");
        return f64::NEG_INFINITY;
    }
    1.0 - sse / sst
}

/// Confidence percentage shown next to a single prediction, derived from R2.
pub fn model_confidence(r2: f64) -> f64 {
    (r2 * 100.0).max(0.0)
}

/// Format a metric value for display.
pub fn format_metric(value: f64, metric: Metric) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    match metric {
        Metric::R2 => format!("{value:.4}"),
        _ => group_thousands(&format!("{value:.2}")),
    }
}

fn group_thousands(fixed: &str) -> String {
    let (sign, body) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_concrete_scenario() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [1.0, 2.0, 3.0, 5.0];
        assert_eq!(
            compute_residuals(&actual, &predicted).unwrap(),
            vec![0.0, 0.0, 0.0, -1.0]
        );

        let m = compute_metrics(&actual, &predicted).unwrap();
        assert!((m.mae - 0.25).abs() < EPS);
        assert!((m.mse - 0.25).abs() < EPS);
        assert!((m.rmse - 0.5).abs() < EPS);
        assert!((m.r2 - 0.8).abs() < EPS);
    }

    #[test]
    fn test_identical_series_is_perfect() {
        let a = [3.5, -1.0, 7.25, 0.0];
        let m = compute_metrics(&a, &a).unwrap();
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = compute_metrics(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            EvalError::ShapeMismatch {
                actual: 2,
                predicted: 1
            }
        ));
        assert!(compute_residuals(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = compute_metrics(&[], &[]).unwrap_err();
        assert!(matches!(err, EvalError::EmptyInput(_)));
    }

    #[test]
    fn test_constant_actual_exact_prediction() {
        let m = compute_metrics(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_constant_actual_inexact_prediction() {
        let m = compute_metrics(&[5.0, 5.0, 5.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.r2, f64::NEG_INFINITY);
        assert!((m.mse - 2.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_worse_than_mean_is_negative() {
        let m = compute_metrics(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((m.r2 - (-3.0)).abs() < EPS);
    }

    #[test]
    fn test_metric_parse_and_lookup() {
        assert_eq!("rmse".parse::<Metric>().unwrap(), Metric::Rmse);
        assert_eq!("R2 Score".parse::<Metric>().unwrap(), Metric::R2);
        assert!("accuracy".parse::<Metric>().is_err());

        let record = MetricRecord {
            mse: 1.0,
            rmse: 2.0,
            mae: 3.0,
            r2: 4.0,
        };
        let values: Vec<f64> = Metric::ALL.iter().map(|m| record.get(*m)).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(Metric::R2.higher_is_better());
        assert!(!Metric::Mae.higher_is_better());
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(1234567.891, Metric::Mse), "1,234,567.89");
        assert_eq!(format_metric(-1234.5, Metric::Mae), "-1,234.50");
        assert_eq!(format_metric(12.0, Metric::Rmse), "12.00");
        assert_eq!(format_metric(0.81234, Metric::R2), "0.8123");
        assert_eq!(format_metric(f64::NEG_INFINITY, Metric::R2), "-inf");
    }

    #[test]
    fn test_model_confidence_floors_at_zero() {
        assert!((model_confidence(0.85) - 85.0).abs() < EPS);
        assert_eq!(model_confidence(-0.3), 0.0);
        assert_eq!(model_confidence(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_record_serializes_with_metric_names() {
        let record = MetricRecord {
            mse: 0.25,
            rmse: 0.5,
            mae: 0.25,
            r2: 0.8,
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["RMSE"], serde_json::json!(0.5));
        assert_eq!(json["R2"], serde_json::json!(0.8));
    }
}
