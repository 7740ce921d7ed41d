//! Property-based tests for the evaluation engine using proptest.

use proptest::prelude::*;

use regdash_ml::EvalError;
use regdash_ml::eval::charts::error_histogram;
use regdash_ml::eval::{
    Metric, MetricRecord, compute_metrics, compute_residuals, rank_models, residual_summary,
};

fn series(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6f64..1.0e6, len)
}

fn paired() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..64).prop_flat_map(|n| {
        (
            prop::collection::vec(-1.0e6f64..1.0e6, n),
            prop::collection::vec(-1.0e6f64..1.0e6, n),
        )
    })
}

// --- Residual properties ---

proptest! {
    #[test]
    fn residual_is_actual_minus_predicted((actual, predicted) in paired()) {
        let residuals = compute_residuals(&actual, &predicted).unwrap();
        prop_assert_eq!(residuals.len(), actual.len());
        for i in 0..actual.len() {
            prop_assert_eq!(residuals[i], actual[i] - predicted[i]);
        }
    }

    #[test]
    fn mismatched_lengths_are_rejected(a in series(1..20), b in series(21..40)) {
        let err = compute_metrics(&a, &b).unwrap_err();
        let is_shape = matches!(
            err,
            EvalError::ShapeMismatch { actual, predicted }
                if actual == a.len() && predicted == b.len()
        );
        prop_assert!(is_shape);
    }

    #[test]
    fn residual_summary_bounds(residuals in series(1..64)) {
        let s = residual_summary(&residuals).unwrap();
        prop_assert!(s.min_abs <= s.max_abs);
        prop_assert!(s.std >= 0.0);
        prop_assert!(s.mean.abs() <= s.max_abs + 1e-6);
    }
}

// --- Metric properties ---

proptest! {
    #[test]
    fn identical_series_score_perfectly(actual in series(1..64)) {
        let m = compute_metrics(&actual, &actual).unwrap();
        prop_assert_eq!(m.mse, 0.0);
        prop_assert_eq!(m.rmse, 0.0);
        prop_assert_eq!(m.mae, 0.0);
        prop_assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn error_metrics_are_consistent((actual, predicted) in paired()) {
        let m = compute_metrics(&actual, &predicted).unwrap();
        prop_assert!(m.mse >= 0.0);
        prop_assert!((m.rmse - m.mse.sqrt()).abs() <= 1e-9 * m.rmse.max(1.0));
        // MAE never exceeds RMSE
        prop_assert!(m.mae <= m.rmse * (1.0 + 1e-9) + 1e-9);
        prop_assert!(m.r2 <= 1.0);
    }
}

// --- Ranking & histogram properties ---

fn record(mse: f64) -> MetricRecord {
    MetricRecord {
        mse,
        rmse: mse.sqrt(),
        mae: mse.sqrt(),
        r2: 1.0 - mse / 100.0,
    }
}

proptest! {
    #[test]
    fn ranking_ties_go_to_first_model(mse in 0.0f64..50.0, extra in 1usize..6) {
        let per_model: Vec<(String, MetricRecord)> = (0..=extra)
            .map(|i| (format!("m{i}"), record(mse)))
            .collect();
        for _ in 0..3 {
            let table = rank_models(&per_model).unwrap();
            for metric in Metric::ALL {
                prop_assert_eq!(table.best_model(metric), Some("m0"));
            }
        }
    }

    #[test]
    fn ranking_best_mse_is_minimum(values in prop::collection::vec(0.0f64..1.0e4, 1..10)) {
        let per_model: Vec<(String, MetricRecord)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (format!("m{i}"), record(v)))
            .collect();
        let table = rank_models(&per_model).unwrap();
        let best = table.best_for(Metric::Mse).unwrap();
        prop_assert!(values.iter().all(|&v| best.value <= v));
    }

    #[test]
    fn histogram_counts_sum_to_len(residuals in series(1..200), bins in 1usize..50) {
        let hist = error_histogram(&residuals, bins).unwrap();
        prop_assert!(hist.len() <= bins);
        prop_assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), residuals.len());
    }
}
