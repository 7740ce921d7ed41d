//! Cross-model comparison over metric records from the same held-out set.

use crate::error::{EvalError, Result};
use crate::eval::metrics::{Metric, MetricRecord};
use serde::{Deserialize, Serialize};

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedModel {
    pub model: String,
    pub metrics: MetricRecord,
}

/// The winning model for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestEntry {
    pub metric: Metric,
    pub model: String,
    pub value: f64,
}

/// Comparison table plus the best model per metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTable {
    pub entries: Vec<RankedModel>,
    pub best: Vec<BestEntry>,
}

impl RankingTable {
    pub fn best_for(&self, metric: Metric) -> Option<&BestEntry> {
        self.best.iter().find(|b| b.metric == metric)
    }

    pub fn best_model(&self, metric: Metric) -> Option<&str> {
        self.best_for(metric).map(|b| b.model.as_str())
    }
}

/// Rank models by every metric in [`Metric::ALL`].
///
/// Error metrics pick the minimum and R2 picks the maximum. On ties the model
/// encountered first in `per_model` wins.
pub fn rank_models(per_model: &[(String, MetricRecord)]) -> Result<RankingTable> {
    if per_model.is_empty() {
        return Err(EvalError::EmptyInput("no models to rank"));
    }

    let best = Metric::ALL
        .iter()
        .map(|&metric| {
            let idx = best_index(per_model.iter().map(|(_, m)| m.get(metric)), metric);
            let (model, metrics) = &per_model[idx];
            BestEntry {
                metric,
                model: model.clone(),
                value: metrics.get(metric),
            }
        })
        .collect();

    let entries = per_model
        .iter()
        .map(|(model, metrics)| RankedModel {
            model: model.clone(),
            metrics: *metrics,
        })
        .collect();

    Ok(RankingTable { entries, best })
}

/// Index of the best value; the first index wins ties. Callers guarantee a
/// non-empty iterator.
pub(crate) fn best_index(values: impl Iterator<Item = f64>, metric: Metric) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.enumerate() {
        let better = match best {
            None => true,
            Some((_, current)) if metric.higher_is_better() => v > current,
            Some((_, current)) => v < current,
        };
        if better {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(mse: f64, mae: f64, r2: f64) -> MetricRecord {
        MetricRecord {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
        }
    }

    #[test]
    fn test_lowest_mse_wins() {
        let models = vec![
            ("m1".to_string(), record(10.0, 2.0, 0.5)),
            ("m2".to_string(), record(5.0, 3.0, 0.7)),
        ];
        let table = rank_models(&models).unwrap();
        assert_eq!(table.best_model(Metric::Mse), Some("m2"));
        assert_eq!(table.best_model(Metric::Rmse), Some("m2"));
        assert_eq!(table.best_model(Metric::Mae), Some("m1"));
        assert_eq!(table.best_model(Metric::R2), Some("m2"));
        assert_eq!(table.entries.len(), 2);
    }

    #[test]
    fn test_ties_go_to_first_model() {
        let models = vec![
            ("m1".to_string(), record(5.0, 1.0, 0.9)),
            ("m2".to_string(), record(5.0, 1.0, 0.9)),
        ];
        for _ in 0..10 {
            let table = rank_models(&models).unwrap();
            for metric in Metric::ALL {
                assert_eq!(table.best_model(metric), Some("m1"));
            }
        }
    }

    #[test]
    fn test_negative_r2_still_ranked_by_max() {
        let models = vec![
            ("a".to_string(), record(1.0, 1.0, -2.0)),
            ("b".to_string(), record(1.0, 1.0, -0.5)),
            ("c".to_string(), record(1.0, 1.0, f64::NEG_INFINITY)),
        ];
        let table = rank_models(&models).unwrap();
        let best = table.best_for(Metric::R2).unwrap();
        assert_eq!(best.model, "b");
        assert_eq!(best.value, -0.5);
    }

    #[test]
    fn test_empty_mapping_rejected() {
        assert!(matches!(rank_models(&[]), Err(EvalError::EmptyInput(_))));
    }

    #[test]
    fn test_input_order_preserved() {
        let models = vec![
            ("z".to_string(), record(3.0, 3.0, 0.1)),
            ("a".to_string(), record(2.0, 2.0, 0.2)),
        ];
        let table = rank_models(&models).unwrap();
        let names: Vec<_> = table.entries.iter().map(|e| e.model.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
