//! Feature importance from a model's declared capability.

use crate::error::{EvalError, Result};
use crate::inference::RegressionModel;
use serde::{Deserialize, Serialize};

/// What a model can tell us about per-feature contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ImportanceCapability {
    /// Direct importance scores from a tree-based estimator.
    TreeImportance(Vec<f64>),
    /// Fitted coefficients of a linear estimator; signs are dropped on use.
    LinearCoefficients(Vec<f64>),
    NoImportance,
}

/// Importance of one feature. Values are not normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Map each of `feature_names` to its importance, in the given order.
///
/// A model without an importance capability yields an empty list. A
/// capability vector whose length differs from `feature_names` is a
/// [`EvalError::ShapeMismatch`] with the name count as `actual`.
pub fn feature_importance(
    model: &dyn RegressionModel,
    feature_names: &[String],
) -> Result<Vec<FeatureImportance>> {
    let scores: Vec<f64> = match model.importance_capability() {
        ImportanceCapability::TreeImportance(scores) => scores,
        ImportanceCapability::LinearCoefficients(coefs) => {
            coefs.into_iter().map(f64::abs).collect()
        }
        ImportanceCapability::NoImportance => {
            tracing::debug!(model = model.model_type(), "feature importance unavailable");
            return Ok(Vec::new());
        }
    };

    if scores.len() != feature_names.len() {
        return Err(EvalError::shape(feature_names.len(), scores.len()));
    }

    Ok(feature_names
        .iter()
        .zip(scores)
        .map(|(feature, importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect())
}

/// The `n` most important features, descending. Ties keep input order.
pub fn top_features(importances: &[FeatureImportance], n: usize) -> Vec<FeatureImportance> {
    let mut sorted = importances.to_vec();
    sorted.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}
