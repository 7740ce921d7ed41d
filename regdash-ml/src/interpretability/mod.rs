//! Interpretability — per-feature importance of a model's predictions.

pub mod importance;

pub use importance::{FeatureImportance, ImportanceCapability, feature_importance, top_features};
