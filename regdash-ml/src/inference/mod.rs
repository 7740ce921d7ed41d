//! Model handles — the prediction trait, serialized pipelines and the model store.

pub mod estimators;
pub mod model_registry;
pub mod pipeline;

pub use estimators::{Estimator, TreeNode, TreeRegressor};
pub use model_registry::{DEFAULT_MODEL_NAMES, ModelStore};
pub use pipeline::{CategoricalColumn, ColumnTransformer, ModelPipeline, NumericColumn};

use crate::data::FeatureTable;
use crate::error::Result;
use crate::interpretability::ImportanceCapability;

/// A pre-trained regression model.
///
/// The evaluation engine only relies on `predict` returning one value per
/// input row; how a model computes it is its own business.
pub trait RegressionModel: Send + Sync {
    /// Predict one value per row of `features`.
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>>;

    /// Which importance information the model exposes.
    fn importance_capability(&self) -> ImportanceCapability;

    /// Names aligned with the importance vector.
    fn feature_names(&self) -> Vec<String>;

    /// Human-readable estimator type, e.g. `RandomForestRegressor`.
    fn model_type(&self) -> &str;
}
