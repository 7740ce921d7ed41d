//! Fitted estimators operating on already-encoded feature vectors.

use crate::error::{EvalError, Result};
use crate::interpretability::ImportanceCapability;
use serde::{Deserialize, Serialize};

/// A node of an array-encoded binary regression tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Samples with `x[feature] <= threshold` go to `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRegressor {
    pub nodes: Vec<TreeNode>,
}

impl TreeRegressor {
    /// Children must point forward in the node array, which also rules out
    /// cycles.
    fn validate(&self, width: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(EvalError::model("tree has no nodes"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= width {
                    return Err(EvalError::model(format!(
                        "node {i} splits on feature {feature}, but only {width} features are encoded"
                    )));
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(EvalError::model(format!(
                            "node {i} has invalid child index {child}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_row(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// The final step of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    LinearRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    DecisionTree {
        tree: TreeRegressor,
        feature_importances: Vec<f64>,
    },
    RandomForest {
        trees: Vec<TreeRegressor>,
        feature_importances: Vec<f64>,
    },
}

impl Estimator {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::LinearRegression { .. } => "LinearRegression",
            Self::DecisionTree { .. } => "DecisionTreeRegressor",
            Self::RandomForest { .. } => "RandomForestRegressor",
        }
    }

    /// Check the estimator against the encoded feature width.
    pub fn validate(&self, width: usize) -> Result<()> {
        let check_len = |what: &str, len: usize| {
            if len == width {
                Ok(())
            } else {
                Err(EvalError::model(format!(
                    "{} has {len} {what}, expected {width}",
                    self.type_name()
                )))
            }
        };
        match self {
            Self::LinearRegression { coefficients, .. } => {
                check_len("coefficients", coefficients.len())
            }
            Self::DecisionTree {
                tree,
                feature_importances,
            } => {
                check_len("feature importances", feature_importances.len())?;
                tree.validate(width)
            }
            Self::RandomForest {
                trees,
                feature_importances,
            } => {
                check_len("feature importances", feature_importances.len())?;
                if trees.is_empty() {
                    return Err(EvalError::model("random forest has no trees"));
                }
                trees.iter().try_for_each(|t| t.validate(width))
            }
        }
    }

    /// Predict from one encoded row. `x.len()` must equal the validated width.
    pub fn predict_row(&self, x: &[f64]) -> f64 {
        match self {
            Self::LinearRegression {
                coefficients,
                intercept,
            } => intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>(),
            Self::DecisionTree { tree, .. } => tree.predict_row(x),
            Self::RandomForest { trees, .. } => {
                trees.iter().map(|t| t.predict_row(x)).sum::<f64>() / trees.len() as f64
            }
        }
    }

    pub fn importance_capability(&self) -> ImportanceCapability {
        match self {
            Self::LinearRegression { coefficients, .. } => {
                ImportanceCapability::LinearCoefficients(coefficients.clone())
            }
            Self::DecisionTree {
                feature_importances,
                ..
            }
            | Self::RandomForest {
                feature_importances,
                ..
            } => ImportanceCapability::TreeImportance(feature_importances.clone()),
        }
    }
}
