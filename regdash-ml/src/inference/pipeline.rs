//! Preprocessing + estimator pipelines loaded from JSON.
//!
//! A pipeline takes raw feature rows (numbers and category labels), encodes
//! them the way the model was trained (one-hot categories first, then
//! standardized numbers) and hands the encoded vector to the estimator.

use crate::data::{FeatureTable, FeatureValue};
use crate::error::{EvalError, Result};
use crate::inference::RegressionModel;
use crate::inference::estimators::Estimator;
use crate::interpretability::ImportanceCapability;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A standardized numeric input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

/// A one-hot encoded categorical input column. Unknown or missing values
/// encode to all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub column: String,
    pub categories: Vec<String>,
}

/// Column-wise preprocessing step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    #[serde(default)]
    pub categorical: Vec<CategoricalColumn>,
    #[serde(default)]
    pub numeric: Vec<NumericColumn>,
}

impl ColumnTransformer {
    /// Number of encoded features produced per row.
    pub fn width(&self) -> usize {
        self.categorical
            .iter()
            .map(|c| c.categories.len())
            .sum::<usize>()
            + self.numeric.len()
    }

    /// Encoded feature names: `<column>_<category>` then numeric column names.
    pub fn encoded_names(&self) -> Vec<String> {
        self.categorical
            .iter()
            .flat_map(|c| {
                c.categories
                    .iter()
                    .map(move |cat| format!("{}_{}", c.column, cat))
            })
            .chain(self.numeric.iter().map(|n| n.column.clone()))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        for n in &self.numeric {
            if !n.scale.is_finite() || n.scale == 0.0 || !n.mean.is_finite() {
                return Err(EvalError::model(format!(
                    "numeric column '{}' has invalid scaling (mean {}, scale {})",
                    n.column, n.mean, n.scale
                )));
            }
        }
        Ok(())
    }

    /// Encode every row of `features` into a dense matrix.
    pub fn transform(&self, features: &FeatureTable) -> Result<Vec<Vec<f64>>> {
        let lookup = |name: &str| {
            features
                .column_index(name)
                .ok_or_else(|| EvalError::dataset(format!("missing feature column '{name}'")))
        };
        let cat_idx: Vec<usize> = self
            .categorical
            .iter()
            .map(|c| lookup(&c.column))
            .collect::<Result<_>>()?;
        let num_idx: Vec<usize> = self
            .numeric
            .iter()
            .map(|n| lookup(&n.column))
            .collect::<Result<_>>()?;

        let width = self.width();
        features
            .rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| -> Result<Vec<f64>> {
                let mut encoded = Vec::with_capacity(width);
                for (col, &idx) in self.categorical.iter().zip(&cat_idx) {
                    let label = match &row[idx] {
                        FeatureValue::Category(s) => Some(s.clone()),
                        // numeric labels, e.g. a year column declared categorical
                        FeatureValue::Number(v) => Some(v.to_string()),
                        FeatureValue::Missing => None,
                    };
                    let label = label.as_deref();
                    encoded.extend(
                        col.categories
                            .iter()
                            .map(|cat| f64::from(u8::from(label == Some(cat.as_str())))),
                    );
                }
                for (col, &idx) in self.numeric.iter().zip(&num_idx) {
                    let v = row[idx].as_number().ok_or_else(|| {
                        EvalError::dataset(format!(
                            "row {row_no}: feature '{}' must be numeric, got {}",
                            col.column, row[idx]
                        ))
                    })?;
                    encoded.push((v - col.mean) / col.scale);
                }
                Ok(encoded)
            })
            .collect()
    }
}

/// A complete serialized model: preprocessing followed by an estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPipeline {
    pub preprocessor: ColumnTransformer,
    pub estimator: Estimator,
}

impl ModelPipeline {
    pub fn new(preprocessor: ColumnTransformer, estimator: Estimator) -> Result<Self> {
        let pipeline = Self {
            preprocessor,
            estimator,
        };
        pipeline.validate()?;
        Ok(pipeline)
    }

    pub fn validate(&self) -> Result<()> {
        self.preprocessor.validate()?;
        self.estimator.validate(self.preprocessor.width())
    }

    /// Read and validate a pipeline from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let pipeline: Self = serde_json::from_str(&content)?;
        pipeline
            .validate()
            .map_err(|e| EvalError::model(format!("{}: {e}", path.display())))?;
        Ok(pipeline)
    }
}

impl RegressionModel for ModelPipeline {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        let encoded = self.preprocessor.transform(features)?;
        Ok(encoded
            .iter()
            .map(|x| self.estimator.predict_row(x))
            .collect())
    }

    fn importance_capability(&self) -> ImportanceCapability {
        self.estimator.importance_capability()
    }

    fn feature_names(&self) -> Vec<String> {
        self.preprocessor.encoded_names()
    }

    fn model_type(&self) -> &str {
        self.estimator.type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataTable;
    use crate::inference::estimators::{TreeNode, TreeRegressor};
    use pretty_assertions::assert_eq;

    fn preprocessor() -> ColumnTransformer {
        ColumnTransformer {
            categorical: vec![CategoricalColumn {
                column: "weather_main".into(),
                categories: vec!["Clear".into(), "Rain".into()],
            }],
            numeric: vec![NumericColumn {
                column: "temp".into(),
                mean: 280.0,
                scale: 10.0,
            }],
        }
    }

    fn rows(values: &[(&str, f64)]) -> DataTable {
        let mut t = DataTable::new(vec!["temp".into(), "weather_main".into()]);
        for (weather, temp) in values {
            let w = if weather.is_empty() {
                FeatureValue::Missing
            } else {
                FeatureValue::Category(weather.to_string())
            };
            t.push_row(vec![FeatureValue::Number(*temp), w]).unwrap();
        }
        t
    }

    #[test]
    fn test_encoding_order_and_names() {
        let pre = preprocessor();
        assert_eq!(pre.width(), 3);
        assert_eq!(
            pre.encoded_names(),
            vec!["weather_main_Clear", "weather_main_Rain", "temp"]
        );
        let encoded = pre
            .transform(&rows(&[("Rain", 300.0), ("Snow", 280.0), ("", 270.0)]))
            .unwrap();
        assert_eq!(encoded[0], vec![0.0, 1.0, 2.0]);
        // unknown and missing categories encode to zeros
        assert_eq!(encoded[1], vec![0.0, 0.0, 0.0]);
        assert_eq!(encoded[2], vec![0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_linear_pipeline_predicts_per_row() {
        let pipeline = ModelPipeline::new(
            preprocessor(),
            Estimator::LinearRegression {
                coefficients: vec![100.0, -200.0, 50.0],
                intercept: 3000.0,
            },
        )
        .unwrap();
        let preds = pipeline
            .predict(&rows(&[("Clear", 290.0), ("Rain", 280.0)]))
            .unwrap();
        assert_eq!(preds, vec![3150.0, 2800.0]);
        assert_eq!(pipeline.model_type(), "LinearRegression");
        assert_eq!(pipeline.feature_names().len(), 3);
    }

    #[test]
    fn test_tree_pipeline_splits_on_encoded_feature() {
        let tree = TreeRegressor {
            nodes: vec![
                TreeNode::Split {
                    feature: 1,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: 5000.0 },
                TreeNode::Leaf { value: 2000.0 },
            ],
        };
        let pipeline = ModelPipeline::new(
            preprocessor(),
            Estimator::DecisionTree {
                tree,
                feature_importances: vec![0.1, 0.8, 0.1],
            },
        )
        .unwrap();
        let preds = pipeline
            .predict(&rows(&[("Clear", 280.0), ("Rain", 280.0)]))
            .unwrap();
        assert_eq!(preds, vec![5000.0, 2000.0]);
    }

    #[test]
    fn test_missing_column_and_bad_numeric() {
        let pipeline = ModelPipeline::new(
            preprocessor(),
            Estimator::LinearRegression {
                coefficients: vec![0.0; 3],
                intercept: 0.0,
            },
        )
        .unwrap();

        let mut no_weather = DataTable::new(vec!["temp".into()]);
        no_weather.push_row(vec![FeatureValue::Number(1.0)]).unwrap();
        let err = pipeline.predict(&no_weather).unwrap_err();
        assert!(err.to_string().contains("weather_main"));

        let mut text_temp = rows(&[("Rain", 0.0)]);
        text_temp.rows[0][0] = FeatureValue::Category("warm".into());
        assert!(matches!(
            pipeline.predict(&text_temp),
            Err(EvalError::Dataset(_))
        ));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut pre = preprocessor();
        pre.numeric[0].scale = 0.0;
        let result = ModelPipeline::new(
            pre,
            Estimator::LinearRegression {
                coefficients: vec![0.0; 3],
                intercept: 0.0,
            },
        );
        assert!(matches!(result, Err(EvalError::Model(_))));
    }

    #[test]
    fn test_from_path_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Linear Regression Pipeline.json");
        let pipeline = ModelPipeline::new(
            preprocessor(),
            Estimator::LinearRegression {
                coefficients: vec![1.0, 2.0, 3.0],
                intercept: 4.0,
            },
        )
        .unwrap();
        std::fs::write(&path, serde_json::to_string(&pipeline).unwrap()).unwrap();
        assert_eq!(ModelPipeline::from_path(&path).unwrap(), pipeline);
    }
}
