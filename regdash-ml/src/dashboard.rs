//! Dashboard session: one held-out set, one model store, and the engine calls
//! a render pass needs.
//!
//! The session owns its data explicitly. Predictions and metrics are
//! recomputed on every call; nothing is cached.

use crate::config::RegdashConfig;
use crate::data::schema::{
    FeatureStats, InputValidation, categorical_features, category_values, feature_stats,
    prepare_sample_input, validate_input,
};
use crate::data::{DataSourceInfo, FeatureTable, FeatureValue, load_or_synthesize};
use crate::error::{EvalError, Result};
use crate::eval::charts::{
    ChartOptions, ComparisonBar, HistogramBin, ParityPlot, ResidualScatter, SampleLines,
    error_histogram, model_comparison, parity_plot, residual_scatter, sample_lines,
};
use crate::eval::metrics::{
    Metric, MetricRecord, compute_metrics, compute_residuals, model_confidence,
};
use crate::eval::ranking::{RankingTable, rank_models};
use crate::eval::residuals::{ResidualSummary, residual_summary};
use crate::eval::target::{TargetSummary, target_summary};
use crate::inference::{ModelStore, RegressionModel};
use crate::interpretability::{FeatureImportance, feature_importance, top_features};
use crate::persistence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Metrics and residual statistics of one model on the held-out set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub model: String,
    pub model_type: String,
    pub sample_count: usize,
    pub metrics: MetricRecord,
    pub residual_summary: ResidualSummary,
}

/// Comparison bars for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: Metric,
    pub bars: Vec<ComparisonBar>,
}

/// Every chart summary for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBundle {
    pub model: String,
    pub parity: ParityPlot,
    pub residuals: ResidualScatter,
    pub samples: SampleLines,
    pub histogram: Vec<HistogramBin>,
    pub comparison: Vec<MetricComparison>,
}

/// Importance of every encoded feature plus the top of the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceView {
    pub model: String,
    pub features: Vec<FeatureImportance>,
    pub top: Vec<FeatureImportance>,
}

impl ImportanceView {
    /// False when the model exposes no importance information.
    pub fn is_available(&self) -> bool {
        !self.features.is_empty()
    }
}

/// Result of a single-row prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub model: String,
    pub prediction: f64,
    /// `max(0, R2 * 100)` of the model on the held-out set.
    pub confidence: f64,
    pub validation: InputValidation,
    pub target_min: f64,
    pub target_max: f64,
    pub target_mean: f64,
}

/// Everything the dashboard shows for one model, stamped with a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceInfo>,
    pub target: TargetSummary,
    pub evaluation: ModelEvaluation,
    pub ranking: RankingTable,
    pub charts: ChartBundle,
    pub importance: ImportanceView,
}

impl EvaluationReport {
    /// Write the report as pretty JSON, atomically.
    pub fn write(&self, path: &Path) -> Result<()> {
        persistence::atomic_write_json(path, self)
    }
}

/// A loaded held-out set paired with the models to score on it.
#[derive(Debug)]
pub struct Dashboard {
    store: ModelStore,
    features: FeatureTable,
    targets: Vec<f64>,
    stats: Vec<FeatureStats>,
    source: Option<DataSourceInfo>,
}

impl Dashboard {
    pub fn new(store: ModelStore, features: FeatureTable, targets: Vec<f64>) -> Result<Self> {
        if store.is_empty() {
            return Err(EvalError::EmptyInput("model store has no models"));
        }
        if targets.is_empty() {
            return Err(EvalError::EmptyInput("held-out set has no rows"));
        }
        if features.row_count() != targets.len() {
            return Err(EvalError::dataset(format!(
                "{} feature rows but {} target values",
                features.row_count(),
                targets.len()
            )));
        }
        let stats = feature_stats(&features);
        Ok(Self {
            store,
            features,
            targets,
            stats,
            source: None,
        })
    }

    /// Load the held-out set and every configured model.
    ///
    /// Relative paths in `config` resolve against `base`.
    pub fn from_config(config: &RegdashConfig, base: &Path) -> Result<Self> {
        let data_path = base.join(&config.data.test_data_path);
        let (table, source) =
            load_or_synthesize(&data_path, config.data.synthetic_rows, config.data.seed)?;
        let (features, targets) = table.split_target(&config.data.target_column)?;
        let store = ModelStore::load(&base.join(&config.models.model_dir), &config.models.names)?;
        Ok(Self::new(store, features, targets)?.with_source(source))
    }

    pub fn with_source(mut self, source: DataSourceInfo) -> Self {
        self.source = Some(source);
        self
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn feature_stats(&self) -> &[FeatureStats] {
        &self.stats
    }

    pub fn source(&self) -> Option<&DataSourceInfo> {
        self.source.as_ref()
    }

    /// Mean, median, spread and histogram of the held-out target.
    pub fn target_summary(&self, options: &ChartOptions) -> Result<TargetSummary> {
        target_summary(&self.targets, options.histogram_bins)
    }

    /// Allowed values of each categorical feature, in column order.
    pub fn category_choices(&self) -> Vec<(String, Vec<String>)> {
        categorical_features(&self.features)
            .into_iter()
            .map(|name| {
                let values = category_values(&self.features, &name);
                (name, values)
            })
            .collect()
    }

    /// The model shown when none is chosen.
    pub fn default_model(&self) -> &str {
        self.store.names()[0]
    }

    fn model(&self, name: &str) -> Result<&Arc<dyn RegressionModel>> {
        self.store
            .get(name)
            .ok_or_else(|| EvalError::not_found(format!("model '{name}' is not loaded")))
    }

    fn predictions(&self, model: &dyn RegressionModel) -> Result<Vec<f64>> {
        let predicted = model.predict(&self.features)?;
        if predicted.len() != self.targets.len() {
            return Err(EvalError::shape(self.targets.len(), predicted.len()));
        }
        Ok(predicted)
    }

    pub fn evaluate(&self, name: &str) -> Result<ModelEvaluation> {
        let model = self.model(name)?;
        let predicted = self.predictions(model.as_ref())?;
        let metrics = compute_metrics(&self.targets, &predicted)?;
        let residuals = compute_residuals(&self.targets, &predicted)?;
        tracing::debug!(model = name, r2 = metrics.r2, "evaluated model");
        Ok(ModelEvaluation {
            model: name.to_string(),
            model_type: model.model_type().to_string(),
            sample_count: self.targets.len(),
            metrics,
            residual_summary: residual_summary(&residuals)?,
        })
    }

    fn metrics_per_model(&self) -> Result<Vec<(String, MetricRecord)>> {
        self.store
            .iter()
            .map(|(name, model)| -> Result<(String, MetricRecord)> {
                let predicted = self.predictions(model.as_ref())?;
                Ok((name.to_string(), compute_metrics(&self.targets, &predicted)?))
            })
            .collect()
    }

    /// Rank every model in the store.
    pub fn compare(&self) -> Result<RankingTable> {
        rank_models(&self.metrics_per_model()?)
    }

    pub fn charts(&self, name: &str, options: &ChartOptions) -> Result<ChartBundle> {
        let predicted = self.predictions(self.model(name)?.as_ref())?;
        let residuals = compute_residuals(&self.targets, &predicted)?;
        let per_model = self.metrics_per_model()?;
        let comparison = Metric::ALL
            .iter()
            .map(|&metric| -> Result<MetricComparison> {
                Ok(MetricComparison {
                    metric,
                    bars: model_comparison(&per_model, metric)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ChartBundle {
            model: name.to_string(),
            parity: parity_plot(&self.targets, &predicted)?,
            residuals: residual_scatter(&self.targets, &predicted)?,
            samples: sample_lines(&self.targets, &predicted, options.sample_size)?,
            histogram: error_histogram(&residuals, options.histogram_bins)?,
            comparison,
        })
    }

    pub fn importance(&self, name: &str, top_n: usize) -> Result<ImportanceView> {
        let model = self.model(name)?;
        let features = feature_importance(model.as_ref(), &model.feature_names())?;
        if features.is_empty() {
            tracing::warn!(model = name, "model exposes no feature importance");
        }
        let top = top_features(&features, top_n);
        Ok(ImportanceView {
            model: name.to_string(),
            features,
            top,
        })
    }

    /// Predict from a partial set of feature values.
    ///
    /// Absent features take the first held-out row's value. Out-of-range numeric inputs are reported in `validation` and logged,
    /// but the prediction is still made.
    pub fn predict_one(
        &self,
        name: &str,
        values: &[(String, FeatureValue)],
    ) -> Result<PredictionResult> {
        let model = self.model(name)?;
        let validation = validate_input(values, &self.stats);
        if !validation.is_valid {
            tracing::warn!(
                model = name,
                message = %validation.message,
                "input outside held-out range"
            );
        }

        let row = prepare_sample_input(values, &self.features);
        let prediction = model
            .predict(&row)?
            .first()
            .copied()
            .ok_or_else(|| EvalError::model(format!("model '{name}' returned no prediction")))?;
        let r2 = self.evaluate(name)?.metrics.r2;

        let n = self.targets.len() as f64;
        Ok(PredictionResult {
            model: name.to_string(),
            prediction,
            confidence: model_confidence(r2),
            validation,
            target_min: self.targets.iter().copied().fold(f64::INFINITY, f64::min),
            target_max: self.targets.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            target_mean: self.targets.iter().sum::<f64>() / n,
        })
    }

    /// Build the full report for one model.
    pub fn report(&self, name: &str, options: &ChartOptions) -> Result<EvaluationReport> {
        Ok(EvaluationReport {
            generated_at: Utc::now(),
            data_source: self.source.clone(),
            target: self.target_summary(options)?,
            evaluation: self.evaluate(name)?,
            ranking: self.compare()?,
            charts: self.charts(name, options)?,
            importance: self.importance(name, options.top_n)?,
        })
    }
}
