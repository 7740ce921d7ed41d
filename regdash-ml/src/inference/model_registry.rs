//! Load-once store of named model handles.
//!
//! The store is built a single time at startup and handed to whoever needs
//! it. Lookups take `&self` and entries are never replaced, so a shared
//! reference (or an `Arc<ModelStore>`) can be read from any thread.

use crate::error::{EvalError, Result};
use crate::inference::RegressionModel;
use crate::inference::pipeline::ModelPipeline;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Models the dashboard ships with, in display order.
pub const DEFAULT_MODEL_NAMES: [&str; 3] = ["Linear Regression", "Decision Tree", "Random Forest"];

/// File holding the serialized pipeline for `name`.
pub fn model_path(model_dir: &Path, name: &str) -> PathBuf {
    model_dir.join(format!("{name} Pipeline.json"))
}

/// Named models in insertion order.
#[derive(Clone, Default)]
pub struct ModelStore {
    entries: Vec<(String, Arc<dyn RegressionModel>)>,
}

impl fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, m)| (name, m.model_type())))
            .finish()
    }
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<name> Pipeline.json` from `model_dir` for every name, in order.
    ///
    /// Fails on the first file that is missing or invalid.
    pub fn load<S: AsRef<str>>(model_dir: &Path, names: &[S]) -> Result<Self> {
        let mut store = Self::new();
        for name in names {
            let name = name.as_ref();
            let path = model_path(model_dir, name);
            if !path.exists() {
                return Err(EvalError::not_found(format!(
                    "model pipeline file for '{name}' not found: {}",
                    path.display()
                )));
            }
            let pipeline = ModelPipeline::from_path(&path)?;
            tracing::debug!(
                model = name,
                model_type = pipeline.model_type(),
                path = %path.display(),
                "loaded model pipeline"
            );
            store = store.with_model(name, Arc::new(pipeline))?;
        }
        tracing::info!(count = store.len(), "model store ready");
        Ok(store)
    }

    /// Add a model while building the store. Names must be unique.
    pub fn with_model(
        mut self,
        name: impl Into<String>,
        model: Arc<dyn RegressionModel>,
    ) -> Result<Self> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(EvalError::invalid_input(format!(
                "model '{name}' registered twice"
            )));
        }
        self.entries.push((name, model));
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn RegressionModel>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn RegressionModel>)> {
        self.entries.iter().map(|(n, m)| (n.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
