//! Configuration system for Regdash.
//!
//! Uses `figment` for layered configuration: defaults -> user config -> workspace config
//! -> explicit file -> environment -> CLI args. Configuration is loaded from
//! `~/.config/regdash/config.toml` and/or `.regdash/config.toml` in the workspace directory.

use crate::eval::ChartOptions;
use crate::inference::DEFAULT_MODEL_NAMES;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegdashConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub charts: ChartConfig,
}

/// Where the held-out set comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with the test split, including the target column.
    #[serde(default = "default_test_data_path")]
    pub test_data_path: PathBuf,
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Rows generated when the test file does not exist.
    #[serde(default = "default_synthetic_rows")]
    pub synthetic_rows: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_test_data_path() -> PathBuf {
    PathBuf::from("test_data.csv")
}

fn default_target_column() -> String {
    "traffic_volume".into()
}

fn default_synthetic_rows() -> usize {
    200
}

fn default_seed() -> u64 {
    42
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            test_data_path: default_test_data_path(),
            target_column: default_target_column(),
            synthetic_rows: default_synthetic_rows(),
            seed: default_seed(),
        }
    }
}

/// Which model files to load, and from where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Directory holding `<name> Pipeline.json` files.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default = "default_model_names")]
    pub names: Vec<String>,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_model_names() -> Vec<String> {
    DEFAULT_MODEL_NAMES.iter().map(|s| s.to_string()).collect()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            names: default_model_names(),
        }
    }
}

/// Sizes of the chart summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_sample_size() -> usize {
    100
}

fn default_histogram_bins() -> usize {
    30
}

fn default_top_n() -> usize {
    15
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            histogram_bins: default_histogram_bins(),
            top_n: default_top_n(),
        }
    }
}

impl From<ChartConfig> for ChartOptions {
    fn from(c: ChartConfig) -> Self {
        ChartOptions {
            sample_size: c.sample_size,
            histogram_bins: c.histogram_bins,
            top_n: c.top_n,
        }
    }
}

/// Values given on the command line. They win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub test_data_path: Option<PathBuf>,
    pub model_dir: Option<PathBuf>,
}

/// Per-user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "regdash", "regdash")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from all sources.
///
/// An explicit config file must exist; the user and workspace files are
/// optional.
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<RegdashConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(RegdashConfig::default()));

    // User-level config
    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".regdash").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            ))));
        }
        figment = figment.merge(Toml::file(path));
    }

    // Environment variables (REGDASH_DATA__SEED, REGDASH_MODELS__MODEL_DIR, etc.)
    figment = figment.merge(Env::prefixed("REGDASH_").split("__"));

    if let Some(path) = &overrides.test_data_path {
        figment = figment.merge(Serialized::default("data.test_data_path", path));
    }
    if let Some(dir) = &overrides.model_dir {
        figment = figment.merge(Serialized::default("models.model_dir", dir));
    }

    figment.extract().map_err(Box::new)
}
