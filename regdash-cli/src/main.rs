//! Regdash CLI — evaluate pre-trained regression models against a held-out set.
//!
//! Every subcommand loads the configuration, the test data and the model files,
//! then prints a table (or JSON with `--json`).

mod commands;

use clap::Parser;
use regdash_ml::ConfigOverrides;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Regdash: evaluation dashboard for regression models
#[derive(Parser, Debug)]
#[command(name = "regdash", version, about, long_about = None)]
struct Cli {
    /// Workspace directory; relative paths resolve against it
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Held-out CSV file (overrides data.test_data_path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Directory with `<name> Pipeline.json` files (overrides models.model_dir)
    #[arg(long, global = true)]
    models: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Commands {
    /// Metrics and residual summary for one model
    Evaluate {
        /// Model name (defaults to the first configured model)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Rank every model and show the best per metric
    Compare,
    /// Chart-ready summaries as JSON
    Charts {
        #[arg(short, long)]
        model: Option<String>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Feature importance of one model
    Importance {
        #[arg(short, long)]
        model: Option<String>,
        /// Number of features to show (defaults to charts.top_n)
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Predict a single row from feature values
    Predict {
        #[arg(short, long)]
        model: Option<String>,
        /// Feature value, e.g. `--set temp=285.5 --set weather_main=Rain`
        #[arg(short, long = "set", value_name = "FEATURE=VALUE")]
        set: Vec<String>,
    },
    /// Feature statistics, target distribution and category values
    Stats,
    /// Write a full JSON report for one model
    Report {
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "regdash", "regdash")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "regdash.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let ctx = commands::Context {
        workspace,
        config_path: cli.config,
        overrides: ConfigOverrides {
            test_data_path: cli.data,
            model_dir: cli.models,
        },
        json: cli.json,
    };

    commands::handle_command(cli.command, &ctx)
}
