//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use regdash_ml::data::FeatureStats;
use regdash_ml::eval::format_metric;
use regdash_ml::persistence::atomic_write_json;
use regdash_ml::{
    ChartOptions, ConfigOverrides, Dashboard, FeatureValue, ImportanceView, Metric,
    ModelEvaluation, PredictionResult, RankingTable, RegdashConfig, TargetSummary, load_config,
};
use serde::Serialize;
use std::path::PathBuf;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub workspace: PathBuf,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub json: bool,
}

impl Context {
    fn config(&self) -> anyhow::Result<RegdashConfig> {
        load_config(
            Some(&self.workspace),
            self.config_path.as_deref(),
            &self.overrides,
        )
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
    }

    fn dashboard(&self, config: &RegdashConfig) -> anyhow::Result<Dashboard> {
        Dashboard::from_config(config, &self.workspace)
            .map_err(|e| anyhow::anyhow!("Failed to load dashboard: {}", e))
    }

    fn print<T: Serialize>(
        &self,
        value: &T,
        table: impl FnOnce() -> String,
    ) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", table());
        }
        Ok(())
    }
}

/// Configuration and loaded dashboard for the data subcommands.
struct Session {
    config: RegdashConfig,
    dashboard: Dashboard,
    chart_options: ChartOptions,
}

impl Session {
    fn open(ctx: &Context) -> anyhow::Result<Self> {
        let config = ctx.config()?;
        tracing::debug!(
            workspace = %ctx.workspace.display(),
            models = config.models.names.len(),
            "configuration loaded"
        );
        let dashboard = ctx.dashboard(&config)?;
        let chart_options = ChartOptions::from(config.charts);
        Ok(Self {
            config,
            dashboard,
            chart_options,
        })
    }

    fn pick(&self, model: Option<String>) -> String {
        model.unwrap_or_else(|| self.dashboard.default_model().to_string())
    }
}

/// Held-out set overview printed by `stats`.
#[derive(Serialize)]
struct StatsView<'a> {
    features: &'a [FeatureStats],
    target: TargetSummary,
    categories: Vec<(String, Vec<String>)>,
}

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Evaluate { model } => {
            let session = Session::open(ctx)?;
            let eval = session.dashboard.evaluate(&session.pick(model))?;
            ctx.print(&eval, || render_evaluation(&eval))
        }
        Commands::Compare => {
            let table = Session::open(ctx)?.dashboard.compare()?;
            ctx.print(&table, || render_ranking(&table))
        }
        Commands::Charts { model, output } => {
            let session = Session::open(ctx)?;
            let charts = session
                .dashboard
                .charts(&session.pick(model), &session.chart_options)?;
            match output {
                Some(path) => {
                    let path = ctx.workspace.join(path);
                    atomic_write_json(&path, &charts)?;
                    println!("Chart data written to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&charts)?),
            }
            Ok(())
        }
        Commands::Importance { model, top } => {
            let session = Session::open(ctx)?;
            let top = top.unwrap_or(session.config.charts.top_n);
            let view = session.dashboard.importance(&session.pick(model), top)?;
            ctx.print(&view, || render_importance(&view))
        }
        Commands::Predict { model, set } => {
            let session = Session::open(ctx)?;
            let values = set
                .iter()
                .map(String::as_str)
                .map(parse_assignment)
                .collect::<anyhow::Result<Vec<_>>>()?;
            let result = session.dashboard.predict_one(&session.pick(model), &values)?;
            if !result.validation.is_valid {
                eprintln!("Warning: {}", result.validation.message);
            }
            ctx.print(&result, || render_prediction(&result))
        }
        Commands::Stats => {
            let session = Session::open(ctx)?;
            let view = StatsView {
                features: session.dashboard.feature_stats(),
                target: session.dashboard.target_summary(&session.chart_options)?,
                categories: session.dashboard.category_choices(),
            };
            ctx.print(&view, || render_stats(&view))
        }
        Commands::Report { model, output } => {
            let session = Session::open(ctx)?;
            let report = session
                .dashboard
                .report(&session.pick(model), &session.chart_options)?;
            let path = ctx.workspace.join(output);
            report.write(&path)?;
            println!(
                "Report for '{}' written to {} ({})",
                report.evaluation.model,
                path.display(),
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            Ok(())
        }
        Commands::Config { action } => handle_config(action, ctx),
    }
}

fn handle_config(action: ConfigAction, ctx: &Context) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = ctx.workspace.join(".regdash");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&RegdashConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = ctx.config()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Parse `feature=value` from `--set`.
pub(crate) fn parse_assignment(raw: &str) -> anyhow::Result<(String, FeatureValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected FEATURE=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("missing feature name in '{}'", raw);
    }
    Ok((key.to_string(), FeatureValue::parse_cell(value)))
}

fn render_evaluation(eval: &ModelEvaluation) -> String {
    let mut out = format!(
        "{} ({}, {} samples)\n",
        eval.model, eval.model_type, eval.sample_count
    );
    for metric in Metric::ALL {
        out.push_str(&format!(
            "  {:<6}{:>16}\n",
            metric.as_str(),
            format_metric(eval.metrics.get(metric), metric)
        ));
    }
    let r = &eval.residual_summary;
    out.push_str(&format!(
        "Residuals: mean {:.2}, std {:.2}, max |e| {:.2}, min |e| {:.2}\n",
        r.mean, r.std, r.max_abs, r.min_abs
    ));
    out
}

fn render_ranking(table: &RankingTable) -> String {
    let width = table
        .entries
        .iter()
        .map(|e| e.model.len())
        .max()
        .unwrap_or(5)
        .max(5);
    let mut out = format!("{:<width$}", "Model");
    for metric in Metric::ALL {
        out.push_str(&format!("{:>16}", metric.as_str()));
    }
    out.push('\n');
    for entry in &table.entries {
        out.push_str(&format!("{:<width$}", entry.model));
        for metric in Metric::ALL {
            out.push_str(&format!(
                "{:>16}",
                format_metric(entry.metrics.get(metric), metric)
            ));
        }
        out.push('\n');
    }
    out.push('\n');
    for best in &table.best {
        out.push_str(&format!(
            "Best {}: {} ({})\n",
            best.metric,
            best.model,
            format_metric(best.value, best.metric)
        ));
    }
    out
}

fn render_importance(view: &ImportanceView) -> String {
    if !view.is_available() {
        return format!("Feature importance is not available for '{}'.\n", view.model);
    }
    let mut out = format!("Top {} features for '{}':\n", view.top.len(), view.model);
    for (rank, f) in view.top.iter().enumerate() {
        out.push_str(&format!("{:>3}. {:<32}{:>12.4}\n", rank + 1, f.feature, f.importance));
    }
    out
}

fn render_prediction(result: &PredictionResult) -> String {
    format!(
        "Prediction ({}): {}\nConfidence: {:.1}%\nHeld-out target: min {}, max {}, mean {}\n",
        result.model,
        format_metric(result.prediction, Metric::Mae),
        result.confidence,
        format_metric(result.target_min, Metric::Mae),
        format_metric(result.target_max, Metric::Mae),
        format_metric(result.target_mean, Metric::Mae),
    )
}

fn render_stats(view: &StatsView<'_>) -> String {
    let mut out = if view.features.is_empty() {
        "No numeric features in the held-out set.\n".to_string()
    } else {
        let mut out = format!(
            "{:<20}{:>8}{:>14}{:>14}{:>14}{:>14}\n",
            "Feature", "Count", "Mean", "Std", "Min", "Max"
        );
        for s in view.features {
            out.push_str(&format!(
                "{:<20}{:>8}{:>14.3}{:>14.3}{:>14.3}{:>14.3}\n",
                s.name, s.count, s.mean, s.std, s.min, s.max
            ));
        }
        out
    };

    let t = &view.target;
    out.push_str(&format!(
        "\nTarget: mean {}, median {}, std {}, count {}\n",
        format_metric(t.mean, Metric::Mae),
        format_metric(t.median, Metric::Mae),
        format_metric(t.std, Metric::Mae),
        t.count
    ));
    let peak = t.histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bin in &t.histogram {
        out.push_str(&format!(
            "  {:>14.1} .. {:<14.1}{:>6} {}\n",
            bin.lower,
            bin.upper,
            bin.count,
            "#".repeat(bin.count * 40 / peak)
        ));
    }

    for (feature, values) in &view.categories {
        out.push_str(&format!("\n{feature}: {}\n", values.join(", ")));
    }
    out
}
