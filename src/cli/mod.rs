//! Used-car pricing CLI module
//!
//! Command-line interface for training, prediction and configuration.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::TrainingRunConfig;
use crate::export::ModelStore;
use crate::runner::{predict_raw, train_frames};
use crate::training::MetricsRecord;
use crate::utils::{load_frame, write_metrics_jsonl, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "used-car-pricing")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cross-validated price model for used vehicles")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tune, fit and evaluate the price model
    Train {
        /// Training data file (CSV, CSV.GZ, JSON, or Parquet)
        #[arg(long)]
        train: Option<PathBuf>,

        /// Test data file
        #[arg(long)]
        test: Option<PathBuf>,

        /// JSON run configuration; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of cross-validation folds
        #[arg(long)]
        cv_folds: Option<usize>,

        /// Worker threads for the grid search
        #[arg(long)]
        n_jobs: Option<usize>,

        /// Output model file
        #[arg(long)]
        model_out: Option<PathBuf>,

        /// Output metrics file (JSON lines)
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },

    /// Make predictions using a trained model
    Predict {
        /// Trained model file
        #[arg(short, long)]
        model: PathBuf,

        /// Input data file with raw vehicle records
        #[arg(short, long)]
        data: PathBuf,

        /// Output predictions file (CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default run configuration as JSON
    Config,
}

/// Options of the `train` command, after clap parsing
#[derive(Debug, Clone, Default)]
pub struct TrainArgs {
    pub train: Option<PathBuf>,
    pub test: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub cv_folds: Option<usize>,
    pub n_jobs: Option<usize>,
    pub model_out: Option<PathBuf>,
    pub metrics_out: Option<PathBuf>,
}

impl TrainArgs {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn resolve(&self) -> anyhow::Result<TrainingRunConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingRunConfig::from_json_file(path)?,
            None => TrainingRunConfig::default(),
        };

        if let Some(path) = &self.train {
            config.train_path = path.clone();
        }
        if let Some(path) = &self.test {
            config.test_path = path.clone();
        }
        if let Some(folds) = self.cv_folds {
            config.search = config.search.with_n_splits(folds);
        }
        if let Some(n_jobs) = self.n_jobs {
            config.search = config.search.with_n_jobs(n_jobs);
        }
        if let Some(path) = &self.model_out {
            config.model_path = path.clone();
        }
        if let Some(path) = &self.metrics_out {
            config.metrics_path = path.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn print_metrics(record: &MetricsRecord) {
    let label = format!("{:?}", record.split).to_lowercase();
    line_box(&format!(
        "{:<6} {}  {}  {}",
        accent(&label),
        kv("r2", &format!("{:.3}", record.r2)),
        kv("mse", &format!("{:.3}", record.mse)),
        kv("mad", &format!("{:.3}", record.mad)),
    ));
}

pub fn cmd_train(args: &TrainArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let train = load_frame(&config.train_path)?;
    let test = load_frame(&config.test_path)?;
    step_done(&format!(
        "{} train / {} test rows in {:?}",
        train.height(),
        test.height(),
        start.elapsed()
    ));

    step_run(&format!(
        "Searching k ∈ {:?} with {}-fold CV",
        config.search.k_grid,
        config.search.cv.n_splits()
    ));
    let outcome = train_frames(&config, &train, &test)?;
    step_done(&format!("{:.2}s", outcome.search_duration.as_secs_f64()));

    println!(
        "  {}",
        kv(
            "Time to optimize hyperparameters:",
            &format!("{:.2} seconds", outcome.search_duration.as_secs_f64())
        )
    );
    println!(
        "  {}",
        kv("Best params:", &format!("{{\"feature_selection__k\": {}}}", outcome.result.best_k))
    );

    step_run(&format!("Saving model → {}", config.model_path.display()));
    ModelStore::new(&config.model_path).save(&outcome.result, &config.features)?;
    step_done("");

    step_run(&format!("Writing metrics → {}", config.metrics_path.display()));
    write_metrics_jsonl(
        &config.metrics_path,
        &[outcome.train_metrics.clone(), outcome.test_metrics.clone()],
    )?;
    step_done("");

    println!();
    line_box_top();
    line_box(&format!(
        "{}  {}",
        kv("k", &outcome.result.best_k.to_string()),
        kv("cv mae", &format!("{:.4}", -outcome.result.best_score)),
    ));
    line_box(&kv(
        "features",
        &outcome.result.best_pipeline.selected_feature_names().join(", "),
    ));
    line_box_sep();
    for record in outcome.metrics() {
        print_metrics(record);
    }
    line_box_bottom();
    println!();

    Ok(())
}

pub fn cmd_predict(
    model_path: &Path,
    data_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading model");
    let stored = ModelStore::new(model_path).load()?;
    step_done(&format!(
        "k = {}, reference year {}",
        stored.result.best_k, stored.features.reference_year
    ));

    step_run("Loading data");
    let raw = load_frame(data_path)?;
    step_done(&format!("{} rows × {} cols", raw.height(), raw.width()));

    let predictions = predict_raw(&stored.result, &stored.splitter(), &raw)?;

    match output {
        Some(path) => {
            step_run(&format!("Saving → {}", path.display()));
            let mut out = raw.clone();
            out.with_column(Column::new("prediction".into(), predictions.to_vec()))?;
            DataSaver::save_csv(&mut out, path)?;
            step_done(&format!("{} rows", out.height()));
        }
        None => {
            println!();
            for (i, value) in predictions.iter().enumerate() {
                println!("  {:>5}  {}", muted(&i.to_string()), format!("{:.3}", value).white());
            }
        }
    }

    println!();
    Ok(())
}

pub fn cmd_config() -> anyhow::Result<()> {
    let config = TrainingRunConfig::default();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_train() {
        let cli = Cli::try_parse_from([
            "used-car-pricing",
            "train",
            "--train",
            "a.csv",
            "--test",
            "b.csv",
            "--cv-folds",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Train { train, cv_folds, .. } => {
                assert_eq!(train, Some(PathBuf::from("a.csv")));
                assert_eq!(cv_folds, Some(5));
            }
            _ => panic!("expected train command"),
        }
    }

    #[test]
    fn test_train_args_override_defaults() {
        let args = TrainArgs {
            train: Some(PathBuf::from("in/train.csv.gz")),
            cv_folds: Some(4),
            n_jobs: Some(2),
            metrics_out: Some(PathBuf::from("out/m.json")),
            ..Default::default()
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.train_path, PathBuf::from("in/train.csv.gz"));
        assert_eq!(config.test_path, PathBuf::from("files/input/test_data.csv"));
        assert_eq!(config.search.cv.n_splits(), 4);
        assert_eq!(config.search.n_jobs, Some(2));
        assert_eq!(config.metrics_path, PathBuf::from("out/m.json"));
    }

    #[test]
    fn test_train_args_reject_one_fold() {
        let args = TrainArgs {
            cv_folds: Some(1),
            ..Default::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_strip_ansi() {
        let colored = format!("{}", ok("done"));
        assert_eq!(strip_ansi(&colored), "done");
    }
}
