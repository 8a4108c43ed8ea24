//! Used-car pricing - Main Entry Point

use clap::Parser;
use used_car_pricing::cli::{cmd_config, cmd_predict, cmd_train, Cli, Commands, TrainArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "used_car_pricing=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { train, test, config, cv_folds, n_jobs, model_out, metrics_out } => {
            let args = TrainArgs { train, test, config, cv_folds, n_jobs, model_out, metrics_out };
            cmd_train(&args)?;
        }
        Commands::Predict { model, data, output } => {
            cmd_predict(&model, &data, output.as_deref())?;
        }
        Commands::Config => {
            cmd_config()?;
        }
    }

    Ok(())
}
