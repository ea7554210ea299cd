//! kolosal-tune - Main Entry Point

use clap::Parser;
use kolosal_tune::cli::{cmd_info, cmd_tune, Cli, Commands, TuneArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kolosal_tune=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tune {
            data,
            output,
            drop,
            label,
            no_images,
            folds,
            seed,
            validation_size,
            n_jobs,
            config,
        } => {
            cmd_tune(&TuneArgs {
                data,
                output,
                drop,
                label,
                no_images,
                folds,
                seed,
                validation_size,
                n_jobs,
                config,
            })?;
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
