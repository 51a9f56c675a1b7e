//! Linfit - Main Entry Point

use clap::Parser;
use linfit_studio::cli::{cmd_inspect, cmd_predict, cmd_preprocess, cmd_show, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linfit_studio=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect { data }) => {
            cmd_inspect(&data)?;
        }
        Some(Commands::Preprocess { data, output, method, columns, constants, config }) => {
            cmd_preprocess(&data, &output, method.as_deref(), &columns, constants, config.as_deref())?;
        }
        Some(Commands::Train { data, target, features, description, output }) => {
            cmd_train(&data, &target, features, &description, output.as_deref())?;
        }
        Some(Commands::Show { model }) => {
            cmd_show(&model)?;
        }
        Some(Commands::Predict { model, data, value, output }) => {
            cmd_predict(&model, data.as_deref(), &value, output.as_deref())?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
