mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use output::{CliOutput, JsonModeOutput, UserOutput};
use testnet::Error as TestnetError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(testnet_error) = e.downcast_ref::<TestnetError>() {
            eprintln!("Error: {}", testnet_error);
            if let Some(suggestion) = testnet_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Commands::Validate => commands::run_validate(cli.config, &CliOutput),
        Commands::Up {
            detach,
            no_wait,
            json,
        } => {
            let out: &dyn UserOutput = if json { &JsonModeOutput } else { &CliOutput };
            let options = commands::UpOptions {
                detach,
                no_wait,
                json,
            };
            commands::run_up(cli.config, options, out).await
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
