use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "testnet")]
#[command(about = "Start inter-dependent JSON-RPC services as a containerized test network")]
pub struct Cli {
    /// Config file path (defaults to testnet.yaml, searched upward)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start every service of the network
    Up {
        /// Leave the containers running and exit once started
        #[arg(short, long)]
        detach: bool,

        /// Skip waiting for terminal services to pass their liveness probe
        #[arg(long)]
        no_wait: bool,

        /// Print the running network as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the config and show the resolved start order
    Validate,
}
