//! Operations CLI: demo data, employees and API tokens.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tradenet_infra::{AppConfig, Backends};

mod commands;

use commands::*;

#[derive(Parser, Debug)]
#[clap(name = "tradenet-admin", version, about = "Trade network operations tool.")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill the network with random factory chains.
    DemoData(demo::DemoArgs),

    /// Manage the employees allowed to use the API.
    Employee {
        #[clap(subcommand)]
        command: employee::EmployeeCommands,
    },

    /// Mint an API token for an employee.
    Token(token::TokenArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tradenet_observability::init();
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.database_url.is_none() {
        tracing::warn!("DATABASE_URL not set; changes will not outlive this process");
    }
    let backends = Backends::connect(&config)
        .await
        .context("failed to initialize storage")?;

    match cli.command {
        Commands::DemoData(args) => demo::run(&backends, args).await,
        Commands::Employee { command } => employee::run(&backends, command).await,
        Commands::Token(args) => token::run(&backends, &config, args).await,
    }
}
