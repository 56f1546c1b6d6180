//! upnp-find - locate UPnP devices from the command line.
//!
//! Resolves the hosts of devices whose descriptions match a set of queries,
//! or lists everything that answers an SSDP search.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.finder_config();
    let deadline = cli.deadline();

    match cli.command {
        Commands::Find(args) => commands::run_find(args, config, deadline, cli.json).await,
        Commands::Discover(args) => {
            commands::run_discover(args, config, deadline, cli.json).await
        }
    }
}
