//! esvm - JavaScript engine version manager CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use esvm_cli::cmd;
use esvm_cli::cmd::install::InstallArgs;
use esvm_cli::{Cli, Commands, target_platform};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Install {
            engines,
            version,
            force,
        } => {
            cmd::install::install(InstallArgs {
                engines: &engines,
                version: &version,
                force,
                platform: target_platform(cli.platform)?,
                quiet: cli.quiet,
            })
            .await
        }
        Commands::List => cmd::list::list().await,
        Commands::Engines => {
            cmd::engines::engines(target_platform(cli.platform)?);
            Ok(())
        }
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
