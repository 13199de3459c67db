//! esvm - JavaScript engine version manager
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Downloads prebuilt engine shells and exposes them under short aliases in
//! a single bin directory.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.esvm/
//! ├── bin/        # Launchers and symlinks (add to PATH)
//! ├── engines/    # Installed engine files, one directory per engine
//! ├── tmp/        # Scratch space for in-flight installs
//! ├── config.toml # Optional settings
//! └── status.toml # Installed versions
//! ```

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use esvm_schema::Platform;

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(name = "esvm")]
#[command(author, version, about = "esvm - JavaScript engine version manager")]
pub struct Cli {
    /// Install for this platform instead of the host (e.g. linux-x64)
    #[arg(long, global = true, env = "ESVM_PLATFORM")]
    pub platform: Option<Platform>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install one or more engines
    Install {
        /// Engine ids or aliases (defaults to config, else every available engine)
        engines: Vec<String>,
        /// Version to install: a release number, or `latest` for the newest nightly
        #[arg(long = "engine-version", default_value = "latest")]
        version: String,
        /// Reinstall even if the version is already installed
        #[arg(short, long)]
        force: bool,
    },
    /// List installed engines
    List,
    /// Show known engines and whether they run on this platform
    Engines,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// The platform to install for: the `--platform` override, else the host.
pub fn target_platform(flag: Option<Platform>) -> anyhow::Result<Platform> {
    match flag {
        Some(platform) => Ok(platform),
        None => Ok(Platform::current()?),
    }
}
