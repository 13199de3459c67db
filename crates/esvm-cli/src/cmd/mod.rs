//! Command implementations, one module per subcommand.

pub mod completions;
pub mod engines;
pub mod install;
pub mod list;

use anyhow::{Context, Result};
use esvm_core::Layout;

/// Resolve the esvm home directory.
pub(crate) fn home_layout() -> Result<Layout> {
    Layout::from_env().context("Could not determine the esvm home directory; set ESVM_HOME")
}
