//! Install command

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use esvm_core::config::Config;
use esvm_core::engines;
use esvm_core::pipeline::{self, Context, InstallOutcome};
use esvm_core::{Reporter, USER_AGENT};
use esvm_schema::{Platform, VersionSpec};

use crate::ui::ConsoleReporter;

/// Options for `esvm install`.
#[derive(Debug, Clone, Copy)]
pub struct InstallArgs<'a> {
    /// Engines named on the command line.
    pub engines: &'a [String],
    /// Requested version (`latest` or a concrete one).
    pub version: &'a str,
    /// Reinstall recorded versions.
    pub force: bool,
    /// Target platform.
    pub platform: Platform,
    /// Hide progress output.
    pub quiet: bool,
}

/// Install the requested engines one after another.
///
/// Every engine is attempted; the command fails afterwards if any did.
pub async fn install(args: InstallArgs<'_>) -> Result<()> {
    let layout = super::home_layout()?;
    let config = Config::load(&layout.config_path())
        .await
        .context("Failed to load config")?;
    let requested = VersionSpec::parse(args.version)?;

    let names = select_engines(args.engines, &config.engines, args.platform);
    if names.is_empty() {
        bail!("No engines available for {}", args.platform);
    }

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;
    let sources = config.sources(client.clone());

    let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter::new(args.quiet));
    let ctx = Context::new(client, layout.clone(), Arc::clone(&reporter)).with_force(args.force);

    reporter.section(&format!("Installing for {}", args.platform));

    let mut installed = 0usize;
    let mut failed = 0usize;
    for name in &names {
        let Some(mut engine) = engines::lookup(name, args.platform, &sources) else {
            reporter.error(&format!("Unknown engine '{name}'. Run 'esvm engines' to list them."));
            failed += 1;
            continue;
        };

        match pipeline::install_engine(&ctx, engine.as_mut(), &requested).await {
            Ok(InstallOutcome::Installed { .. }) => installed += 1,
            Ok(InstallOutcome::AlreadyInstalled(_)) => {}
            Err(e) => {
                tracing::debug!("Install of {name} failed: {e:?}");
                reporter.failed(engine.config().name, &requested, &e.to_string());
                failed += 1;
            }
        }
    }

    let bin_dir = layout.bin_dir();
    if installed > 0 {
        reporter.success(&format!("Aliases installed to {}", bin_dir.display()));
        if let Some(hint) = path_hint(&bin_dir, std::env::var_os("PATH")) {
            reporter.warning(&hint);
        }
    }

    if failed > 0 {
        bail!("{failed} of {} engine(s) failed to install", names.len());
    }
    Ok(())
}

/// Engines to install: those named on the command line, else the configured
/// defaults, else every engine with builds for `platform`.
fn select_engines(cli: &[String], configured: &[String], platform: Platform) -> Vec<String> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    if !configured.is_empty() {
        return configured.to_vec();
    }
    engines::configs()
        .iter()
        .filter(|c| c.supports(platform))
        .map(|c| c.id.to_string())
        .collect()
}

/// Hint shown when `bin_dir` is missing from `path`.
fn path_hint(bin_dir: &Path, path: Option<OsString>) -> Option<String> {
    let on_path = path.is_some_and(|paths| std::env::split_paths(&paths).any(|p| p == bin_dir));
    (!on_path).then(|| format!("Add {} to your PATH to use them", bin_dir.display()))
}
