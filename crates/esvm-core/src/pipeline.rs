//! End-to-end install of one engine.
//!
//! # Implementation Note: install steps
//!
//! ```text
//! supported? -> resolve -> already installed? -> download -> extract
//!            -> install -> self-test -> record
//! ```
//!
//! The download and extraction happen in a scratch directory under
//! `~/.esvm/tmp` that is dropped when the run ends, successful or not. The
//! engine's install directory is wiped right before `install` so a re-install
//! never mixes files from two versions.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use esvm_schema::VersionSpec;
use tokio::fs;

use crate::engine::{Engine, EngineError};
use crate::installer::Installation;
use crate::io::download::DownloadRequest;
use crate::status::Status;
use crate::{Layout, Reporter, filename_from_url};

/// Groups the state shared by every install in one CLI run.
#[derive(Clone)]
pub struct Context {
    pub client: reqwest::Client,
    pub layout: Layout,
    pub reporter: Arc<dyn Reporter>,
    /// Reinstall even when the resolved version is already recorded.
    pub force: bool,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("layout", &self.layout)
            .field("force", &self.force)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(client: reqwest::Client, layout: Layout, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            client,
            layout,
            reporter,
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed {
        version: VersionSpec,
        bin_path: Option<PathBuf>,
    },
    AlreadyInstalled(VersionSpec),
}

/// Install `requested` of `engine`, reporting every step.
pub async fn install_engine(
    ctx: &Context,
    engine: &mut dyn Engine,
    requested: &VersionSpec,
) -> Result<InstallOutcome, EngineError> {
    let config = engine.config();
    let platform = engine.platform();

    if !config.supports(platform) {
        return Err(EngineError::UnsupportedPlatform {
            engine: config.name,
            platform,
        });
    }

    ctx.reporter.resolving(config.name, requested);
    let version = engine.resolve_version(requested).await?;
    tracing::info!("Resolved {} {requested} -> {version}", config.name);

    let status_path = ctx.layout.status_path();
    let mut status = Status::load(&status_path).await?;
    if !ctx.force && status.is_installed(config.id, &version) {
        tracing::info!("{} {version} already installed", config.name);
        ctx.reporter
            .done(config.name, &version, "already installed");
        return Ok(InstallOutcome::AlreadyInstalled(version));
    }

    let url = engine.download_url(&version)?;

    let tmp_root = ctx.layout.tmp_dir();
    fs::create_dir_all(&tmp_root).await?;
    let scratch = tempfile::Builder::new()
        .prefix(&format!("{}-", config.id))
        .tempdir_in(&tmp_root)?;

    let download_path = scratch.path().join(filename_from_url(&url));
    let extracted_path = scratch.path().join("extracted");
    fs::create_dir_all(&extracted_path).await?;

    let bytes = DownloadRequest {
        client: &ctx.client,
        engine: config.name,
        version: &version,
        url: &url,
        dest: &download_path,
        reporter: ctx.reporter.as_ref(),
    }
    .execute()
    .await?;
    tracing::debug!("Downloaded {bytes} bytes from {url}");

    let install_path = ctx.layout.engine_dir(config.id);
    let installation = Installation::new(
        platform,
        download_path,
        extracted_path,
        install_path.clone(),
        ctx.layout.bin_dir(),
    );

    ctx.reporter.extracting(config.name, &version);
    engine.extract(&installation).await?;

    ctx.reporter.installing(config.name, &version);
    if fs::try_exists(&install_path).await? {
        fs::remove_dir_all(&install_path).await?;
    }
    installation.prepare().await?;
    engine.install(&installation).await?;

    ctx.reporter.testing(config.name, &version);
    engine.test().await?;

    let bin_path = engine.bin_path().map(PathBuf::from);

    status.record(config.id, version.clone(), bin_path.clone());
    status.save(&status_path).await?;

    let detail = bin_path
        .as_deref()
        .map_or_else(String::new, |p| p.display().to_string());
    ctx.reporter.done(config.name, &version, &detail);
    tracing::info!("Installed {} {version}", config.name);

    Ok(InstallOutcome::Installed { version, bin_path })
}
