//! The engine plugin interface.
//!
//! Each installable engine is a plain struct implementing [`Engine`]. The
//! install pipeline drives it through a fixed sequence:
//!
//! ```text
//! resolve_version -> download_url -> (download) -> extract -> install -> test
//! ```
//!
//! Shared file handling lives behind [`Registrar`]; plugins only decide
//! *which* files to register and under which aliases.

use std::path::Path;

use async_trait::async_trait;
use esvm_schema::{EngineConfig, Platform, VersionSpec};
use thiserror::Error;

use crate::buildhub::BuildhubError;
use crate::installer::Registrar;
use crate::io::download::DownloadError;
use crate::io::extract::ExtractError;
use crate::status::StatusError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No {engine} builds available for {platform}")]
    UnsupportedPlatform {
        engine: &'static str,
        platform: Platform,
    },

    #[error("Failed to resolve {engine} version: {source}")]
    VersionResolution {
        engine: &'static str,
        source: BuildhubError,
    },

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Self-test of {engine} failed: {reason}")]
    SelfTest {
        engine: &'static str,
        reason: String,
    },

    #[error("Failed to record install: {0}")]
    Status(#[from] StatusError),
}

impl EngineError {
    /// Returns `true` for errors raised before any I/O took place.
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self, Self::UnsupportedPlatform { .. })
    }
}

/// An installable JavaScript engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Static descriptor (name, id, supported platforms).
    fn config(&self) -> &'static EngineConfig;

    /// The platform this instance installs for.
    fn platform(&self) -> Platform;

    /// Turn a requested version into a concrete one.
    ///
    /// Anything other than `latest` is passed through unchanged.
    async fn resolve_version(&self, version: &VersionSpec) -> Result<VersionSpec, EngineError>;

    /// Archive URL for a resolved version on this instance's platform.
    ///
    /// Fails with [`EngineError::UnsupportedPlatform`] without touching the
    /// network when no build exists for the platform.
    fn download_url(&self, version: &VersionSpec) -> Result<String, EngineError>;

    /// Unpack the downloaded archive into the extraction directory.
    async fn extract(&self, registrar: &dyn Registrar) -> Result<(), EngineError>;

    /// Register entry points and record the primary binary.
    async fn install(&mut self, registrar: &dyn Registrar) -> Result<(), EngineError>;

    /// Smoke-test the primary binary. Fails if [`install`](Self::install)
    /// has not completed.
    async fn test(&self) -> Result<(), EngineError>;

    /// Primary entry point, set once [`install`](Self::install) succeeds.
    fn bin_path(&self) -> Option<&Path>;
}
