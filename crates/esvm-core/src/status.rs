//! Record of installed engine versions (`~/.esvm/status.toml`).
//!
//! ```toml
//! [engines.jsshell]
//! version = "91.0a1#20210501123456"
//! installed_at = "2021-05-02T10:00:00Z"
//! bin_path = "/home/me/.esvm/bin/spidermonkey"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use esvm_schema::VersionSpec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("IO error on status file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt status file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize status: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// One installed engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledEngine {
    pub version: VersionSpec,
    pub installed_at: DateTime<Utc>,
    pub bin_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub engines: BTreeMap<String, InstalledEngine>,
}

impl Status {
    /// Load the status file. A missing file means nothing is installed.
    pub async fn load(path: &Path) -> Result<Self, StatusError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).await?;
        Ok(toml::from_str(&content)?)
    }

    /// Atomically persist the status file.
    ///
    /// Written to a temporary sibling and renamed so readers never observe a
    /// partial file.
    pub async fn save(&self, path: &Path) -> Result<(), StatusError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, path).await?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&InstalledEngine> {
        self.engines.get(id)
    }

    /// Returns `true` if `id` is recorded at exactly `version`.
    pub fn is_installed(&self, id: &str, version: &VersionSpec) -> bool {
        self.get(id).is_some_and(|e| &e.version == version)
    }

    pub fn record(&mut self, id: &str, version: VersionSpec, bin_path: Option<PathBuf>) {
        self.engines.insert(
            id.to_string(),
            InstalledEngine {
                version,
                installed_at: Utc::now(),
                bin_path,
            },
        );
    }
}
