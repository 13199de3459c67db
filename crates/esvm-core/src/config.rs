//! User configuration parsed from `~/.esvm/config.toml`.
//!
//! Every field is optional; a missing file yields [`Config::default`].
//!
//! ```toml
//! engines = ["jsshell"]
//! buildhub_url = "https://buildhub.moz.tools/api/search"
//! archive_url = "https://archive.mozilla.org/pub/firefox"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

use crate::buildhub::{BUILDHUB_SEARCH_URL, Buildhub};
use crate::engines::Sources;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Engines installed by a bare `esvm install`. Empty means every engine
    /// available on the platform.
    pub engines: Vec<String>,

    /// Override for the Buildhub search endpoint.
    pub buildhub_url: Option<String>,

    /// Mirror of Mozilla's Firefox archive.
    pub archive_url: Option<String>,
}

impl Config {
    /// Load the configuration file, treating a missing file as defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not
    /// valid TOML for this schema.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// The Buildhub endpoint to query.
    pub fn buildhub_url(&self) -> &str {
        self.buildhub_url.as_deref().unwrap_or(BUILDHUB_SEARCH_URL)
    }

    /// Remote endpoints for engine plugins.
    pub fn sources(&self, client: reqwest::Client) -> Sources {
        Sources {
            buildhub: Buildhub::new(client, self.buildhub_url()),
            mozilla_archive: self.archive_url.clone(),
        }
    }
}
