use dirs::home_dir;
use std::path::{Path, PathBuf};

/// Environment variable overriding the esvm home directory.
pub const HOME_ENV: &str = "ESVM_HOME";

/// Returns the primary state directory, or None if the user's home cannot be resolved.
pub fn try_esvm_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var(HOME_ENV) {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".esvm"))
}

/// On-disk layout rooted at the esvm home directory.
///
/// ```text
/// ~/.esvm/
/// ├── bin/           # Aliases (sm, spidermonkey, ...)
/// ├── engines/<id>/  # Installed engine files
/// ├── tmp/           # Per-install download and extraction scratch space
/// ├── config.toml    # Optional user configuration
/// └── status.toml    # Installed engine versions
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home: PathBuf,
}

impl Layout {
    /// Layout rooted at an explicit directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Layout rooted at `ESVM_HOME` or `~/.esvm`.
    pub fn from_env() -> Option<Self> {
        try_esvm_home().map(Self::new)
    }

    /// Alias directory users add to `PATH`: ~/.esvm/bin
    pub fn bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }

    /// Parent of all engine installs: ~/.esvm/engines
    pub fn engines_dir(&self) -> PathBuf {
        self.home.join("engines")
    }

    /// Install directory of one engine: ~/.esvm/engines/<id>
    pub fn engine_dir(&self, id: &str) -> PathBuf {
        self.engines_dir().join(id)
    }

    /// Scratch space, same volume as the engines: ~/.esvm/tmp
    pub fn tmp_dir(&self) -> PathBuf {
        self.home.join("tmp")
    }

    /// ~/.esvm/config.toml
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// ~/.esvm/status.toml
    pub fn status_path(&self) -> PathBuf {
        self.home.join("status.toml")
    }
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}
