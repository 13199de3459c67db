//! Engine version identifiers.
//!
//! A version is either the literal `latest`, a tagged release (`128.0`), or a
//! nightly build written as `<version>#<build id>` where the build id is the
//! 14-digit `YYYYMMDDHHMMSS` timestamp of the build.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between a version and its nightly build id.
pub const BUILD_SEPARATOR: char = '#';

/// The literal requesting the newest available build.
pub const LATEST: &str = "latest";

// Static pattern, covered by the tests below
static NIGHTLY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d{14})$").expect("valid nightly suffix pattern"));

/// Errors raised while validating version strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// A build id was not exactly 14 ASCII digits.
    #[error("Invalid build id '{0}': expected 14 digits (YYYYMMDDHHMMSS)")]
    InvalidBuildId(String),

    /// An empty version string was supplied.
    #[error("Version must not be empty")]
    Empty,
}

/// A requested or resolved engine version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionSpec(String);

impl VersionSpec {
    /// Parse a user-supplied version string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Empty`] for blank input.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionError::Empty);
        }
        Ok(Self(s.to_string()))
    }

    /// The `latest` request.
    pub fn latest() -> Self {
        Self(LATEST.to_string())
    }

    /// A nightly version: `<version>#<build id>`.
    pub fn nightly(version: &str, build_id: &BuildId) -> Self {
        Self(format!("{version}{BUILD_SEPARATOR}{build_id}"))
    }

    /// Returns `true` if this is the literal `latest`.
    pub fn is_latest(&self) -> bool {
        self.0 == LATEST
    }

    /// The trailing nightly build id, if the version carries one.
    pub fn build_id(&self) -> Option<BuildId> {
        NIGHTLY_SUFFIX
            .captures(&self.0)
            .map(|c| BuildId(c[1].to_string()))
    }

    /// Raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A nightly build timestamp, `YYYYMMDDHHMMSS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildId(String);

impl BuildId {
    /// Validate a build id.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidBuildId`] unless the input is exactly
    /// 14 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        if s.len() == 14 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(VersionError::InvalidBuildId(s.to_string()))
        }
    }

    /// Four-digit year.
    pub fn year(&self) -> &str {
        &self.0[0..4]
    }

    /// Two-digit month.
    pub fn month(&self) -> &str {
        &self.0[4..6]
    }

    /// Two-digit day of month.
    pub fn day(&self) -> &str {
        &self.0[6..8]
    }

    /// Calendar date as `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        format!("{}-{}-{}", self.year(), self.month(), self.day())
    }

    /// Raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BuildId {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<BuildId> for String {
    fn from(id: BuildId) -> Self {
        id.0
    }
}
