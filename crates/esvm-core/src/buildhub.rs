//! Buildhub client for locating the newest nightly build.
//!
//! Buildhub (<https://buildhub2.readthedocs.io>) indexes every Firefox build
//! and exposes an Elasticsearch-style search endpoint. One query returning
//! a single hit, sorted by build id, is enough to find the newest nightly.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use esvm_schema::{BuildId, VersionError};

/// Public Buildhub search endpoint.
pub const BUILDHUB_SEARCH_URL: &str = "https://buildhub.moz.tools/api/search";

#[derive(Error, Debug)]
pub enum BuildhubError {
    #[error("Buildhub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Buildhub returned no builds for {0}")]
    NoResults(String),

    #[error("Buildhub returned a malformed build: {0}")]
    Malformed(#[from] VersionError),
}

/// Term filters for a build search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildQuery<'a> {
    pub product: &'a str,
    pub tree: &'a str,
    pub channel: &'a str,
    pub platform: &'a str,
}

impl BuildQuery<'_> {
    /// Search body requesting the single newest matching build.
    pub fn to_body(&self) -> serde_json::Value {
        json!({
            "size": 1,
            "sort": { "build.id": "desc" },
            "query": {
                "bool": {
                    "must": [
                        { "term": { "source.product": self.product } },
                        { "term": { "source.tree": self.tree } },
                        { "term": { "target.channel": self.channel } },
                        { "term": { "target.platform": self.platform } },
                    ]
                }
            }
        })
    }
}

impl std::fmt::Display for BuildQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.product, self.tree, self.channel, self.platform
        )
    }
}

/// The newest build matching a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    /// Product version, e.g. `91.0a1`.
    pub version: String,
    /// Build timestamp.
    pub build_id: BuildId,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Source,
}

#[derive(Deserialize)]
struct Source {
    build: SourceBuild,
    target: SourceTarget,
}

#[derive(Deserialize)]
struct SourceBuild {
    id: String,
}

#[derive(Deserialize)]
struct SourceTarget {
    version: String,
}

/// Thin wrapper around the search endpoint.
#[derive(Debug, Clone)]
pub struct Buildhub {
    client: Client,
    search_url: String,
}

impl Buildhub {
    pub fn new(client: Client, search_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
        }
    }

    /// Find the newest build matching `query`.
    ///
    /// Issues exactly one POST. An empty hit list is an error rather than a
    /// reason to fall back to some default.
    pub async fn latest(&self, query: &BuildQuery<'_>) -> Result<Build, BuildhubError> {
        tracing::debug!("Querying {} for {query}", self.search_url);

        let response: SearchResponse = self
            .client
            .post(&self.search_url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .json(&query.to_body())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let hit = response
            .hits
            .hits
            .into_iter()
            .next()
            .ok_or_else(|| BuildhubError::NoResults(query.to_string()))?;

        let build_id = BuildId::parse(&hit.source.build.id)?;
        tracing::debug!("Newest build: {} ({build_id})", hit.source.target.version);

        Ok(Build {
            version: hit.source.target.version,
            build_id,
        })
    }
}
