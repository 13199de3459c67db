//! Streaming archive download with progress reporting.
//!
//! Engine archives are fetched as-is: no checksum is published alongside
//! them, so nothing is verified here.

use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;
use esvm_schema::VersionSpec;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request for a download operation
pub struct DownloadRequest<'a, R: Reporter + ?Sized> {
    pub client: &'a Client,
    pub engine: &'a str,
    pub version: &'a VersionSpec,
    pub url: &'a str,
    pub dest: &'a Path,
    pub reporter: &'a R,
}

impl<R: Reporter + ?Sized> std::fmt::Debug for DownloadRequest<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("engine", &self.engine)
            .field("version", &self.version)
            .field("url", &self.url)
            .field("dest", &self.dest)
            .finish_non_exhaustive()
    }
}

impl<R: Reporter + ?Sized> DownloadRequest<'_, R> {
    /// Execute the download, returning the number of bytes written.
    pub async fn execute(self) -> Result<u64, DownloadError> {
        download(self).await
    }
}

/// Stream `url` into `dest`, reporting progress as chunks arrive.
///
/// A partially written file is removed when the transfer fails.
pub async fn download<R: Reporter + ?Sized>(
    req: DownloadRequest<'_, R>,
) -> Result<u64, DownloadError> {
    tracing::debug!("Downloading {} -> {}", req.url, req.dest.display());

    let response = req
        .client
        .get(req.url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?
        .error_for_status()?;

    let total_size = response.content_length();
    req.reporter
        .downloading(req.engine, req.version, 0, total_size);

    let mut file = File::create(req.dest).await?;
    match stream_to_file(response, &mut file, &req, total_size).await {
        Ok(downloaded) => {
            file.flush().await?;
            Ok(downloaded)
        }
        Err(e) => {
            drop(file);
            tokio::fs::remove_file(req.dest).await.ok();
            Err(e)
        }
    }
}

async fn stream_to_file<R: Reporter + ?Sized>(
    response: reqwest::Response,
    file: &mut File,
    req: &DownloadRequest<'_, R>,
    total_size: Option<u64>,
) -> Result<u64, DownloadError> {
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        req.reporter
            .downloading(req.engine, req.version, downloaded, total_size);
    }

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullReporter;
    use mockito::Server;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_download_writes_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/jsshell-linux-x86_64.zip")
            .with_status(200)
            .with_body("archive-bytes")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("jsshell.zip");
        let url = format!("{}/jsshell-linux-x86_64.zip", server.url());
        let client = Client::new();
        let version = VersionSpec::parse("128.0").unwrap();

        let written = DownloadRequest {
            client: &client,
            engine: "jsshell",
            version: &version,
            url: &url,
            dest: &dest,
            reporter: &NullReporter,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(written, 13);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "archive-bytes");
    }

    #[tokio::test]
    async fn test_download_http_error_surfaces() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing.zip")
            .with_status(404)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing.zip");
        let url = format!("{}/missing.zip", server.url());
        let client = Client::new();
        let version = VersionSpec::parse("1.0").unwrap();

        let err = download(DownloadRequest {
            client: &client,
            engine: "jsshell",
            version: &version,
            url: &url,
            dest: &dest,
            reporter: &NullReporter,
        })
        .await
        .unwrap_err();

        assert!(matches!(err, DownloadError::Http(_)));
        assert!(!dest.exists());
    }
}
