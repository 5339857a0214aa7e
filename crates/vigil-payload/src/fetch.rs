// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object-store readers keyed by URI scheme.
//!
//! Fetchers return whole bodies. Callers wrap them in a deadline; fetchers
//! themselves only bound the body size.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no fetcher for uri scheme `{scheme}`")]
    UnsupportedScheme { scheme: String },

    #[error("invalid object uri `{uri}`: {message}")]
    InvalidUri { uri: String, message: String },

    #[error("object not found: {uri}")]
    NotFound { uri: String },

    #[error("object {uri} exceeds {limit} bytes")]
    TooLarge { uri: String, limit: u64 },

    #[error("object read failed for {uri}: {message}")]
    Transport { uri: String, message: String },
}

/// Reads one object body by URI.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError>;
}

/// `http://` and `https://` objects via reqwest.
#[derive(Debug, Clone)]
pub struct HttpObjectFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpObjectFetcher {
    pub fn new(max_bytes: u64) -> Self {
        Self::with_client(reqwest::Client::new(), max_bytes)
    }

    pub fn with_client(client: reqwest::Client, max_bytes: u64) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl ObjectFetcher for HttpObjectFetcher {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            uri: uri.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(uri).send().await.map_err(transport)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                uri: uri.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Transport {
                uri: uri.to_string(),
                message: format!("HTTP {status}"),
            });
        }
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(FetchError::TooLarge {
                uri: uri.to_string(),
                limit: self.max_bytes,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        if body.len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                uri: uri.to_string(),
                limit: self.max_bytes,
            });
        }
        debug!(uri, bytes = body.len(), "fetched object over http");
        Ok(body.to_vec())
    }
}

/// `file://` objects from the local filesystem.
#[derive(Debug, Clone)]
pub struct FsObjectFetcher {
    max_bytes: u64,
}

impl FsObjectFetcher {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    fn path_of(uri: &str) -> Result<PathBuf, FetchError> {
        let invalid = |message: &str| FetchError::InvalidUri {
            uri: uri.to_string(),
            message: message.to_string(),
        };
        let url = reqwest::Url::parse(uri).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "file" {
            return Err(invalid("not a file uri"));
        }
        url.to_file_path()
            .map_err(|()| invalid("not an absolute local path"))
    }
}

#[async_trait]
impl ObjectFetcher for FsObjectFetcher {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let path = Self::path_of(uri)?;
        let io_error = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound {
                    uri: uri.to_string(),
                }
            } else {
                FetchError::Transport {
                    uri: uri.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let metadata = tokio::fs::metadata(&path).await.map_err(io_error)?;
        if metadata.len() > self.max_bytes {
            return Err(FetchError::TooLarge {
                uri: uri.to_string(),
                limit: self.max_bytes,
            });
        }
        let body = tokio::fs::read(&path).await.map_err(io_error)?;
        debug!(uri, bytes = body.len(), "read object from filesystem");
        Ok(body)
    }
}

/// Dispatches to a fetcher by the URI's scheme.
#[derive(Clone, Default)]
pub struct SchemeRouter {
    fetchers: HashMap<String, Arc<dyn ObjectFetcher>>,
}

impl SchemeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTTP(S) and local files, each capped at `max_bytes`.
    pub fn standard(max_bytes: u64) -> Self {
        let http: Arc<dyn ObjectFetcher> = Arc::new(HttpObjectFetcher::new(max_bytes));
        Self::new()
            .with("http", Arc::clone(&http))
            .with("https", http)
            .with("file", Arc::new(FsObjectFetcher::new(max_bytes)))
    }

    /// Route `scheme` (case-insensitive) to `fetcher`, replacing any previous one.
    pub fn with(mut self, scheme: &str, fetcher: Arc<dyn ObjectFetcher>) -> Self {
        self.fetchers.insert(scheme.to_ascii_lowercase(), fetcher);
        self
    }

    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.fetchers.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}

#[async_trait]
impl ObjectFetcher for SchemeRouter {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let Some((scheme, _)) = uri.split_once("://") else {
            return Err(FetchError::InvalidUri {
                uri: uri.to_string(),
                message: "missing scheme".to_string(),
            });
        };
        let scheme = scheme.to_ascii_lowercase();
        match self.fetchers.get(&scheme) {
            Some(fetcher) => fetcher.fetch(uri).await,
            None => Err(FetchError::UnsupportedScheme { scheme }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn standard_router_knows_http_and_files() {
        assert_eq!(SchemeRouter::standard(1).schemes(), vec!["file", "http", "https"]);
    }

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let err = SchemeRouter::standard(1024)
            .fetch("s3://bucket/key")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { scheme } if scheme == "s3"));
    }

    #[tokio::test]
    async fn uri_without_scheme_is_invalid() {
        let err = SchemeRouter::standard(1024).fetch("bucket/key").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUri { .. }));
    }

    #[tokio::test]
    async fn file_fetcher_reads_and_caps() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ABCDEFGHIJK").unwrap();
        let uri = reqwest::Url::from_file_path(file.path()).unwrap().to_string();

        let body = FsObjectFetcher::new(1024).fetch(&uri).await.unwrap();
        assert_eq!(body, b"ABCDEFGHIJK");

        let err = FsObjectFetcher::new(4).fetch(&uri).await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 4, .. }));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let uri = reqwest::Url::from_file_path(dir.path().join("gone.bin"))
            .unwrap()
            .to_string();
        let err = FsObjectFetcher::new(1024).fetch(&uri).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }
}
