//! Fetching raw asset bytes from the network or the local disk

use crate::{AudioError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Source of asset bytes addressed by a URL or path
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// Fetches assets over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, headers, ...)
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        debug!(url = location, "Fetching asset");

        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| AudioError::fetch(location, e))?
            .error_for_status()
            .map_err(|e| AudioError::fetch(location, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AudioError::fetch(location, e))?;

        Ok(bytes.to_vec())
    }
}

/// Reads assets from a directory on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

#[async_trait]
impl AssetFetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        tokio::fs::read(location)
            .await
            .map_err(|e| AudioError::fetch(location, e))
    }
}

/// Pick the fetcher matching an asset base
pub fn fetcher_for(base: &str) -> Arc<dyn AssetFetcher> {
    if is_remote(base) {
        Arc::new(HttpFetcher::new())
    } else {
        Arc::new(FileFetcher)
    }
}

pub fn is_remote(base: &str) -> bool {
    base.starts_with("http://") || base.starts_with("https://")
}

/// Join a relative asset path onto a base directory or URL
pub fn join_location(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
