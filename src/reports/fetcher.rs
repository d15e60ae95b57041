use async_trait::async_trait;

use crate::{Error, Result};

/// Source of report sample text.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches over HTTP GET; anything but `200 OK` is an error.
#[derive(Debug, Clone)]
pub struct HttpFileFetcher {
    http: reqwest::Client,
}

impl HttpFileFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl FileFetcher for HttpFileFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let fetch_error = |message: String| Error::Fetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(fetch_error(format!("unexpected status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        tracing::debug!(url, bytes = body.len(), "fetched report sample");
        Ok(body)
    }
}
