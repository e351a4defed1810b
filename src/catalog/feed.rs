use std::path::PathBuf;

use async_trait::async_trait;

use super::error::FetchError;
use crate::config::FeedConfig;

/// Source of raw element-set text.
#[async_trait]
pub trait ElementFeed: Send + Sync {
    async fn fetch(&self) -> Result<String, FetchError>;

    /// Human-readable origin, for logs.
    fn source(&self) -> &str;
}

/// Fetches the whole feed with a single GET, buffering at most `max_body_bytes`.
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
    max_body_bytes: usize,
}

impl HttpFeed {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(HttpFeed {
            client,
            url: config.url.clone(),
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl ElementFeed for HttpFeed {
    async fn fetch(&self) -> Result<String, FetchError> {
        let mut response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let limit = self.max_body_bytes;
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(FetchError::TooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        log::debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(String::from_utf8(body)?)
    }

    fn source(&self) -> &str {
        &self.url
    }
}

/// Reads a previously downloaded feed from disk, with the same size cap as `HttpFeed`.
pub struct FileFeed {
    path: PathBuf,
    label: String,
    max_body_bytes: usize,
}

impl FileFeed {
    pub fn new(path: PathBuf, max_body_bytes: usize) -> Self {
        let label = path.display().to_string();
        FileFeed {
            path,
            label,
            max_body_bytes,
        }
    }
}

#[async_trait]
impl ElementFeed for FileFeed {
    async fn fetch(&self) -> Result<String, FetchError> {
        let limit = self.max_body_bytes;
        if tokio::fs::metadata(&self.path).await?.len() > limit as u64 {
            return Err(FetchError::TooLarge { limit });
        }
        let body = tokio::fs::read(&self.path).await?;
        if body.len() > limit {
            return Err(FetchError::TooLarge { limit });
        }
        Ok(String::from_utf8(body)?)
    }

    fn source(&self) -> &str {
        &self.label
    }
}

/// Serves a fixed payload.
pub struct StaticFeed {
    content: String,
}

impl StaticFeed {
    pub fn new(content: impl Into<String>) -> Self {
        StaticFeed {
            content: content.into(),
        }
    }
}

#[async_trait]
impl ElementFeed for StaticFeed {
    async fn fetch(&self) -> Result<String, FetchError> {
        Ok(self.content.clone())
    }

    fn source(&self) -> &str {
        "static"
    }
}
