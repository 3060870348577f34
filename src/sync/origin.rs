use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::error::SyncError;

pub const DEFAULT_DUMP_URL: &str = "https://cdn.thegamesdb.net/json/database-latest.json";

/// Result of a conditional read against the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 304: the stored dump is current.
    NotModified,
    /// New content plus the validator to send next time, if the origin gave one.
    Modified { body: Bytes, etag: Option<String> },
}

/// Where the dump comes from. The HTTP implementation is [`HttpOrigin`].
#[async_trait]
pub trait DumpOrigin: Send + Sync {
    async fn fetch(&self, validator: Option<&str>) -> Result<FetchOutcome, SyncError>;
}

/// Fetches the dump with `If-None-Match` revalidation.
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    url: String,
    http: Client,
}

impl HttpOrigin {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let http = Client::builder()
            .user_agent(concat!("gamesdb-mirror/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DumpOrigin for HttpOrigin {
    async fn fetch(&self, validator: Option<&str>) -> Result<FetchOutcome, SyncError> {
        let mut req = self.http.get(&self.url);
        if let Some(tag) = validator {
            debug!(etag = tag, "conditional fetch");
            req = req.header(IF_NONE_MATCH, tag);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        if !status.is_success() {
            return Err(SyncError::OriginStatus {
                status: status.as_u16(),
            });
        }

        let etag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?;
        info!(bytes = body.len(), etag = ?etag, "dump downloaded");
        Ok(FetchOutcome::Modified { body, etag })
    }
}
