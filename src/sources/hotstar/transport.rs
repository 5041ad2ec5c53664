use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::common::{ExtractorResult, TransportError};
use crate::manifest::{parse_m3u8, parse_mpd};
use crate::protocol::StreamFormat;

/// HTTP GET collaborator. Non-2xx responses come back as
/// [`TransportError::Status`] so the status stays inspectable.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get_json(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, String)],
    ) -> Result<Value, TransportError>;

    async fn get_text(&self, url: &str, headers: HeaderMap) -> Result<String, TransportError>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, TransportError> {
        let resp = self
            .client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            debug!("GET {} returned {}", url, status);
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_json(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        let text = self
            .send(url, headers, query)
            .await?
            .text()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_str(&text).map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn get_text(&self, url: &str, headers: HeaderMap) -> Result<String, TransportError> {
        self.send(url, headers, &[])
            .await?
            .text()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })
    }
}

/// Turns an adaptive manifest URL into the formats it describes.
#[async_trait]
pub trait ManifestExpander: Send + Sync {
    async fn expand_hls(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> ExtractorResult<Vec<StreamFormat>>;

    async fn expand_dash(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> ExtractorResult<Vec<StreamFormat>>;
}

/// Fetches manifests through an [`HttpFetcher`] and parses them locally.
pub struct HttpManifestExpander {
    fetcher: Arc<dyn HttpFetcher>,
}

impl HttpManifestExpander {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ManifestExpander for HttpManifestExpander {
    async fn expand_hls(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> ExtractorResult<Vec<StreamFormat>> {
        let text = self.fetcher.get_text(url, to_header_map(headers)).await?;
        parse_m3u8(&text, url)
    }

    async fn expand_dash(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> ExtractorResult<Vec<StreamFormat>> {
        let text = self.fetcher.get_text(url, to_header_map(headers)).await?;
        parse_mpd(&text, url)
    }
}

pub fn to_header_map(headers: &BTreeMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!("Dropping invalid request header: {}", name),
        }
    }
    map
}
