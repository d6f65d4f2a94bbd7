//! Network layer for the cache worker
//!
//! Requests are GET-only: the worker caches app shell assets and nothing else.

use crate::error::{DevIdError, DevIdResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// An intercepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
}

impl Request {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parse an absolute URL
    pub fn parse(input: &str) -> DevIdResult<Self> {
        Url::parse(input).map(Self::new).map_err(|e| DevIdError::UrlInvalid {
            input: input.to_string(),
            reason: e.to_string(),
        })
    }

    /// Exact-match cache key
    pub fn cache_key(&self) -> &str {
        self.url.as_str()
    }
}

/// A response as returned by the network or a cache store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![],
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 2xx status
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with this name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Something that can perform network requests
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> DevIdResult<Response>;
}

/// HTTP fetcher backed by a blocking client on the blocking thread pool
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent }
    }

    fn get(agent: &ureq::Agent, url: &str) -> DevIdResult<Response> {
        let mut response = agent
            .get(url)
            .call()
            .map_err(|e| DevIdError::network(url, e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| DevIdError::network(url, e.to_string()))?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> DevIdResult<Response> {
        let url = request.url.to_string();
        let agent = self.agent.clone();
        debug!("GET {}", url);

        tokio::task::spawn_blocking(move || Self::get(&agent, &url))
            .await
            .map_err(|e| DevIdError::Internal(format!("fetch task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_exact_url() {
        let request = Request::parse("http://localhost:8080/app.js?v=2").unwrap();
        assert_eq!(request.cache_key(), "http://localhost:8080/app.js?v=2");
    }

    #[test]
    fn relative_url_is_rejected() {
        let err = Request::parse("/app.js").unwrap_err();
        assert!(matches!(err, DevIdError::UrlInvalid { .. }));
    }

    #[test]
    fn response_helpers() {
        let response = Response::new(200, "body").with_header("Content-Type", "text/css");
        assert!(response.is_ok());
        assert_eq!(response.header("content-type"), Some("text/css"));
        assert!(!Response::new(404, "").is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2));
        let request = Request::parse("http://127.0.0.1:9/never").unwrap();

        let err = fetcher.fetch(&request).await.unwrap_err();
        assert!(matches!(err, DevIdError::Network { .. }));
    }
}
