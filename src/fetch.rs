//! HTTP transport used by the traversal engine.
//!
//! [`Fetcher`] is the seam for custom transports; [`HttpFetcher`] performs a
//! single reqwest GET per call with no retry or backoff.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::errors::Error;

/// Default request timeout of [`HttpFetcher`].
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Response from an HTTP GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// URL that answered, after redirects.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl FetchResponse {
    /// Whether the status code is a 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A conforming GET client.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` sending `headers` along. Implementations should give up
    /// with [`Error::Cancelled`] once `cancel` fires.
    async fn get(
        &self,
        url: &Url,
        headers: &[(String, String)],
        cancel: &CancellationToken,
    ) -> Result<FetchResponse, Error>;
}

/// [`Fetcher`] backed by a `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests time out after `timeout_ms`.
    pub fn new(timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Wraps an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(
        &self,
        url: &Url,
        headers: &[(String, String)],
        cancel: &CancellationToken,
    ) -> Result<FetchResponse, Error> {
        let cancelled = || Error::Cancelled {
            url: url.to_string(),
        };
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        let mut builder = self.client.get(url.clone());
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = async {
            let response = builder.send().await.map_err(|e| Error::Fetch {
                what: url.to_string(),
                how: e.to_string(),
            })?;
            let status = response.status().as_u16();
            let answered = response.url().to_string();
            let body = response.text().await.map_err(|e| Error::Fetch {
                what: url.to_string(),
                how: e.to_string(),
            })?;
            debug!("GET {url} -> {status}");
            Ok::<_, Error>(FetchResponse {
                url: answered,
                status,
                body,
            })
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(cancelled()),
            response = request => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let mut response = FetchResponse {
            url: "http://localhost/".into(),
            status: 200,
            body: String::new(),
        };
        assert!(response.is_success());
        response.status = 301;
        assert!(!response.is_success());
        response.status = 404;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn cancelled_before_request() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let url = Url::parse("http://127.0.0.1:9/never/").unwrap();
        let err = HttpFetcher::default()
            .get(&url, &[], &cancel)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::Cancelled {
                url: url.to_string()
            }
        );
    }
}
