use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unable to connect to URL: {url}")]
    NotFound { url: String },
    #[error("unexpected status code {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid json from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("http client error: {0}")]
    Client(String),
}

/// Where sensors get their raw payloads from.
#[async_trait]
pub trait JsonSource: Send + Sync {
    fn base_url(&self) -> &str;

    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError>;
}

pub fn build_url(base_url: &str, path: &str) -> String {
    format!("{base_url}/{path}")
}

/// Plain GET + JSON decode against the scraper API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Client(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl JsonSource for HttpSource {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = build_url(&self.base_url, path);
        debug!(%url, "fetching");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(source) => {
                error!(%url, error = %source, "error retrieving data from HoneyGain");
                return Err(FetchError::Transport { url, source });
            }
        };

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                warn!(%url, "unable to connect to URL");
                return Err(FetchError::NotFound { url });
            }
            status => {
                warn!(%url, status = status.as_u16(), "unexpected status code");
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => {
                error!(%url, error = %source, "error reading response body");
                return Err(FetchError::Transport { url, source });
            }
        };

        serde_json::from_slice(&body).map_err(|source| {
            error!(%url, error = %source, "response is not valid json");
            FetchError::Decode { url, source }
        })
    }
}
