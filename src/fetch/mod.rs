use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Errors raised while talking to an upstream HTTP service
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The upstream answered with a non-success status
    #[error("{status} for url: {url}")]
    Status { status: StatusCode, url: String },

    /// Connection, timeout or body decoding failure
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

impl FetchError {
    /// The HTTP status code, when the upstream produced one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Network(e) => e.status(),
        }
    }
}

/// Thin wrapper around a shared `reqwest` client with a bounded default timeout
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// GET a JSON document and decode it
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, url)?;
        Ok(response.json::<T>().await?)
    }

    /// GET a text document, overriding the client timeout when `timeout` is set
    pub async fn get_text(&self, url: &str, timeout: Option<Duration>) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let response = Self::check_status(response, url)?;
        Ok(response.text().await?)
    }

    fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            tracing::warn!("{} returned {}", url, status);
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            status: StatusCode::NOT_FOUND,
            url: "https://example.com/x".to_string(),
        };

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "404 Not Found for url: https://example.com/x");
    }
}
