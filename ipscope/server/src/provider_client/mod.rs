pub mod error;

use std::{error::Error as StdError, time::Duration};

use async_trait::async_trait;
use ipscope_core::{model::GeoResult, PROJECT_NAME, PROJECT_VERSION};
use snafu::ResultExt;

pub use self::error::{Error, Result};

/// A single, never failing request to a geolocation provider.
///
/// Implementations turn every transport, status and decoding problem into a
/// [`GeoResult::Failure`] instead of returning an error.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, url: &str) -> GeoResult;
}

/// [`GeoLookup`] over HTTP with a hard deadline per request.
#[derive(Clone, Debug)]
pub struct HttpGeoClient {
    client: reqwest::Client,
}

impl HttpGeoClient {
    /// Create a client whose requests are aborted after `request_timeout`.
    ///
    /// The deadline covers connecting, sending and reading the whole body.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(format!("{PROJECT_NAME}/{PROJECT_VERSION}"))
            .build()
            .context(error::BuildHttpClientSnafu)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl GeoLookup for HttpGeoClient {
    #[tracing::instrument(skip(self))]
    async fn lookup(&self, url: &str) -> GeoResult {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => return transport_failure(&err),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return transport_failure(&err),
        };

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(payload) if status.is_success() => GeoResult::Success(payload),
            Ok(payload) => {
                tracing::debug!(status = status.as_u16(), "Provider answered with an error status");
                GeoResult::lookup_failed(status.as_u16(), payload)
            }
            Err(err) => {
                tracing::debug!(status = status.as_u16(), "Provider answered with non-JSON: {err}");
                GeoResult::non_json(status.as_u16(), body)
            }
        }
    }
}

fn transport_failure(err: &reqwest::Error) -> GeoResult {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        describe_error_chain(err)
    };

    tracing::debug!("Provider request failed: {message}");
    GeoResult::fetch_failed(message)
}

/// `reqwest` keeps the interesting part (DNS, refused connection) in the
/// source chain, not in its own message.
fn describe_error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
