//! oEmbed metadata fetching.
//!
//! Providers whose markup comes from a remote oEmbed endpoint (Twitter) go
//! through the [`OembedClient`] trait, so they can be exercised without a
//! network in tests.

use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;

/// oEmbed response fields used by the handlers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OembedResponse {
    /// Embed markup.
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// oEmbed fetch error.
#[derive(Debug, thiserror::Error)]
pub enum OembedError {
    /// Transport failure (DNS, TLS, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(String),
    /// Endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body was not valid oEmbed JSON.
    #[error("invalid oEmbed response: {0}")]
    Decode(String),
}

/// Fetches oEmbed documents.
pub trait OembedClient: Send + Sync {
    /// GET `endpoint` with the given query parameters.
    fn fetch(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<OembedResponse, OembedError>;
}

/// [`OembedClient`] backed by a shared `ureq` agent.
pub struct UreqOembedClient {
    agent: Agent,
}

impl UreqOembedClient {
    /// Create a client whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl OembedClient for UreqOembedClient {
    fn fetch(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<OembedResponse, OembedError> {
        let mut request = self.agent.get(endpoint);
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        let response = request
            .call()
            .map_err(|e| OembedError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(OembedError::Status {
                status,
                body: error_body,
            });
        }

        body.read_json::<OembedResponse>()
            .map_err(|e| OembedError::Decode(e.to_string()))
    }
}
