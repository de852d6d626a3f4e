//! HTTP transport seam for fantasy requests.
#![allow(clippy::future_not_send)]

use std::fmt;

use reqwest::Client;

/// Error produced by a transport that failed to obtain a response.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Status and full body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, decoded as UTF-8.
    pub body: String,
}

impl RawResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Performs GET requests on behalf of the fantasy client.
///
/// Abstracts the HTTP layer for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Fetches `url` and reads the entire body.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained or its body could
    /// not be read as UTF-8. Non-2xx statuses are not errors.
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport that authenticates with a bearer token.
#[derive(Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct HttpTransport {
    client: Client,
    access_token: Option<String>,
}

impl HttpTransport {
    /// Wraps an already configured HTTP client.
    #[must_use]
    pub const fn new(client: Client, access_token: Option<String>) -> Self {
        Self {
            client,
            access_token,
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("client", &self.client)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl LocalTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        tracing::trace!(status, headers = ?response.headers(), "Response headers");
        let bytes = response.bytes().await?;
        let body = String::from_utf8(bytes.to_vec())?;

        Ok(RawResponse { status, body })
    }
}
