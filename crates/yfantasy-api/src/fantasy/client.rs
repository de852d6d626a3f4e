//! `FantasyClient` - fetch operations over the fantasy v2 API.
#![allow(clippy::future_not_send)]

use std::time::Duration;

use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::envelope::{self, Parsed};
use super::query::{GameQuery, LeagueQuery, Query, Resource, UserQuery};
use super::transport::{HttpTransport, LocalTransport};
use super::types::{Game, League, User};
use crate::error::{FantasyError, Result};

/// Default base URL of the fantasy v2 API.
pub const DEFAULT_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2/";

/// Number of body bytes included in trace previews.
const BODY_PREVIEW_LEN: usize = 500;

/// Fantasy Sports API client.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FantasyClient<T = HttpTransport> {
    /// Transport performing the GET requests.
    transport: T,
    /// Base URL, always ending with `/`.
    base_url: Url,
}

/// Builder for `FantasyClient`.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct FantasyClientBuilder {
    base_url: Option<Url>,
    access_token: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl FantasyClientBuilder {
    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the OAuth2 access token sent as a bearer token.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the overall request timeout (default: none).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<FantasyClient> {
        let user_agent = self.user_agent.ok_or(FantasyError::MissingUserAgent)?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let mut builder = Client::builder().user_agent(user_agent).gzip(true);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(FantasyError::Build)?;

        Ok(FantasyClient::with_transport(
            HttpTransport::new(http_client, self.access_token),
            base_url,
        ))
    }
}

impl FantasyClient {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> FantasyClientBuilder {
        FantasyClientBuilder::default()
    }
}

impl<T: LocalTransport> FantasyClient<T> {
    /// Creates a client that sends requests through `transport`.
    ///
    /// A trailing `/` is appended to `base_url` when missing.
    #[must_use]
    pub fn with_transport(transport: T, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            transport,
            base_url,
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Runs `query` and decodes the returned collection.
    ///
    /// Non-2xx responses are logged and their body is still decoded, so a
    /// service error document surfaces as [`FantasyError::Fault`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service returns an error
    /// document, or the body cannot be decoded.
    #[instrument(skip_all, fields(resource = %Q::RESOURCE))]
    pub async fn get<Q: Query>(&self, query: &Q) -> Result<Vec<Q::Item>> {
        let resource = Q::RESOURCE;
        let url = query.url(self.base_url.as_str());
        tracing::debug!(%url, shape = ?query.shape(), "Sending request");

        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|source| FantasyError::Transport { resource, source })?;

        tracing::debug!(
            status = response.status,
            body_len = response.body.len(),
            "Response body received"
        );
        tracing::trace!(
            body_preview = response
                .body
                .get(..response.body.floor_char_boundary(BODY_PREVIEW_LEN))
                .unwrap_or_default(),
            "Response body preview"
        );
        if !response.is_success() {
            warn_on_error_status(resource, response.status);
        }

        match envelope::parse::<Q::Item>(&response.body, query.shape()) {
            Ok(Parsed::Records(items)) => {
                tracing::debug!(count = items.len(), "Decoded records");
                Ok(items)
            }
            Ok(Parsed::Fault { description }) => Err(FantasyError::Fault {
                resource,
                status: response.status,
                description,
            }),
            Err(source) => Err(FantasyError::Decode { resource, source }),
        }
    }

    /// Fetches the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not
    /// contain exactly one user.
    #[instrument(skip_all)]
    pub async fn active_user(&self) -> Result<User> {
        let mut users = self.get(&UserQuery::active()).await?;
        if users.len() != 1 {
            return Err(FantasyError::ActiveUser { count: users.len() });
        }
        users.pop().ok_or(FantasyError::ActiveUser { count: 0 })
    }

    /// Fetches the authenticated user's games, optionally only those open
    /// for registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    pub async fn games_for_active_user(&self, available: bool) -> Result<Vec<Game>> {
        let query = GameQuery {
            user: None,
            available,
        }
        .for_active_user();
        self.get(&query).await
    }

    /// Fetches the authenticated user's leagues across all of their games.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    pub async fn leagues_for_active_user(&self) -> Result<Vec<League>> {
        self.get(&LeagueQuery::default().for_user(UserQuery::active()))
            .await
    }
}

/// Logs a non-2xx response before its body is decoded.
fn warn_on_error_status(resource: Resource, status: u16) {
    tracing::warn!(%resource, status, "Non-success HTTP status, decoding body anyway");
}
