//! `Authenticator` - authorization URL, code exchange and token refresh.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use oauth2::basic::BasicClient;
use oauth2::{
    AsyncHttpClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, HttpClientError, HttpResponse, RedirectUrl, RefreshToken, TokenResponse, TokenUrl,
};
use tracing::instrument;
use url::Url;

use super::{AUTH_URL, AuthConfig, OUT_OF_BAND_REDIRECT, TOKEN_URL};
use crate::error::AuthError;

/// oauth2 client with the authorization and token endpoints configured.
type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Bridges reqwest 0.13 to oauth2's `AsyncHttpClient`.
///
/// oauth2 5.0 ships an integration for reqwest 0.12 only.
#[derive(Debug, Clone)]
struct OAuth2HttpClient(reqwest::Client);

impl<'c> AsyncHttpClient<'c> for OAuth2HttpClient {
    type Error = HttpClientError<reqwest::Error>;
    type Future =
        Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + Send + Sync + 'c>>;

    fn call(&'c self, request: oauth2::HttpRequest) -> Self::Future {
        Box::pin(async move {
            let method = request.method().clone();
            let url = request.uri().to_string();

            let mut req_builder = self.0.request(method, &url);
            for (name, value) in request.headers() {
                req_builder = req_builder.header(name, value);
            }
            req_builder = req_builder.body(request.into_body());

            let response = req_builder.send().await.map_err(Box::new)?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(Box::new)?.to_vec();

            let mut builder = oauth2::http::Response::builder().status(status);
            for (name, value) in &headers {
                builder = builder.header(name, value);
            }

            builder.body(body).map_err(HttpClientError::Http)
        })
    }
}

/// Tokens returned by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    /// Bearer token for API requests.
    pub access_token: String,
    /// Long-lived token used to obtain a new access token.
    pub refresh_token: Option<String>,
    /// Lifetime of the access token.
    pub expires_in: Option<Duration>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl<T: TokenResponse> From<&T> for Token {
    fn from(response: &T) -> Self {
        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            expires_in: response.expires_in(),
        }
    }
}

/// Runs the authorization-code flow for one registered application.
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: ConfiguredClient,
    http_client: OAuth2HttpClient,
    out_of_band: bool,
}

impl Authenticator {
    /// Creates an authenticator for the Yahoo login endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::with_endpoints(config, AUTH_URL, TOKEN_URL)
    }

    /// Replaces the token endpoint (for wiremock in tests).
    ///
    /// # Errors
    ///
    /// Returns an error if `token_url` is not a valid URL.
    pub fn with_token_url(mut self, token_url: &str) -> Result<Self, AuthError> {
        self.client = self.client.set_token_uri(parse_token_url(token_url)?);
        Ok(self)
    }

    fn with_endpoints(
        config: &AuthConfig,
        auth_url: &str,
        token_url: &str,
    ) -> Result<Self, AuthError> {
        let auth_url =
            AuthUrl::new(String::from(auth_url)).map_err(|source| AuthError::InvalidUrl {
                name: "authorization",
                source,
            })?;

        let mut client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(parse_token_url(token_url)?);

        let out_of_band = match config.redirect_url.as_deref() {
            None | Some(OUT_OF_BAND_REDIRECT) => true,
            Some(redirect) => {
                let redirect = RedirectUrl::new(String::from(redirect)).map_err(|source| {
                    AuthError::InvalidUrl {
                        name: "redirect",
                        source,
                    }
                })?;
                client = client.set_redirect_uri(redirect);
                false
            }
        };

        // Token endpoints must not follow redirects.
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(AuthError::Build)?;

        Ok(Self {
            client,
            http_client: OAuth2HttpClient(http_client),
            out_of_band,
        })
    }

    /// Builds the URL the user visits to grant access, with a random state.
    #[must_use]
    pub fn authorize_url(&self) -> (Url, CsrfToken) {
        let request = self.client.authorize_url(CsrfToken::new_random);
        if self.out_of_band {
            request
                .add_extra_param("redirect_uri", OUT_OF_BAND_REDIRECT)
                .url()
        } else {
            request.url()
        }
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the token request fails or is rejected.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        let request = self
            .client
            .exchange_code(AuthorizationCode::new(String::from(code)));
        let request = if self.out_of_band {
            request.add_extra_param("redirect_uri", OUT_OF_BAND_REDIRECT)
        } else {
            request
        };

        let response = request
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::TokenRequest(Box::new(e)))?;
        tracing::debug!(
            expires_in = ?response.expires_in(),
            has_refresh_token = response.refresh_token().is_some(),
            "Authorization code exchanged"
        );
        Ok(Token::from(&response))
    }

    /// Obtains a new access token from a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token request fails or is rejected.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, AuthError> {
        let refresh_token = RefreshToken::new(String::from(refresh_token));
        let response = self
            .client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::TokenRequest(Box::new(e)))?;
        tracing::debug!(expires_in = ?response.expires_in(), "Access token refreshed");

        let mut token = Token::from(&response);
        // The service may omit the refresh token when it is unchanged.
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.secret().clone());
        }
        Ok(token)
    }
}

fn parse_token_url(token_url: &str) -> Result<TokenUrl, AuthError> {
    TokenUrl::new(String::from(token_url)).map_err(|source| AuthError::InvalidUrl {
        name: "token",
        source,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(redirect_url: Option<&str>) -> AuthConfig {
        AuthConfig {
            client_id: String::from("my-client-id"),
            client_secret: String::from("my-client-secret"),
            redirect_url: redirect_url.map(String::from),
        }
    }

    fn query_pairs(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_authorize_url_out_of_band() {
        // Arrange
        let auth = Authenticator::new(&config(None)).unwrap();

        // Act
        let (url, state) = auth.authorize_url();

        // Assert
        assert!(url.as_str().starts_with(AUTH_URL));
        let pairs = query_pairs(&url);
        assert_eq!(pairs["client_id"], "my-client-id");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["redirect_uri"], "oob");
        assert_eq!(&pairs["state"], state.secret());
    }

    #[test]
    fn test_authorize_url_with_redirect() {
        // Arrange
        let auth = Authenticator::new(&config(Some("https://example.com/callback"))).unwrap();

        // Act
        let (url, _) = auth.authorize_url();

        // Assert
        let pairs = query_pairs(&url);
        assert_eq!(pairs["redirect_uri"], "https://example.com/callback");
    }

    #[test]
    fn test_authorize_url_state_is_random() {
        // Arrange
        let auth = Authenticator::new(&config(None)).unwrap();

        // Act
        let (_, first) = auth.authorize_url();
        let (_, second) = auth.authorize_url();

        // Assert
        assert_ne!(first.secret(), second.secret());
    }

    #[test]
    fn test_invalid_redirect_url() {
        // Arrange & Act
        let err = Authenticator::new(&config(Some("not a url"))).unwrap_err();

        // Assert
        assert!(
            matches!(err, AuthError::InvalidUrl { name: "redirect", .. }),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_exchange_code() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/get_token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=verifier123"))
            .and(body_string_contains("redirect_uri=oob"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"access_token":"access-abc","token_type":"bearer","expires_in":3600,"refresh_token":"refresh-xyz","xoauth_yahoo_guid":"JT4FACLQZI2OCE"}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;
        let auth = Authenticator::new(&config(None))
            .unwrap()
            .with_token_url(&format!("{}/oauth2/get_token", server.uri()))
            .unwrap();

        // Act
        let token = auth.exchange_code("verifier123").await.unwrap();

        // Assert
        assert_eq!(token.access_token, "access-abc");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh-xyz"));
        assert_eq!(token.expires_in, Some(Duration::from_secs(3600)));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/get_token"))
            .respond_with(ResponseTemplate::new(400).set_body_raw(
                r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;
        let auth = Authenticator::new(&config(None))
            .unwrap()
            .with_token_url(&format!("{}/oauth2/get_token", server.uri()))
            .unwrap();

        // Act
        let err = auth.exchange_code("stale").await.unwrap_err();

        // Assert
        assert!(matches!(err, AuthError::TokenRequest(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token_when_omitted() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/get_token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"access_token":"access-new","token_type":"bearer","expires_in":3600}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;
        let auth = Authenticator::new(&config(None))
            .unwrap()
            .with_token_url(&format!("{}/oauth2/get_token", server.uri()))
            .unwrap();

        // Act
        let token = auth.refresh("refresh-xyz").await.unwrap();

        // Assert
        assert_eq!(token.access_token, "access-new");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh-xyz"));
    }
}
