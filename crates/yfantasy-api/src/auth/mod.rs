//! OAuth2 authorization-code flow against the Yahoo login service.
//!
//! Only the pieces needed to obtain and refresh an access token are
//! provided; the token itself is attached to API requests by
//! [`crate::fantasy::FantasyClient`].

mod oauth;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use oauth::{Authenticator, Token};

/// Authorization endpoint.
pub const AUTH_URL: &str = "https://api.login.yahoo.com/oauth2/request_auth";

/// Token endpoint.
pub const TOKEN_URL: &str = "https://api.login.yahoo.com/oauth2/get_token";

/// Redirect value for installed applications without a callback URL.
pub const OUT_OF_BAND_REDIRECT: &str = "oob";

/// Registered application credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct AuthConfig {
    /// Consumer key.
    pub client_id: String,
    /// Consumer secret.
    pub client_secret: String,
    /// Callback URL. `None` selects out-of-band mode, where the user copies
    /// the verification code manually.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}
