//! Persisted OAuth2 tokens.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use yfantasy_api::auth::Token;

/// Seconds before the recorded expiry at which a token counts as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token store contents (`token.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    /// Bearer token for API requests.
    pub access_token: String,
    /// Token used to obtain a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Records a freshly issued token, computing its expiry from `now`.
    #[must_use]
    pub fn issued(token: &Token, now: DateTime<Utc>) -> Self {
        let expires_at = token
            .expires_in
            .and_then(|d| TimeDelta::from_std(d).ok())
            .and_then(|d| now.checked_add_signed(d));
        Self {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at,
        }
    }

    /// Whether the access token has expired (or is about to) at `now`.
    ///
    /// Tokens without a recorded expiry never expire.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| {
            now.checked_add_signed(TimeDelta::seconds(EXPIRY_MARGIN_SECS))
                .is_none_or(|deadline| deadline >= at)
        })
    }

    /// Loads the token store. Returns `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content)
            .map(Some)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves the token store, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize token to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 3, 4, 12, 0, 0).unwrap()
    }

    fn token(expires_in: Option<Duration>) -> Token {
        Token {
            access_token: String::from("access"),
            refresh_token: Some(String::from("refresh")),
            expires_in,
        }
    }

    #[test]
    fn test_issued_computes_expiry() {
        // Arrange & Act
        let stored = StoredToken::issued(&token(Some(Duration::from_secs(3600))), now());

        // Assert
        assert_eq!(
            stored.expires_at,
            Some(Utc.with_ymd_and_hms(2016, 3, 4, 13, 0, 0).unwrap())
        );
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn test_is_expired() {
        // Arrange
        let stored = StoredToken::issued(&token(Some(Duration::from_secs(3600))), now());

        // Act & Assert
        assert!(!stored.is_expired(now()));
        assert!(!stored.is_expired(now() + TimeDelta::minutes(58)));
        assert!(stored.is_expired(now() + TimeDelta::minutes(59)));
        assert!(stored.is_expired(now() + TimeDelta::hours(2)));
    }

    #[test]
    fn test_without_expiry_never_expires() {
        // Arrange
        let stored = StoredToken::issued(&token(None), now());

        // Act & Assert
        assert_eq!(stored.expires_at, None);
        assert!(!stored.is_expired(now() + TimeDelta::days(365)));
    }

    #[test]
    fn test_save_and_load() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.toml");
        let stored = StoredToken::issued(&token(Some(Duration::from_secs(3600))), now());

        // Act
        stored.save(&path).unwrap();
        let loaded = StoredToken::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, Some(stored));
    }

    #[test]
    fn test_load_missing_returns_none() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();

        // Act
        let loaded = StoredToken::load(&dir.path().join("token.toml")).unwrap();

        // Assert
        assert_eq!(loaded, None);
    }
}
