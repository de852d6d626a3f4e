//! Error types for the fantasy API client.

use thiserror::Error;

use crate::fantasy::Resource;
use crate::fantasy::TransportError;

/// Result alias used throughout the fantasy API.
pub type Result<T> = std::result::Result<T, FantasyError>;

/// Errors returned by fetch operations and client construction.
#[derive(Debug, Error)]
pub enum FantasyError {
    /// The request never produced a response (connection refused, timeout,
    /// body read failure). The transport's error is kept as the source.
    #[error("{resource} request failed: {source}")]
    Transport {
        /// Resource being requested.
        resource: Resource,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },

    /// The response body could not be decoded into the requested collection.
    #[error("{resource} XML decoding failed: {source}")]
    Decode {
        /// Resource being decoded.
        resource: Resource,
        /// Underlying decode error.
        #[source]
        source: DecodeError,
    },

    /// The service answered with an error document instead of content.
    #[error("{resource} request rejected (HTTP {status}): {description}")]
    Fault {
        /// Resource being requested.
        resource: Resource,
        /// HTTP status code of the response.
        status: u16,
        /// Description reported by the service.
        description: String,
    },

    /// A single-result lookup returned zero or several records.
    #[error("expected exactly one active user, got {count}")]
    ActiveUser {
        /// Number of users actually returned.
        count: usize,
    },

    /// The configured base URL is not a valid absolute URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// `user_agent` was not supplied to the client builder.
    #[error("user_agent is required")]
    MissingUserAgent,

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Reasons a response body fails to decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A record failed to deserialize, including scalar codec failures.
    #[error(transparent)]
    Deserialize(#[from] quick_xml::de::DeError),

    /// The body contains no XML element at all.
    #[error("no root element found")]
    MissingRoot,

    /// The root element is neither `fantasy_content` nor an error document.
    #[error("unexpected root element <{found}>, expected <fantasy_content>")]
    UnexpectedRoot {
        /// Local name of the root element found.
        found: String,
    },

    /// The first node of the extraction path is absent.
    #[error("missing <{node}> node (expected path {path})")]
    MissingNode {
        /// Name of the missing node.
        node: &'static str,
        /// Full extraction path that was expected.
        path: String,
    },
}

/// Failures of the non-standard scalar encodings used by the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalarError {
    /// Integer-as-boolean flag that is neither `0` nor `1`.
    #[error("invalid integer-as-boolean value {raw:?} (0 = false, 1 = true)")]
    BoolFlag {
        /// Raw text of the element.
        raw: String,
    },

    /// Calendar date that does not match the expected pattern.
    #[error("invalid calendar date {raw:?}, expected {expected}")]
    CalendarDate {
        /// Raw text of the element.
        raw: String,
        /// Expected pattern.
        expected: &'static str,
    },
}

/// Errors raised by the OAuth2 helpers.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One of the endpoint or redirect URLs failed to parse.
    #[error("invalid {name} URL: {source}")]
    InvalidUrl {
        /// Which URL was invalid.
        name: &'static str,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client for the token endpoint could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The token endpoint request failed or returned an error response.
    #[error("token request failed: {0}")]
    TokenRequest(#[source] Box<dyn std::error::Error + Send + Sync>),
}
