//! Yahoo Fantasy Sports API client library.
//!
//! Provides OAuth2 helpers, composable query paths for users, games and
//! leagues, and decoding of the XML responses into typed records.

/// OAuth2 configuration and authorization-code flow helpers.
pub mod auth;

/// Error types.
pub mod error;

/// Fantasy Sports v2 API: query paths, records and fetch operations.
pub mod fantasy;

pub use error::{AuthError, DecodeError, FantasyError, Result, ScalarError};
