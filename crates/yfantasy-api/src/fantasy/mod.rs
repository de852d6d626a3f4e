//! Fantasy Sports v2 API client module.
//!
//! Composes request paths for users, games and leagues, fetches them over
//! HTTP and decodes the `fantasy_content` XML envelope into typed records.

mod client;
pub mod codec;
pub mod envelope;
mod query;
mod transport;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, FantasyClient, FantasyClientBuilder};
pub use envelope::{Extract, Parsed, extraction_path};
pub use query::{
    GameFilter, GameQuery, LeagueQuery, Query, Resource, Shape, UserFilter, UserQuery,
};
pub use transport::{HttpTransport, LocalTransport, RawResponse, Transport, TransportError};
pub use types::{Game, League, Manager, User};
