//! Application configuration module.
//!
//! Manages the TOML config file (application credentials, API settings)
//! and the token store written by the `auth` subcommands.

#[allow(clippy::module_inception)]
mod config;
mod paths;
mod token;

#[allow(clippy::module_name_repetitions)]
pub use config::AppConfig;
pub use paths::{resolve_config_path, resolve_token_path};
pub use token::StoredToken;
