//! Config directory resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Token store file name inside the config directory.
const TOKEN_FILE: &str = "token.toml";

/// Resolves the config directory.
///
/// - If `dir` is `Some`, returns it unchanged.
/// - Otherwise returns `~/.config/yfantasy`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
fn resolve_config_dir(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.clone());
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home).join(".config").join("yfantasy"))
}

/// Resolves the config file path (`{dir}/config.toml`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_config_dir(dir).map(|d| d.join(CONFIG_FILE))
}

/// Resolves the token store path (`{dir}/token.toml`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_token_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_config_dir(dir).map(|d| d.join(TOKEN_FILE))
}
