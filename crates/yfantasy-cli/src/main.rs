//! yfantasy - Yahoo Fantasy Sports command-line client.

/// Application configuration (TOML).
mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, StoredToken, resolve_config_path, resolve_token_path};
use yfantasy_api::auth::Authenticator;
use yfantasy_api::fantasy::{FantasyClient, GameFilter, GameQuery, LeagueQuery, UserQuery};

/// Environment variable that overrides the stored access token.
const ACCESS_TOKEN_ENV: &str = "YFANTASY_ACCESS_TOKEN";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory (default: ~/.config/yfantasy).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Obtain and refresh OAuth2 tokens.
    Auth(AuthCommand),
    /// Show the authenticated user.
    User,
    /// List games.
    Games(GamesArgs),
    /// List leagues.
    Leagues(LeaguesArgs),
}

/// Arguments for the `auth` subcommand.
#[derive(clap::Args)]
struct AuthCommand {
    /// Auth subcommand to run.
    #[command(subcommand)]
    command: AuthSubcommands,
}

/// Available auth subcommands.
#[derive(Subcommand)]
enum AuthSubcommands {
    /// Print the URL to visit to grant access.
    Url,
    /// Exchange the verification code for tokens and store them.
    Exchange(ExchangeArgs),
    /// Refresh the stored access token.
    Refresh,
}

/// Arguments for the `auth exchange` subcommand.
#[derive(clap::Args)]
struct ExchangeArgs {
    /// Verification code shown after granting access.
    #[arg(long, required = true)]
    code: String,
}

/// Arguments for the `games` subcommand.
#[derive(clap::Args)]
struct GamesArgs {
    /// Only games the authenticated user plays.
    #[arg(long)]
    mine: bool,

    /// Only games open for registration.
    #[arg(long)]
    available: bool,
}

/// Arguments for the `leagues` subcommand.
#[derive(clap::Args)]
struct LeaguesArgs {
    /// Leagues of the authenticated user.
    #[arg(long)]
    mine: bool,

    /// Only leagues in games open for registration (requires --mine).
    #[arg(long, requires = "mine")]
    available: bool,

    /// Comma-separated league keys (e.g. "357.l.86753,357.l.37903").
    #[arg(long, value_delimiter = ',')]
    keys: Vec<String>,
}

/// Builds an authenticator from the `[auth]` config section.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or lacks credentials.
fn build_authenticator(dir: Option<&PathBuf>) -> Result<Authenticator> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;

    if config.auth.client_id.is_empty() || config.auth.client_secret.is_empty() {
        bail!(
            "auth.client_id and auth.client_secret must be set in {}",
            config_path.display()
        );
    }

    Authenticator::new(&config.auth).context("failed to configure OAuth2 client")
}

/// Runs the `auth url` subcommand.
///
/// # Errors
///
/// Returns an error if the authenticator cannot be built.
#[instrument(skip_all)]
fn run_auth_url(dir: Option<&PathBuf>) -> Result<()> {
    let auth = build_authenticator(dir)?;
    let (url, _state) = auth.authorize_url();

    tracing::info!("Open this URL, grant access, then run `auth exchange --code <code>`:");
    tracing::info!("{url}");

    Ok(())
}

/// Runs the `auth exchange` subcommand.
///
/// # Errors
///
/// Returns an error if the exchange fails or the token cannot be saved.
#[instrument(skip_all)]
async fn run_auth_exchange(args: &ExchangeArgs, dir: Option<&PathBuf>) -> Result<()> {
    let auth = build_authenticator(dir)?;
    let token = auth
        .exchange_code(&args.code)
        .await
        .context("authorization code exchange failed")?;

    let token_path = resolve_token_path(dir).context("failed to resolve token path")?;
    StoredToken::issued(&token, Utc::now()).save(&token_path)?;

    tracing::info!("Token saved to {}", token_path.display());
    Ok(())
}

/// Runs the `auth refresh` subcommand.
///
/// # Errors
///
/// Returns an error if no refresh token is stored or the refresh fails.
#[instrument(skip_all)]
async fn run_auth_refresh(dir: Option<&PathBuf>) -> Result<()> {
    let token_path = resolve_token_path(dir).context("failed to resolve token path")?;
    let stored = StoredToken::load(&token_path)?
        .with_context(|| format!("no token stored at {}", token_path.display()))?;

    let refreshed = refresh_stored(&stored, dir, &token_path).await?;
    match refreshed.expires_at {
        Some(at) => tracing::info!("Token refreshed, expires at {at}"),
        None => tracing::info!("Token refreshed"),
    }
    Ok(())
}

/// Refreshes `stored` and writes the result to `token_path`.
///
/// # Errors
///
/// Returns an error if `stored` has no refresh token or the refresh fails.
async fn refresh_stored(
    stored: &StoredToken,
    dir: Option<&PathBuf>,
    token_path: &Path,
) -> Result<StoredToken> {
    let refresh_token = stored
        .refresh_token
        .as_deref()
        .context("stored token has no refresh token; run `auth exchange` again")?;

    let auth = build_authenticator(dir)?;
    let token = auth
        .refresh(refresh_token)
        .await
        .context("token refresh failed")?;

    let refreshed = StoredToken::issued(&token, Utc::now());
    refreshed.save(token_path)?;
    Ok(refreshed)
}

/// Resolves the access token from the environment or the token store,
/// refreshing an expired stored token.
///
/// # Errors
///
/// Returns an error if no token is available or refreshing fails.
async fn resolve_access_token(dir: Option<&PathBuf>) -> Result<String> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
        && !token.is_empty()
    {
        return Ok(token);
    }

    let token_path = resolve_token_path(dir).context("failed to resolve token path")?;
    let Some(stored) = StoredToken::load(&token_path)? else {
        bail!(
            "no access token available: set {ACCESS_TOKEN_ENV} or run `auth url` then `auth exchange --code <code>`"
        );
    };

    if stored.is_expired(Utc::now()) {
        tracing::debug!("Stored access token expired, refreshing");
        let refreshed = refresh_stored(&stored, dir, &token_path).await?;
        return Ok(refreshed.access_token);
    }

    Ok(stored.access_token)
}

/// Builds the API client from config and the resolved access token.
///
/// # Errors
///
/// Returns an error if config loading, token resolution or client build fails.
#[instrument(skip_all)]
async fn build_fantasy_client(dir: Option<&PathBuf>) -> Result<FantasyClient> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let access_token = resolve_access_token(dir).await?;

    let mut builder = FantasyClient::builder()
        .access_token(access_token)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
    if let Some(base_url) = config.api.base_url()? {
        builder = builder.base_url(base_url);
    }
    if let Some(timeout) = config.api.timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build().context("failed to build fantasy client")
}

/// Runs the `user` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_user(dir: Option<&PathBuf>) -> Result<()> {
    let client = build_fantasy_client(dir).await?;
    let user = client
        .active_user()
        .await
        .context("active user request failed")?;

    tracing::info!("GUID: {}", user.guid);
    Ok(())
}

/// Runs the `games` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_games(args: &GamesArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_fantasy_client(dir).await?;

    let mut query = GameQuery {
        user: None,
        available: args.available,
    };
    if args.mine {
        query = query.for_active_user();
    }
    let games = client.get(&query).await.context("games request failed")?;

    tracing::info!("Games ({}):", games.len());
    tracing::info!("Key\tCode\tSeason\tRegClosed\tName");
    for game in &games {
        tracing::info!(
            "{}\t{}\t{}\t{}\t\t{}",
            game.key,
            game.code,
            game.season,
            game.registration_closed,
            game.name,
        );
    }

    Ok(())
}

/// Runs the `leagues` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_leagues(args: &LeaguesArgs, dir: Option<&PathBuf>) -> Result<()> {
    if !args.mine && args.keys.is_empty() {
        bail!("either --mine or --keys must be specified");
    }
    let client = build_fantasy_client(dir).await?;

    let mut query = LeagueQuery::with_keys(args.keys.iter().cloned());
    if args.mine {
        let mut user = UserQuery::active();
        if args.available {
            user = user.with_games(GameFilter::available());
        }
        query = query.for_user(user);
    }
    let leagues = client.get(&query).await.context("leagues request failed")?;

    tracing::info!("Leagues ({}):", leagues.len());
    tracing::info!("Key\t\tTeams\tScoring\tStart\t\tEnd\t\tName");
    for league in &leagues {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            league.key,
            league.num_teams,
            league.scoring_type,
            league.start_date,
            league.end_date,
            league.name,
        );
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Auth(auth) => match auth.command {
            AuthSubcommands::Url => run_auth_url(dir),
            AuthSubcommands::Exchange(args) => run_auth_exchange(&args, dir).await,
            AuthSubcommands::Refresh => run_auth_refresh(dir).await,
        },
        Commands::User => run_user(dir).await,
        Commands::Games(args) => run_games(&args, dir).await,
        Commands::Leagues(args) => run_leagues(&args, dir).await,
    }
}
