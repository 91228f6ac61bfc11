//! cinedex - TMDB movie and TV listing CLI.

/// Application configuration (TOML).
mod config;
/// Log-based output of API responses.
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};
use cinedex_api::catalog::{
    CatalogService, Endpoint, GenreFilter, ListingQuery, MediaKind, MovieCatalog, TvCatalog,
};
use cinedex_api::gateway::{EnvToken, Gateway};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse movies.
    Movies(MediaCommand),
    /// Browse TV shows.
    Tv(MediaCommand),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `movies` and `tv` subcommands.
#[derive(clap::Args)]
struct MediaCommand {
    /// Media subcommand to run.
    #[command(subcommand)]
    command: MediaSubcommands,
}

/// Available media subcommands.
#[derive(Subcommand)]
enum MediaSubcommands {
    /// List titles, picking search, discover or popular from the given filters.
    List(ListArgs),
    /// List popular titles.
    Popular(CommonArgs),
    /// Search titles by text.
    Search(SearchArgs),
    /// Discover titles by genre and sort order.
    Discover(DiscoverArgs),
    /// Show details for a single title.
    Details(DetailsArgs),
}

/// Options shared by every listing subcommand.
#[derive(clap::Args)]
struct CommonArgs {
    /// Page number.
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Response language (default: config `api.language`).
    #[arg(long)]
    language: Option<String>,
    /// Include adult titles.
    #[arg(long)]
    include_adult: bool,
    /// ISO 3166-1 region, movies only (default: config `api.region`).
    #[arg(long)]
    region: Option<String>,
    /// Retries for transient failures (default: config `retry.count`).
    #[arg(long)]
    retry: Option<u32>,
}

impl Default for CommonArgs {
    fn default() -> Self {
        Self {
            page: 1,
            language: None,
            include_adult: false,
            region: None,
            retry: None,
        }
    }
}

/// Arguments for the `list` subcommand.
#[derive(clap::Args)]
struct ListArgs {
    /// Listing options.
    #[command(flatten)]
    common: CommonArgs,
    /// Search text; selects the search endpoint when non-blank.
    #[arg(long)]
    query: Option<String>,
    /// Genre filter: comma-separated IDs (e.g. "28,12") or a raw TMDB value (e.g. "28|12").
    #[arg(long)]
    genres: Option<String>,
    /// Sort order (e.g. "popularity.desc").
    #[arg(long)]
    sort_by: Option<String>,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Listing options.
    #[command(flatten)]
    common: CommonArgs,
    /// Search text (e.g. "Inception").
    #[arg(long, required = true)]
    query: String,
}

/// Arguments for the `discover` subcommand.
#[derive(clap::Args)]
struct DiscoverArgs {
    /// Listing options.
    #[command(flatten)]
    common: CommonArgs,
    /// Genre filter: comma-separated IDs or a raw TMDB value.
    #[arg(long)]
    genres: Option<String>,
    /// Sort order (e.g. "vote_average.desc").
    #[arg(long)]
    sort_by: Option<String>,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// TMDB ID.
    #[arg(long, required = true)]
    id: u64,
    /// Extra data to append (e.g. "videos,credits").
    #[arg(long)]
    append: Option<String>,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a config file with default values.
    Init(ConfigInitArgs),
    /// Print the effective config.
    Show,
}

/// Arguments for the `config init` subcommand.
#[derive(clap::Args)]
struct ConfigInitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Parses a `--genres` value.
///
/// All-numeric comma lists become IDs; anything else is passed through.
fn parse_genres(raw: &str) -> GenreFilter {
    let ids: Option<Vec<u32>> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect();
    match ids {
        Some(ids) if !ids.is_empty() => GenreFilter::Ids(ids),
        _ => GenreFilter::Raw(String::from(raw.trim())),
    }
}

/// Builds a `ListingQuery` from CLI options and config defaults.
fn listing_query(common: &CommonArgs, config: &AppConfig) -> ListingQuery {
    let mut query = ListingQuery::new()
        .page(common.page)
        .language(
            common
                .language
                .clone()
                .unwrap_or_else(|| config.api.language.clone()),
        )
        .include_adult(common.include_adult)
        .retry(common.retry.unwrap_or(config.retry.count))
        .retry_delay(config.retry.delay());
    if let Some(region) = common.region.as_ref().or(config.api.region.as_ref()) {
        query = query.region(region.clone());
    }
    query
}

/// Applies `--query`, `--genres` and `--sort-by`.
fn with_filters(
    mut query: ListingQuery,
    text: Option<&str>,
    genres: Option<&str>,
    sort_by: Option<&str>,
) -> ListingQuery {
    if let Some(text) = text {
        query = query.query(text);
    }
    if let Some(genres) = genres {
        query.genres = Some(parse_genres(genres));
    }
    if let Some(sort_by) = sort_by {
        query = query.sort_by(sort_by);
    }
    query
}

/// Loads the config from `--dir` or the default location.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(dir)?;
    tracing::debug!(path = %path.display(), "loading config");
    AppConfig::load(&path)
}

/// Builds a `CatalogService` from config.
///
/// The token is read from `api.token_env` on every request.
///
/// # Errors
///
/// Returns an error if the config values are invalid or the gateway fails to build.
#[instrument(skip_all)]
fn build_catalog(config: &AppConfig) -> Result<CatalogService> {
    let token = EnvToken::new(config.api.token_env.as_str());
    if std::env::var_os(token.var()).is_none() {
        tracing::warn!(
            var = token.var(),
            "token variable is not set; requests will be unauthenticated"
        );
    }

    let gateway = Gateway::builder()
        .base_url(config.api.base_url()?)
        .timeout(config.api.timeout()?)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .token_provider(token)
        .build()
        .context("failed to build API gateway")?;

    Ok(CatalogService::new(Arc::new(gateway)))
}

/// Runs a listing subcommand.
///
/// `endpoint` forces a specific endpoint; `None` selects one from `query`.
///
/// # Errors
///
/// Returns an error if the config is invalid or the API request fails.
#[instrument(skip_all, fields(kind = kind.segment()))]
async fn run_listing(
    kind: MediaKind,
    endpoint: Option<Endpoint>,
    query: &ListingQuery,
    config: &AppConfig,
) -> Result<()> {
    let catalog = build_catalog(config)?;

    match kind {
        MediaKind::Movie => {
            let response = match endpoint {
                Some(endpoint) => catalog.movies_at(endpoint, query).await,
                None => catalog.get_movies(query).await,
            }
            .context("movie listing request failed")?;
            report::movie_listing(&response);
        }
        MediaKind::Tv => {
            let response = match endpoint {
                Some(endpoint) => catalog.tv_at(endpoint, query).await,
                None => catalog.get_tv(query).await,
            }
            .context("TV listing request failed")?;
            report::tv_listing(&response);
        }
    }

    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the config is invalid or the API request fails.
#[instrument(skip_all, fields(kind = kind.segment(), id = args.id))]
async fn run_details(kind: MediaKind, args: &DetailsArgs, config: &AppConfig) -> Result<()> {
    let catalog = build_catalog(config)?;
    let append = args.append.as_deref();

    match kind {
        MediaKind::Movie => {
            let details = catalog
                .get_movie(args.id, append)
                .await
                .context("movie details request failed")?;
            report::movie_details(&details);
        }
        MediaKind::Tv => {
            let details = catalog
                .get_tv_show(args.id, append)
                .await
                .context("TV details request failed")?;
            report::tv_details(&details);
        }
    }

    Ok(())
}

/// Dispatches `movies` / `tv` subcommands.
///
/// # Errors
///
/// Returns an error if config loading or the subcommand fails.
async fn run_media(kind: MediaKind, command: MediaSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;

    match command {
        MediaSubcommands::List(args) => {
            let query = with_filters(
                listing_query(&args.common, &config),
                args.query.as_deref(),
                args.genres.as_deref(),
                args.sort_by.as_deref(),
            );
            run_listing(kind, None, &query, &config).await
        }
        MediaSubcommands::Popular(common) => {
            let query = listing_query(&common, &config);
            run_listing(kind, Some(Endpoint::Popular), &query, &config).await
        }
        MediaSubcommands::Search(args) => {
            if args.query.trim().is_empty() {
                bail!("--query must not be blank");
            }
            let query = listing_query(&args.common, &config).query(args.query);
            run_listing(kind, Some(Endpoint::Search), &query, &config).await
        }
        MediaSubcommands::Discover(args) => {
            let query = with_filters(
                listing_query(&args.common, &config),
                None,
                args.genres.as_deref(),
                args.sort_by.as_deref(),
            );
            run_listing(kind, Some(Endpoint::Discover), &query, &config).await
        }
        MediaSubcommands::Details(args) => run_details(kind, &args, &config).await,
    }
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file exists without `--force` or cannot be written.
fn run_config_init(args: &ConfigInitArgs, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    if path.exists() && !args.force {
        bail!(
            "config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    AppConfig::default().save(&path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or rendered.
fn run_config_show(dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    let config = AppConfig::load(&path)?;
    tracing::info!("# {}", path.display());
    tracing::info!("{}", config.to_toml()?);
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
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
    match cli.command {
        Commands::Movies(cmd) => run_media(MediaKind::Movie, cmd.command, cli.dir.as_ref()).await,
        Commands::Tv(cmd) => run_media(MediaKind::Tv, cmd.command, cli.dir.as_ref()).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Init(args) => run_config_init(&args, cli.dir.as_ref()),
            ConfigSubcommands::Show => run_config_show(cli.dir.as_ref()),
        },
    }
}
