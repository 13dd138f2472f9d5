//! moviedb - TMDB v2.1 movie and person lookup CLI.

/// Application configuration (TOML).
mod config;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{API_KEY_ENV, AppConfig, resolve_config_path};
use moviedb_api::tmdb::{
    BrowseParams, LocalMovieDbApi, MovieDbClient, MovieRecord, PersonRecord, find_movie,
};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Response language (default: `api.language` from config).
    #[arg(long, global = true)]
    language: Option<String>,

    /// Emit records as JSON instead of tab-separated lines.
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Query movies.
    Movie(MovieCommand),
    /// Query people.
    Person(PersonCommand),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `movie` subcommand.
#[derive(clap::Args)]
struct MovieCommand {
    /// Movie subcommand to run.
    #[command(subcommand)]
    command: MovieSubcommands,
}

/// Available movie subcommands.
#[derive(Subcommand)]
enum MovieSubcommands {
    /// Search movies by title (`Movie.search`).
    Search(MovieSearchArgs),
    /// Browse movies with sorting and filters (`Movie.browse`).
    Browse(MovieBrowseArgs),
    /// Look up a movie by IMDb ID (`Movie.imdbLookup`).
    Imdb(IdArgs),
    /// Show full movie information (`Movie.getInfo`).
    Info(IdArgs),
    /// List movie artwork (`Movie.getImages`).
    Images(IdArgs),
}

/// Arguments for the `person` subcommand.
#[derive(clap::Args)]
struct PersonCommand {
    /// Person subcommand to run.
    #[command(subcommand)]
    command: PersonSubcommands,
}

/// Available person subcommands.
#[derive(Subcommand)]
enum PersonSubcommands {
    /// Search a person by name (`Person.search`).
    Search(PersonSearchArgs),
    /// Show person information and filmography (`Person.getInfo`).
    Info(IdArgs),
    /// Show person version information (`Person.getVersion`).
    Version(IdArgs),
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
    /// Write a config file with default settings.
    Init(ConfigInitArgs),
}

/// Arguments for the `movie search` subcommand.
#[derive(clap::Args)]
struct MovieSearchArgs {
    /// Title to search for (e.g. "Fight Club").
    #[arg(long, required = true)]
    title: String,
    /// Only show the first exact title match released in this year.
    #[arg(long)]
    year: Option<String>,
}

/// Arguments for the `movie browse` subcommand.
#[derive(clap::Args)]
struct MovieBrowseArgs {
    /// Sort field (e.g. "rating", "release", "title").
    #[arg(long, required = true)]
    order_by: String,
    /// Sort direction.
    #[arg(long, default_value = "desc")]
    order: String,
    /// Optional filter as KEY=VALUE (e.g. "page=2", "year=1999"). Repeatable.
    #[arg(long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,
}

/// Arguments for the `person search` subcommand.
#[derive(clap::Args)]
struct PersonSearchArgs {
    /// Name to search for (e.g. "Brad Pitt").
    #[arg(long, required = true)]
    name: String,
}

/// Arguments for single-ID lookups.
#[derive(clap::Args)]
struct IdArgs {
    /// TMDB ID, or IMDb ID where the method accepts it (e.g. "550", "tt0137523").
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `config init` subcommand.
#[derive(clap::Args)]
struct ConfigInitArgs {
    /// API key to store.
    #[arg(long)]
    key: Option<String>,
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Parses a `KEY=VALUE` pair.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((String::from(key.trim()), String::from(value)))
}

/// Loaded settings shared by every API subcommand.
struct Session {
    client: MovieDbClient,
    language: String,
    json: bool,
}

/// Builds a `MovieDbClient` from the config file and `MOVIEDB_API_KEY`.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, no API key is set, or the
/// client fails to build.
#[instrument(skip_all)]
fn build_session(cli: &Cli) -> Result<Session> {
    let config_path = resolve_config_path(cli.dir.as_ref())?;
    let config = AppConfig::load(&config_path)?;
    tracing::debug!(path = %config_path.display(), "Config loaded");

    let api_key = config.api_key(std::env::var(API_KEY_ENV).ok())?;

    let mut builder = MovieDbClient::builder()
        .api_key(api_key)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .default_language(&config.api.language)
        .connect_timeout(config.timeouts.connect())
        .read_timeout(config.timeouts.read());
    if let Some(base_url) = &config.api.base_url {
        let url = base_url
            .parse()
            .with_context(|| format!("invalid api.base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(proxy.to_settings());
    }
    let client = builder.build().context("failed to build TMDB client")?;

    Ok(Session {
        client,
        language: cli
            .language
            .clone()
            .unwrap_or_else(|| config.api.language.clone()),
        json: cli.json,
    })
}

/// Writes `value` as pretty JSON to stdout.
///
/// Logs go to stderr while `--json` is set, so stdout carries only the
/// document.
fn emit_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    writeln!(std::io::stdout().lock(), "{json}").context("failed to write JSON to stdout")?;
    Ok(())
}

/// Emits a movie list as one line per movie.
fn emit_movies(ctx: &Session, movies: &[&MovieRecord]) -> Result<()> {
    if ctx.json {
        return emit_json(movies);
    }
    tracing::info!("Total results: {}", movies.len());
    tracing::info!("ID\tIMDb\t\tReleased\tRating\tTitle");
    for movie in movies {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            movie.id,
            movie.imdb_id,
            movie.release_date,
            movie.rating,
            movie.title,
        );
    }
    Ok(())
}

/// Emits full movie details.
fn emit_movie(ctx: &Session, movie: &MovieRecord) -> Result<()> {
    if ctx.json {
        return emit_json(movie);
    }
    tracing::info!("ID:         {}", movie.id);
    tracing::info!("Title:      {}", movie.title);
    tracing::info!("IMDb:       {}", movie.imdb_id);
    tracing::info!("Released:   {}", movie.release_date);
    tracing::info!("Runtime:    {}", movie.runtime);
    tracing::info!("Rating:     {}", movie.rating);
    tracing::info!("URL:        {}", movie.url);
    tracing::info!("Homepage:   {}", movie.homepage);
    tracing::info!("Trailer:    {}", movie.trailer);
    tracing::info!(
        "Categories: {}",
        movie
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!(
        "Countries:  {}",
        movie
            .countries
            .iter()
            .map(|c| c.code.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("Overview:   {}", movie.overview);
    if !movie.cast.is_empty() {
        tracing::info!("Job\t\tName\t\t\tCharacter");
        for person in &movie.cast {
            tracing::info!("{}\t{}\t\t{}", person.job, person.name, person.character);
        }
    }
    Ok(())
}

/// Emits a person record.
fn emit_person(ctx: &Session, person: &PersonRecord) -> Result<()> {
    if ctx.json {
        return emit_json(person);
    }
    tracing::info!("ID:           {}", person.id);
    tracing::info!("Name:         {}", person.name);
    tracing::info!("Birthday:     {}", person.birthday);
    tracing::info!("Birthplace:   {}", person.birthplace);
    tracing::info!("Known movies: {}", person.known_movies);
    tracing::info!("Version:      {}", person.version);
    tracing::info!("Modified at:  {}", person.last_modified_at);
    tracing::info!("URL:          {}", person.url);
    if !person.filmography.is_empty() {
        tracing::info!("ID\tJob\t\tCharacter\t\tTitle");
        for film in &person.filmography {
            tracing::info!(
                "{}\t{}\t{}\t\t{}",
                film.id,
                film.job,
                film.character,
                film.name
            );
        }
    }
    Ok(())
}

/// Runs the `movie search` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_movie_search(ctx: &Session, args: &MovieSearchArgs) -> Result<()> {
    let movies = ctx
        .client
        .search_movies(&args.title, &ctx.language)
        .await
        .context("Movie.search request failed")?;

    if let Some(year) = &args.year {
        let Some(movie) = find_movie(&movies, &args.title, Some(year)) else {
            bail!("no movie titled {:?} released in {year}", args.title);
        };
        return emit_movies(ctx, &[movie]);
    }

    emit_movies(ctx, &movies.iter().collect::<Vec<_>>())
}

/// Runs the `movie browse` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_movie_browse(ctx: &Session, args: &MovieBrowseArgs) -> Result<()> {
    let params = args
        .params
        .iter()
        .fold(BrowseParams::new(&args.order_by, &args.order), |p, (k, v)| {
            p.filter(k, v)
        });

    let movies = ctx
        .client
        .browse_movies(&params, &ctx.language)
        .await
        .context("Movie.browse request failed")?;

    emit_movies(ctx, &movies.iter().collect::<Vec<_>>())
}

/// Single-movie lookup methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MovieLookup {
    /// `Movie.imdbLookup`.
    Imdb,
    /// `Movie.getInfo`.
    Info,
    /// `Movie.getImages`.
    Images,
}

impl MovieLookup {
    /// API method name.
    const fn method(self) -> &'static str {
        match self {
            Self::Imdb => "Movie.imdbLookup",
            Self::Info => "Movie.getInfo",
            Self::Images => "Movie.getImages",
        }
    }
}

/// Runs the `movie imdb`, `movie info` and `movie images` subcommands.
///
/// # Errors
///
/// Returns an error if the API request fails or no movie is found.
#[instrument(skip_all, fields(method = lookup.method()))]
async fn run_movie_lookup(ctx: &Session, lookup: MovieLookup, args: &IdArgs) -> Result<()> {
    let method = lookup.method();
    let movie = match lookup {
        MovieLookup::Imdb => ctx.client.imdb_lookup(&args.id, &ctx.language).await,
        MovieLookup::Info => ctx.client.movie_info(&args.id, &ctx.language).await,
        MovieLookup::Images => ctx.client.movie_images(&args.id, &ctx.language).await,
    };
    let movie = movie
        .with_context(|| format!("{method} request failed"))?
        .with_context(|| format!("{method}: movie not found"))?;

    if lookup == MovieLookup::Images && !ctx.json {
        tracing::info!("{} ({})", movie.title, movie.id);
        tracing::info!("Type\t\tSize\t\tID\tURL");
        for art in &movie.artwork {
            tracing::info!(
                "{}\t\t{}\t\t{}\t{}",
                art.artwork_type,
                art.size,
                art.id,
                art.url
            );
        }
        return Ok(());
    }

    emit_movie(ctx, &movie)
}

/// Runs the `person` subcommands.
///
/// # Errors
///
/// Returns an error if the API request fails or no person is found.
#[instrument(skip_all)]
async fn run_person(ctx: &Session, command: &PersonSubcommands) -> Result<()> {
    let (method, person) = match command {
        PersonSubcommands::Search(args) => (
            "Person.search",
            ctx.client.search_person(&args.name, &ctx.language).await,
        ),
        PersonSubcommands::Info(args) => (
            "Person.getInfo",
            ctx.client.person_info(&args.id, &ctx.language).await,
        ),
        PersonSubcommands::Version(args) => (
            "Person.getVersion",
            ctx.client.person_version(&args.id, &ctx.language).await,
        ),
    };
    let person = person
        .with_context(|| format!("{method} request failed"))?
        .with_context(|| format!("{method}: person not found"))?;

    emit_person(ctx, &person)
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file exists (without `--force`) or cannot be written.
fn run_config_init(args: &ConfigInitArgs, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    if path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = AppConfig::default();
    config.api.key.clone_from(&args.key);
    config.save(&path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `--json` keeps stdout for the document.
    let writer = if cli.json {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_writer(writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(writer);

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

    if let Commands::Config(cmd) = &cli.command {
        return match &cmd.command {
            ConfigSubcommands::Init(args) => run_config_init(args, cli.dir.as_ref()),
        };
    }

    let ctx = build_session(&cli)?;
    match &cli.command {
        Commands::Movie(cmd) => match &cmd.command {
            MovieSubcommands::Search(args) => run_movie_search(&ctx, args).await,
            MovieSubcommands::Browse(args) => run_movie_browse(&ctx, args).await,
            MovieSubcommands::Imdb(args) => run_movie_lookup(&ctx, MovieLookup::Imdb, args).await,
            MovieSubcommands::Info(args) => run_movie_lookup(&ctx, MovieLookup::Info, args).await,
            MovieSubcommands::Images(args) => {
                run_movie_lookup(&ctx, MovieLookup::Images, args).await
            }
        },
        Commands::Person(cmd) => run_person(&ctx, &cmd.command).await,
        Commands::Config(_) => Ok(()),
    }
}
