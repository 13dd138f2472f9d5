//! `MovieDbClient` - TMDB v2.1 XML API client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, Proxy};
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalMovieDbApi;
use super::mapper::{
    find_movie_element, find_person_element, movie_from_element, parse_movies,
    person_from_element, person_version_from_element,
};
use super::rate_limiter::MovieDbRateLimiter;
use super::request::{
    BrowseParams, Operation, build_url, encode_search_term, is_valid_argument, redact_api_key,
};
use super::types::{MovieRecord, PersonRecord};
use super::xml::{Element, XmlDocument};

/// Default base URL for the TMDB v2.1 API.
const DEFAULT_BASE_URL: &str = "http://api.themoviedb.org/2.1/";

/// Language used when none is configured, and for the `Movie.getInfo`
/// fallback.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default connect timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(25);

/// Default read timeout.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(90);

/// Length of the response preview included in decode errors.
const BODY_PREVIEW_CHARS: usize = 300;

/// Upstream HTTP proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy host name or address.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Username for basic auth.
    pub username: Option<String>,
    /// Password for basic auth.
    pub password: Option<String>,
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ProxySettings {
    /// Creates proxy settings without credentials.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Builds the `reqwest` proxy.
    fn to_proxy(&self) -> Result<Proxy> {
        let proxy_url = format!("http://{}:{}", self.host, self.port);
        let proxy =
            Proxy::all(&proxy_url).with_context(|| format!("invalid proxy address: {proxy_url}"))?;
        Ok(match (&self.username, &self.password) {
            (Some(username), password) => {
                proxy.basic_auth(username, password.as_deref().unwrap_or_default())
            }
            (None, _) => proxy,
        })
    }
}

/// TMDB v2.1 API client.
///
/// Configuration is fixed at build time; independent clients may run
/// side by side.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieDbClient {
    /// HTTP client (reqwest, gzip enabled).
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key embedded in every request path.
    api_key: String,
    /// Fallback language for `Movie.getInfo`.
    default_language: String,
    /// Rate limiter.
    rate_limiter: Arc<Mutex<MovieDbRateLimiter>>,
}

/// Builder for `MovieDbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieDbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    default_language: Option<String>,
    proxy: Option<ProxySettings>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    min_interval: Option<Duration>,
}

impl MovieDbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            default_language: None,
            proxy: None,
            connect_timeout: None,
            read_timeout: None,
            min_interval: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the fallback language (default: `en-US`).
    #[must_use]
    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    /// Routes all requests through an HTTP proxy.
    #[must_use]
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the connect timeout (default: 25s).
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the read timeout (default: 90s).
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Sets the minimum request interval (default: 250ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or blank.
    /// - `user_agent` is not set.
    /// - The proxy address is invalid.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<MovieDbClient> {
        let api_key = self.api_key.context("api_key is required")?;
        if api_key.trim().is_empty() {
            bail!("api_key must not be blank");
        }
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).context("invalid default base URL")?,
        };

        let rate_limiter = self
            .min_interval
            .map_or_else(MovieDbRateLimiter::default_interval, MovieDbRateLimiter::new);

        let mut http_builder = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
            .read_timeout(self.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT));
        if let Some(proxy) = &self.proxy {
            tracing::debug!(host = %proxy.host, port = proxy.port, "Using HTTP proxy");
            http_builder = http_builder.proxy(proxy.to_proxy()?);
        }
        let http_client = http_builder
            .build()
            .context("failed to build HTTP client")?;

        Ok(MovieDbClient {
            http_client,
            base_url,
            api_key,
            default_language: self
                .default_language
                .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }
}

impl MovieDbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> MovieDbClientBuilder {
        MovieDbClientBuilder::new()
    }

    /// Fallback language for `Movie.getInfo`.
    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Builds a request URL with this client's base URL and API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the assembled string is not a valid URL.
    pub fn url_for(&self, operation: Operation, argument: &str, language: &str) -> Result<Url> {
        build_url(
            &self.base_url,
            operation,
            argument,
            language,
            &self.api_key,
        )
    }

    /// Sends a paced GET request and parses the body as XML.
    #[instrument(skip_all)]
    async fn fetch_document(&self, url: Url) -> Result<XmlDocument> {
        self.rate_limiter.lock().await.wait().await;

        let redacted = redact_api_key(url.as_str(), &self.api_key);
        tracing::debug!(url = %redacted, "TMDB API request");

        let result = self.http_client.get(url).send().await;
        let response = result
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("request failed: {redacted}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("TMDB API error (HTTP {status}): {redacted}");
        }

        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("failed to read response body: {redacted}"))?;
        tracing::debug!(body_len = body.len(), "Response body received");

        XmlDocument::parse(&body).with_context(|| {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            format!(
                "XML decoding failed (len={}): {}",
                body.len(),
                redact_api_key(&preview, &self.api_key)
            )
        })
    }

    /// Builds the URL for `operation` and fetches the document.
    async fn fetch(
        &self,
        operation: Operation,
        argument: &str,
        language: &str,
    ) -> Result<XmlDocument> {
        let url = self.url_for(operation, argument, language)?;
        self.fetch_document(url)
            .await
            .with_context(|| format!("{operation} failed"))
    }

    /// Fetches a single-movie document and maps its first movie.
    async fn lookup_movie(
        &self,
        operation: Operation,
        argument: &str,
        language: &str,
    ) -> Result<Option<MovieRecord>> {
        let document = self.fetch(operation, argument, language).await?;
        let movie = find_movie_element(&document).map(movie_from_element);
        if movie.is_none() {
            tracing::debug!(%operation, argument, language, "Movie not found");
        }
        Ok(movie)
    }

    /// Fetches a person document and maps its first person with `map`.
    async fn lookup_person(
        &self,
        operation: Operation,
        argument: &str,
        language: &str,
        map: fn(&Element) -> PersonRecord,
    ) -> Result<Option<PersonRecord>> {
        let document = self.fetch(operation, argument, language).await?;
        let person = find_person_element(&document).map(map);
        if person.is_none() {
            tracing::debug!(%operation, argument, language, "Person not found");
        }
        Ok(person)
    }
}

impl LocalMovieDbApi for MovieDbClient {
    #[instrument(skip_all, fields(title))]
    async fn search_movies(&self, title: &str, language: &str) -> Result<Vec<MovieRecord>> {
        if !is_valid_argument(title) {
            tracing::debug!("Invalid search title, skipping request");
            return Ok(Vec::new());
        }

        let document = self
            .fetch(Operation::MovieSearch, &encode_search_term(title), language)
            .await?;
        let movies = parse_movies(&document);
        tracing::debug!(count = movies.len(), "Movie.search results");
        Ok(movies)
    }

    #[instrument(skip_all, fields(order_by = %params.order_by, order = %params.order))]
    async fn browse_movies(
        &self,
        params: &BrowseParams,
        language: &str,
    ) -> Result<Vec<MovieRecord>> {
        if !is_valid_argument(&params.order_by) {
            tracing::debug!("Invalid order_by, skipping request");
            return Ok(Vec::new());
        }

        let query = params.to_query();
        tracing::trace!(%query, "Movie.browse query");
        let document = self
            .fetch(Operation::MovieBrowse, &query, language)
            .await?;
        let movies = parse_movies(&document);
        tracing::debug!(count = movies.len(), "Movie.browse results");
        Ok(movies)
    }

    #[instrument(skip_all, fields(imdb_id))]
    async fn imdb_lookup(&self, imdb_id: &str, language: &str) -> Result<Option<MovieRecord>> {
        if !is_valid_argument(imdb_id) {
            tracing::debug!("Invalid IMDb ID, skipping request");
            return Ok(None);
        }
        self.lookup_movie(Operation::MovieImdbLookup, imdb_id, language)
            .await
    }

    #[instrument(skip_all, fields(tmdb_id, language))]
    async fn movie_info(&self, tmdb_id: &str, language: &str) -> Result<Option<MovieRecord>> {
        if !is_valid_argument(tmdb_id) {
            tracing::debug!("Invalid TMDB ID, skipping request");
            return Ok(None);
        }

        let first = self
            .lookup_movie(Operation::MovieGetInfo, tmdb_id, language)
            .await;
        if matches!(first, Ok(Some(_))) || language.eq_ignore_ascii_case(&self.default_language)
        {
            return first;
        }

        if let Err(e) = &first {
            tracing::warn!(
                error = format!("{e:#}"),
                "Movie.getInfo failed for requested language"
            );
        }
        tracing::info!(
            language,
            fallback = %self.default_language,
            "Retrying Movie.getInfo with default language"
        );
        self.lookup_movie(Operation::MovieGetInfo, tmdb_id, &self.default_language)
            .await
    }

    #[instrument(skip_all, fields(id))]
    async fn movie_images(&self, id: &str, language: &str) -> Result<Option<MovieRecord>> {
        if !is_valid_argument(id) {
            tracing::debug!("Invalid movie ID, skipping request");
            return Ok(None);
        }
        self.lookup_movie(Operation::MovieGetImages, id, language)
            .await
    }

    #[instrument(skip_all, fields(name))]
    async fn search_person(&self, name: &str, language: &str) -> Result<Option<PersonRecord>> {
        if !is_valid_argument(name) {
            tracing::debug!("Invalid person name, skipping request");
            return Ok(None);
        }
        self.lookup_person(
            Operation::PersonSearch,
            &encode_search_term(name),
            language,
            person_from_element,
        )
        .await
    }

    #[instrument(skip_all, fields(person_id))]
    async fn person_info(&self, person_id: &str, language: &str) -> Result<Option<PersonRecord>> {
        if !is_valid_argument(person_id) {
            tracing::debug!("Invalid person ID, skipping request");
            return Ok(None);
        }
        self.lookup_person(
            Operation::PersonGetInfo,
            person_id,
            language,
            person_from_element,
        )
        .await
    }

    #[instrument(skip_all, fields(person_id))]
    async fn person_version(
        &self,
        person_id: &str,
        language: &str,
    ) -> Result<Option<PersonRecord>> {
        if !is_valid_argument(person_id) {
            tracing::debug!("Invalid person ID, skipping request");
            return Ok(None);
        }
        self.lookup_person(
            Operation::PersonGetVersion,
            person_id,
            language,
            person_version_from_element,
        )
        .await
    }
}
