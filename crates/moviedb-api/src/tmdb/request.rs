//! URL construction for the TMDB v2.1 XML API.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use url::Url;

use super::types::UNKNOWN;

/// Replacement text for the API key in logged URLs.
const API_KEY_MASK: &str = "[APIKEY]";

/// Optional `Movie.browse` parameters accepted by the API, in the order they
/// are emitted.
pub const BROWSE_OPTIONAL_PARAMS: [&str; 14] = [
    "per_page",
    "page",
    "query",
    "min_votes",
    "rating_min",
    "rating_max",
    "genres",
    "genres_selector",
    "release_min",
    "release_max",
    "year",
    "certifications",
    "companies",
    "countries",
];

/// API method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `Movie.search`
    MovieSearch,
    /// `Movie.browse`
    MovieBrowse,
    /// `Movie.imdbLookup`
    MovieImdbLookup,
    /// `Movie.getInfo`
    MovieGetInfo,
    /// `Movie.getImages`
    MovieGetImages,
    /// `Person.search`
    PersonSearch,
    /// `Person.getInfo`
    PersonGetInfo,
    /// `Person.getVersion`
    PersonGetVersion,
}

impl Operation {
    /// Wire name used in the URL path.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MovieSearch => "Movie.search",
            Self::MovieBrowse => "Movie.browse",
            Self::MovieImdbLookup => "Movie.imdbLookup",
            Self::MovieGetInfo => "Movie.getInfo",
            Self::MovieGetImages => "Movie.getImages",
            Self::PersonSearch => "Person.search",
            Self::PersonGetInfo => "Person.getInfo",
            Self::PersonGetVersion => "Person.getVersion",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a request URL.
///
/// `<base>/<operation>/<language>/xml/<api_key>/<argument>`, except for
/// [`Operation::MovieBrowse`] where the argument is an encoded query string
/// appended as `?<argument>`. The argument is inserted verbatim; free text
/// must go through [`encode_search_term`] first.
///
/// # Errors
///
/// Returns an error if the assembled string is not a valid URL.
pub fn build_url(
    base: &Url,
    operation: Operation,
    argument: &str,
    language: &str,
    api_key: &str,
) -> Result<Url> {
    let base = base.as_str().trim_end_matches('/');
    let separator = if operation == Operation::MovieBrowse {
        '?'
    } else {
        '/'
    };
    let raw = format!("{base}/{operation}/{language}/xml/{api_key}{separator}{argument}");
    Url::parse(&raw).with_context(|| format!("invalid {operation} URL"))
}

/// Percent-encodes free text (titles, names) for use as a path argument.
#[must_use]
pub fn encode_search_term(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Returns `false` for blank strings and the [`UNKNOWN`] sentinel.
#[must_use]
pub fn is_valid_argument(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(UNKNOWN)
}

/// Masks `api_key` in `text` so request URLs can be logged.
#[must_use]
pub fn redact_api_key(text: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        return String::from(text);
    }
    text.replace(api_key, API_KEY_MASK)
}

/// Request parameters for `Movie.browse`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseParams {
    /// Sort field (`rating`, `release` or `title`).
    pub order_by: String,
    /// Sort direction (`asc` or `desc`).
    pub order: String,
    /// Optional filters keyed by parameter name. Keys outside
    /// [`BROWSE_OPTIONAL_PARAMS`] are dropped when the query is built.
    pub filters: BTreeMap<String, String>,
}

impl BrowseParams {
    /// Creates parameters with the required sort settings.
    #[must_use]
    pub fn new(order_by: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            order_by: order_by.into(),
            order: order.into(),
            filters: BTreeMap::new(),
        }
    }

    /// Adds an optional filter.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Builds the `Movie.browse` query string.
    ///
    /// `order_by` and `order` are always emitted first, even when empty.
    /// Allowed filters follow in [`BROWSE_OPTIONAL_PARAMS`] order; values are
    /// passed through unchanged.
    #[must_use]
    pub fn to_query(&self) -> String {
        for key in self.filters.keys() {
            if !BROWSE_OPTIONAL_PARAMS.contains(&key.as_str()) {
                tracing::debug!(%key, "Dropping unsupported browse parameter");
            }
        }

        let mut query = format!("order_by={}&order={}", self.order_by, self.order);
        for key in BROWSE_OPTIONAL_PARAMS {
            if let Some(value) = self.filters.get(key) {
                query.push('&');
                query.push_str(key);
                query.push('=');
                query.push_str(value);
            }
        }
        query
    }
}
