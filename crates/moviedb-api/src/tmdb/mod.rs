//! TMDB v2.1 XML API client module.
//!
//! Builds `/<Method>/<language>/xml/<key>/<argument>` request URLs, fetches
//! the XML documents and maps them into movie and person records.

mod api;
mod best_effort;
mod client;
pub mod mapper;
mod matching;
mod rate_limiter;
pub mod request;
mod types;
pub mod xml;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMovieDbApi, MovieDbApi};
pub use best_effort::BestEffort;
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_LANGUAGE, MovieDbClient, MovieDbClientBuilder, ProxySettings};
pub use matching::{compare_movies, find_movie};
pub use request::{BROWSE_OPTIONAL_PARAMS, BrowseParams, Operation};
pub use types::{
    Artwork, CastEntry, Category, Country, Filmography, MovieRecord, PersonRecord, UNKNOWN,
};
