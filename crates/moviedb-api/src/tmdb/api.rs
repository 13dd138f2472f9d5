//! `MovieDbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::request::BrowseParams;
use super::types::{MovieRecord, PersonRecord};

/// TMDB v2.1 API trait.
///
/// Results distinguish three outcomes: a record (or non-empty list), "not
/// found" (`None` or an empty list), and a transport or parse failure
/// (`Err`). A blank or `UNKNOWN` primary argument is reported as "not
/// found" without sending a request.
///
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieDbApi: Send)]
pub trait LocalMovieDbApi {
    /// Searches movies by title (`Movie.search`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML parsing fails.
    async fn search_movies(&self, title: &str, language: &str) -> Result<Vec<MovieRecord>>;

    /// Browses movies with sort settings and allow-listed filters
    /// (`Movie.browse`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML parsing fails.
    async fn browse_movies(
        &self,
        params: &BrowseParams,
        language: &str,
    ) -> Result<Vec<MovieRecord>>;

    /// Looks up a movie by IMDb ID, including the `tt` prefix
    /// (`Movie.imdbLookup`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML parsing fails.
    async fn imdb_lookup(&self, imdb_id: &str, language: &str) -> Result<Option<MovieRecord>>;

    /// Fetches full movie information (`Movie.getInfo`).
    ///
    /// Retries once with the client's default language when the requested
    /// language yields nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML parsing fails.
    async fn movie_info(&self, tmdb_id: &str, language: &str) -> Result<Option<MovieRecord>>;

    /// Fetches all artwork for a movie by TMDB or IMDb ID
    /// (`Movie.getImages`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML parsing fails.
    async fn movie_images(&self, id: &str, language: &str) -> Result<Option<MovieRecord>>;

    /// Searches people by name (`Person.search`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML parsing fails.
    async fn search_person(&self, name: &str, language: &str) -> Result<Option<PersonRecord>>;

    /// Fetches a person's biography, images and filmography
    /// (`Person.getInfo`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML parsing fails.
    async fn person_info(&self, person_id: &str, language: &str) -> Result<Option<PersonRecord>>;

    /// Fetches a person's version and last modification time
    /// (`Person.getVersion`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML parsing fails.
    async fn person_version(
        &self,
        person_id: &str,
        language: &str,
    ) -> Result<Option<PersonRecord>>;
}
