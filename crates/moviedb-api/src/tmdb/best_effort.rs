//! Never-failing facade over a `LocalMovieDbApi` implementation.
#![allow(clippy::future_not_send)]

use super::api::LocalMovieDbApi;
use super::request::BrowseParams;
use super::types::{MovieRecord, PersonRecord};

/// Wraps an API implementation so that every call yields a value.
///
/// Failures are logged at `error` and replaced by an empty list or a record
/// whose fields are all `UNKNOWN`. Use this for callers that only want to
/// render whatever is available.
#[derive(Debug)]
pub struct BestEffort<A> {
    inner: A,
}

impl<A: LocalMovieDbApi> BestEffort<A> {
    /// Wraps `inner`.
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }

    /// Underlying implementation.
    pub const fn inner(&self) -> &A {
        &self.inner
    }

    /// Searches movies by title; empty on failure.
    pub async fn search_movies(&self, title: &str, language: &str) -> Vec<MovieRecord> {
        list_or_empty(
            "Movie.search",
            self.inner.search_movies(title, language).await,
        )
    }

    /// Browses movies; empty on failure.
    pub async fn browse_movies(&self, params: &BrowseParams, language: &str) -> Vec<MovieRecord> {
        list_or_empty(
            "Movie.browse",
            self.inner.browse_movies(params, language).await,
        )
    }

    /// Looks up a movie by IMDb ID; `UNKNOWN` record on failure.
    pub async fn imdb_lookup(&self, imdb_id: &str, language: &str) -> MovieRecord {
        record_or_default(
            "Movie.imdbLookup",
            self.inner.imdb_lookup(imdb_id, language).await,
        )
    }

    /// Fetches full movie information; `UNKNOWN` record on failure.
    pub async fn movie_info(&self, tmdb_id: &str, language: &str) -> MovieRecord {
        record_or_default(
            "Movie.getInfo",
            self.inner.movie_info(tmdb_id, language).await,
        )
    }

    /// Fetches movie artwork; `UNKNOWN` record on failure.
    pub async fn movie_images(&self, id: &str, language: &str) -> MovieRecord {
        record_or_default(
            "Movie.getImages",
            self.inner.movie_images(id, language).await,
        )
    }

    /// Searches a person by name; `UNKNOWN` record on failure.
    pub async fn search_person(&self, name: &str, language: &str) -> PersonRecord {
        record_or_default(
            "Person.search",
            self.inner.search_person(name, language).await,
        )
    }

    /// Fetches person information; `UNKNOWN` record on failure.
    pub async fn person_info(&self, person_id: &str, language: &str) -> PersonRecord {
        record_or_default(
            "Person.getInfo",
            self.inner.person_info(person_id, language).await,
        )
    }

    /// Fetches person version information; `UNKNOWN` record on failure.
    pub async fn person_version(&self, person_id: &str, language: &str) -> PersonRecord {
        record_or_default(
            "Person.getVersion",
            self.inner.person_version(person_id, language).await,
        )
    }
}

fn list_or_empty<T>(operation: &str, result: anyhow::Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(
            operation,
            error = format!("{e:#}"),
            "Request failed, returning empty list"
        );
        Vec::new()
    })
}

fn record_or_default<T: Default>(operation: &str, result: anyhow::Result<Option<T>>) -> T {
    match result {
        Ok(Some(record)) => record,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::error!(
                operation,
                error = format!("{e:#}"),
                "Request failed, returning default record"
            );
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use anyhow::{Result, bail};

    use super::*;
    use crate::tmdb::types::UNKNOWN;

    /// Mock that always fails.
    struct FailingApi;

    impl LocalMovieDbApi for FailingApi {
        async fn search_movies(&self, _title: &str, _language: &str) -> Result<Vec<MovieRecord>> {
            bail!("connection refused")
        }

        async fn browse_movies(
            &self,
            _params: &BrowseParams,
            _language: &str,
        ) -> Result<Vec<MovieRecord>> {
            bail!("connection refused")
        }

        async fn imdb_lookup(&self, _id: &str, _language: &str) -> Result<Option<MovieRecord>> {
            bail!("connection refused")
        }

        async fn movie_info(&self, _id: &str, _language: &str) -> Result<Option<MovieRecord>> {
            bail!("connection refused")
        }

        async fn movie_images(&self, _id: &str, _language: &str) -> Result<Option<MovieRecord>> {
            bail!("connection refused")
        }

        async fn search_person(
            &self,
            _name: &str,
            _language: &str,
        ) -> Result<Option<PersonRecord>> {
            bail!("connection refused")
        }

        async fn person_info(&self, _id: &str, _language: &str) -> Result<Option<PersonRecord>> {
            bail!("connection refused")
        }

        async fn person_version(
            &self,
            _id: &str,
            _language: &str,
        ) -> Result<Option<PersonRecord>> {
            bail!("connection refused")
        }
    }

    /// Mock that finds a single movie and nothing else.
    struct SingleMovieApi;

    fn fight_club() -> MovieRecord {
        MovieRecord {
            id: String::from("550"),
            title: String::from("Fight Club"),
            ..MovieRecord::default()
        }
    }

    impl LocalMovieDbApi for SingleMovieApi {
        async fn search_movies(&self, _title: &str, _language: &str) -> Result<Vec<MovieRecord>> {
            Ok(vec![fight_club()])
        }

        async fn browse_movies(
            &self,
            _params: &BrowseParams,
            _language: &str,
        ) -> Result<Vec<MovieRecord>> {
            Ok(vec![])
        }

        async fn imdb_lookup(&self, _id: &str, _language: &str) -> Result<Option<MovieRecord>> {
            Ok(None)
        }

        async fn movie_info(&self, _id: &str, _language: &str) -> Result<Option<MovieRecord>> {
            Ok(Some(fight_club()))
        }

        async fn movie_images(&self, _id: &str, _language: &str) -> Result<Option<MovieRecord>> {
            Ok(None)
        }

        async fn search_person(
            &self,
            _name: &str,
            _language: &str,
        ) -> Result<Option<PersonRecord>> {
            Ok(None)
        }

        async fn person_info(&self, _id: &str, _language: &str) -> Result<Option<PersonRecord>> {
            Ok(None)
        }

        async fn person_version(
            &self,
            _id: &str,
            _language: &str,
        ) -> Result<Option<PersonRecord>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_failures_become_defaults() {
        // Arrange
        let api = BestEffort::new(FailingApi);
        let params = BrowseParams::new("rating", "desc");

        // Act & Assert
        assert!(api.search_movies("Fight Club", "en").await.is_empty());
        assert!(api.browse_movies(&params, "en").await.is_empty());
        assert_eq!(api.imdb_lookup("tt0137523", "en").await.id, UNKNOWN);
        assert_eq!(api.movie_info("550", "en").await.title, UNKNOWN);
        assert!(api.movie_images("550", "en").await.artwork.is_empty());
        assert_eq!(api.search_person("Brad Pitt", "en").await.name, UNKNOWN);
        assert_eq!(api.person_info("287", "en").await.known_movies, 0);
        assert_eq!(api.person_version("287", "en").await.last_modified_at, UNKNOWN);
    }

    #[tokio::test]
    async fn test_found_records_pass_through() {
        // Arrange
        let api = BestEffort::new(SingleMovieApi);

        // Act
        let movies = api.search_movies("Fight Club", "en").await;
        let movie = api.movie_info("550", "en").await;

        // Assert
        assert_eq!(movies.len(), 1);
        assert_eq!(movie.title, "Fight Club");
    }

    #[tokio::test]
    async fn test_not_found_becomes_unknown_record() {
        // Arrange
        let api = BestEffort::new(SingleMovieApi);

        // Act
        let movie = api.imdb_lookup("tt0000000", "en").await;
        let person = api.person_info("1", "en").await;

        // Assert
        assert_eq!(movie, MovieRecord::default());
        assert_eq!(person, PersonRecord::default());
    }
}
