//! TMDB record types.
//!
//! Every string field defaults to [`UNKNOWN`] and every list to empty, so a
//! record returned by the mapper can always be read without checking for
//! absent values.

use serde::{Deserialize, Serialize};

/// Placeholder stored in string fields the response did not provide.
pub const UNKNOWN: &str = "UNKNOWN";

/// Returns an owned [`UNKNOWN`] sentinel.
pub(crate) fn unknown() -> String {
    String::from(UNKNOWN)
}

/// Returns `Some` unless the value is the sentinel, blank, or unparsable.
fn parse_known<T: std::str::FromStr>(value: &str) -> Option<T> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN) {
        return None;
    }
    trimmed.parse().ok()
}

/// A movie as returned by `Movie.search`, `Movie.browse`,
/// `Movie.imdbLookup`, `Movie.getInfo` and `Movie.getImages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// TMDB movie ID.
    pub id: String,
    /// Title (`name` element).
    pub title: String,
    /// Record type (`type` element, e.g. `movie`).
    pub movie_type: String,
    /// IMDb cross-reference ID (`imdb_id` element, e.g. `tt0137523`).
    pub imdb_id: String,
    /// Canonical TMDB page URL.
    pub url: String,
    /// Synopsis.
    pub overview: String,
    /// Popularity score.
    pub popularity: String,
    /// Average rating.
    pub rating: String,
    /// Release date (`released` element, usually `YYYY-MM-DD`).
    pub release_date: String,
    /// Runtime in minutes.
    pub runtime: String,
    /// Budget.
    pub budget: String,
    /// Revenue.
    pub revenue: String,
    /// Official homepage.
    pub homepage: String,
    /// Trailer URL.
    pub trailer: String,
    /// Cast and crew, in document order.
    pub cast: Vec<CastEntry>,
    /// Genres and other categories.
    pub categories: Vec<Category>,
    /// Production countries.
    pub countries: Vec<Country>,
    /// Posters and backdrops, one entry per size variant.
    pub artwork: Vec<Artwork>,
}

impl Default for MovieRecord {
    fn default() -> Self {
        Self {
            id: unknown(),
            title: unknown(),
            movie_type: unknown(),
            imdb_id: unknown(),
            url: unknown(),
            overview: unknown(),
            popularity: unknown(),
            rating: unknown(),
            release_date: unknown(),
            runtime: unknown(),
            budget: unknown(),
            revenue: unknown(),
            homepage: unknown(),
            trailer: unknown(),
            cast: Vec::new(),
            categories: Vec::new(),
            countries: Vec::new(),
            artwork: Vec::new(),
        }
    }
}

impl MovieRecord {
    /// Rating as a number.
    #[must_use]
    pub fn rating_value(&self) -> Option<f64> {
        parse_known(&self.rating)
    }

    /// Popularity as a number.
    #[must_use]
    pub fn popularity_value(&self) -> Option<f64> {
        parse_known(&self.popularity)
    }

    /// Runtime in minutes.
    #[must_use]
    pub fn runtime_minutes(&self) -> Option<u32> {
        parse_known(&self.runtime)
    }

    /// Budget as a number.
    #[must_use]
    pub fn budget_amount(&self) -> Option<u64> {
        parse_known(&self.budget)
    }

    /// Revenue as a number.
    #[must_use]
    pub fn revenue_amount(&self) -> Option<u64> {
        parse_known(&self.revenue)
    }

    /// Year part of the release date.
    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        if self.release_date.eq_ignore_ascii_case(UNKNOWN) {
            return None;
        }
        self.release_date
            .get(..4)
            .filter(|year| year.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Artwork entries of the given type and size (case-insensitive).
    pub fn artwork_of<'a>(
        &'a self,
        artwork_type: &'a str,
        size: &'a str,
    ) -> impl Iterator<Item = &'a Artwork> + 'a {
        self.artwork.iter().filter(move |a| {
            a.artwork_type.eq_ignore_ascii_case(artwork_type) && a.size.eq_ignore_ascii_case(size)
        })
    }
}

/// A cast or crew member attached to a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastEntry {
    /// Person name.
    pub name: String,
    /// Job (e.g. `Actor`, `Director`).
    pub job: String,
    /// Character played, for actors.
    pub character: String,
    /// Canonical TMDB person URL.
    pub url: String,
    /// TMDB person ID.
    pub id: String,
}

impl Default for CastEntry {
    fn default() -> Self {
        Self {
            name: unknown(),
            job: unknown(),
            character: unknown(),
            url: unknown(),
            id: unknown(),
        }
    }
}

/// A category (genre) attached to a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category type (e.g. `genre`).
    pub category_type: String,
    /// Display name.
    pub name: String,
    /// Canonical TMDB URL.
    pub url: String,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            category_type: unknown(),
            name: unknown(),
            url: unknown(),
        }
    }
}

/// A production country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Canonical TMDB URL.
    pub url: String,
}

impl Default for Country {
    fn default() -> Self {
        Self {
            code: unknown(),
            name: unknown(),
            url: unknown(),
        }
    }
}

/// A single size variant of a poster, backdrop or profile image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Artwork type (`poster`, `backdrop`, `profile`).
    pub artwork_type: String,
    /// Size variant (`original`, `thumb`, `cover`, `mid`, ...).
    pub size: String,
    /// Image URL.
    pub url: String,
    /// Image ID, shared by all size variants of the same image.
    pub id: String,
}

impl Default for Artwork {
    fn default() -> Self {
        Self {
            artwork_type: unknown(),
            size: unknown(),
            url: unknown(),
            id: unknown(),
        }
    }
}

/// A person as returned by `Person.search`, `Person.getInfo` and
/// `Person.getVersion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// TMDB person ID.
    pub id: String,
    /// Name.
    pub name: String,
    /// Biography.
    pub biography: String,
    /// Number of known movies.
    pub known_movies: u32,
    /// Birthday.
    pub birthday: String,
    /// Birthplace.
    pub birthplace: String,
    /// Canonical TMDB page URL.
    pub url: String,
    /// Record version.
    pub version: u32,
    /// Last modification timestamp.
    pub last_modified_at: String,
    /// Profile images.
    pub artwork: Vec<Artwork>,
    /// Filmography.
    pub filmography: Vec<Filmography>,
}

impl Default for PersonRecord {
    fn default() -> Self {
        Self {
            id: unknown(),
            name: unknown(),
            biography: unknown(),
            known_movies: 0,
            birthday: unknown(),
            birthplace: unknown(),
            url: unknown(),
            version: 0,
            last_modified_at: unknown(),
            artwork: Vec::new(),
            filmography: Vec::new(),
        }
    }
}

/// A filmography entry attached to a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filmography {
    /// TMDB movie ID.
    pub id: String,
    /// Movie name.
    pub name: String,
    /// Character played, for acting credits.
    pub character: String,
    /// Job (e.g. `Actor`, `Producer`).
    pub job: String,
    /// Department (e.g. `Actors`, `Production`).
    pub department: String,
    /// Canonical TMDB movie URL.
    pub url: String,
}

impl Default for Filmography {
    fn default() -> Self {
        Self {
            id: unknown(),
            name: unknown(),
            character: unknown(),
            job: unknown(),
            department: unknown(),
            url: unknown(),
        }
    }
}
