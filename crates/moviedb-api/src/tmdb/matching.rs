//! Picking a movie out of search results by title and year.

use super::request::is_valid_argument;
use super::types::MovieRecord;

/// Returns `true` when `movie` has the given title (Unicode
/// case-insensitive) and, if `year` is a usable value, was released in that
/// year.
///
/// A blank or `UNKNOWN` title never matches. A movie without a usable
/// release date never matches a year.
#[must_use]
pub fn compare_movies(movie: &MovieRecord, title: &str, year: Option<&str>) -> bool {
    if !is_valid_argument(title) || movie.title.to_lowercase() != title.trim().to_lowercase() {
        return false;
    }

    match year.filter(|y| is_valid_argument(y)) {
        Some(year) => movie.release_year() == Some(year.trim()),
        None => true,
    }
}

/// First movie in `movies` satisfying [`compare_movies`].
#[must_use]
pub fn find_movie<'a>(
    movies: &'a [MovieRecord],
    title: &str,
    year: Option<&str>,
) -> Option<&'a MovieRecord> {
    movies
        .iter()
        .find(|movie| compare_movies(movie, title, year))
}
