//! XML-to-record mapping for movie and person responses.
//!
//! Collections are gathered from the matched element's subtree. The API
//! returns one top-level record for lookups, so this matches a whole-document
//! scan there, and it keeps search results from bleeding into each other.

use super::types::{
    Artwork, CastEntry, Category, Country, Filmography, MovieRecord, PersonRecord, unknown,
};
use super::xml::{Element, XmlDocument};

/// Reads a direct child's text, or the sentinel.
fn text_or_unknown(element: &Element, name: &str) -> String {
    element
        .child_text(name)
        .map_or_else(unknown, String::from)
}

/// Reads an attribute, or the sentinel when absent or empty.
fn attr_or_unknown(element: &Element, name: &str) -> String {
    element
        .attribute(name)
        .filter(|value| !value.trim().is_empty())
        .map_or_else(unknown, String::from)
}

/// Reads a direct child as an unsigned integer, defaulting to `0`.
fn count_or_zero(element: &Element, name: &str) -> u32 {
    let Some(raw) = element.child_text(name) else {
        return 0;
    };
    raw.parse().unwrap_or_else(|e| {
        tracing::warn!(field = name, value = raw, error = %e, "Non-numeric value, using 0");
        0
    })
}

/// Returns `true` for a `movie` or `person` element that carries a record.
/// The API answers empty lookups with a bare `<movie>Nothing found.</movie>`
/// or `<person>Nothing found.</person>`.
fn is_record(element: &Element) -> bool {
    element.children().next().is_some()
}

/// Maps the first movie in the document, or a default record when there is
/// none.
#[must_use]
pub fn parse_movie(document: &XmlDocument) -> MovieRecord {
    find_movie_element(document).map_or_else(
        || {
            tracing::trace!("Movie not found");
            MovieRecord::default()
        },
        movie_from_element,
    )
}

/// Maps every movie in the document (search and browse results).
#[must_use]
pub fn parse_movies(document: &XmlDocument) -> Vec<MovieRecord> {
    document
        .find_all("movie")
        .into_iter()
        .filter(|element| is_record(element))
        .map(movie_from_element)
        .collect()
}

/// First `movie` element that carries a record.
#[must_use]
pub fn find_movie_element(document: &XmlDocument) -> Option<&Element> {
    document
        .find_all("movie")
        .into_iter()
        .find(|element| is_record(element))
}

/// Maps one `movie` element.
#[must_use]
pub fn movie_from_element(movie: &Element) -> MovieRecord {
    MovieRecord {
        id: text_or_unknown(movie, "id"),
        title: text_or_unknown(movie, "name"),
        movie_type: text_or_unknown(movie, "type"),
        imdb_id: text_or_unknown(movie, "imdb_id"),
        url: text_or_unknown(movie, "url"),
        overview: text_or_unknown(movie, "overview"),
        popularity: text_or_unknown(movie, "popularity"),
        rating: text_or_unknown(movie, "rating"),
        release_date: text_or_unknown(movie, "released"),
        runtime: text_or_unknown(movie, "runtime"),
        budget: text_or_unknown(movie, "budget"),
        revenue: text_or_unknown(movie, "revenue"),
        homepage: text_or_unknown(movie, "homepage"),
        trailer: text_or_unknown(movie, "trailer"),
        cast: map_cast(movie),
        categories: map_categories(movie),
        countries: map_countries(movie),
        artwork: map_movie_artwork(movie),
    }
}

fn map_categories(movie: &Element) -> Vec<Category> {
    movie
        .find_all("categories")
        .into_iter()
        .flat_map(Element::children)
        .map(|category| Category {
            category_type: attr_or_unknown(category, "type"),
            name: attr_or_unknown(category, "name"),
            url: attr_or_unknown(category, "url"),
        })
        .collect()
}

fn map_countries(movie: &Element) -> Vec<Country> {
    // Sub-elements first; current responses carry the same fields as
    // attributes on `<country/>`.
    let field = |country: &Element, name: &str| {
        country
            .child_text(name)
            .map_or_else(|| attr_or_unknown(country, name), String::from)
    };
    movie
        .find_all("countries")
        .into_iter()
        .flat_map(Element::children)
        .map(|country| Country {
            code: field(country, "code"),
            name: field(country, "name"),
            url: field(country, "url"),
        })
        .collect()
}

fn map_cast(movie: &Element) -> Vec<CastEntry> {
    movie
        .find_all("cast")
        .into_iter()
        .flat_map(Element::children)
        .map(|person| CastEntry {
            name: attr_or_unknown(person, "name"),
            job: attr_or_unknown(person, "job"),
            character: attr_or_unknown(person, "character"),
            url: attr_or_unknown(person, "url"),
            id: attr_or_unknown(person, "id"),
        })
        .collect()
}

/// Maps both `images` layouts.
///
/// Flat (`Movie.search`, `Movie.imdbLookup`, `Movie.getInfo`):
///
/// ```xml
/// <images>
///   <image type="poster" size="original" url="..." id="60366"/>
/// </images>
/// ```
///
/// Nested (`Movie.getImages`):
///
/// ```xml
/// <images>
///   <poster id="17066">
///     <image url="..." size="original"/>
///     <image url="..." size="thumb"/>
///   </poster>
/// </images>
/// ```
fn map_movie_artwork(movie: &Element) -> Vec<Artwork> {
    let mut artwork = Vec::new();
    for images in movie.find_all("images") {
        for node in images.children() {
            let tag = node.name();
            if tag.eq_ignore_ascii_case("image") {
                artwork.push(artwork_from_image(node));
            } else if tag.eq_ignore_ascii_case("poster") || tag.eq_ignore_ascii_case("backdrop") {
                let id = attr_or_unknown(node, "id");
                for image in node.children() {
                    if !image.name().eq_ignore_ascii_case("image") {
                        tracing::warn!(parent = tag, tag = image.name(), "Unknown image element");
                        continue;
                    }
                    artwork.push(Artwork {
                        artwork_type: String::from(tag),
                        size: attr_or_unknown(image, "size"),
                        url: attr_or_unknown(image, "url"),
                        id: id.clone(),
                    });
                }
            } else {
                tracing::warn!(tag, "Unknown image layout under <images>, skipping");
            }
        }
    }
    artwork
}

fn artwork_from_image(image: &Element) -> Artwork {
    Artwork {
        artwork_type: attr_or_unknown(image, "type"),
        size: attr_or_unknown(image, "size"),
        url: attr_or_unknown(image, "url"),
        id: attr_or_unknown(image, "id"),
    }
}

/// Maps the first person in the document, or a default record when there is
/// none.
#[must_use]
pub fn parse_person(document: &XmlDocument) -> PersonRecord {
    find_person_element(document).map_or_else(
        || {
            tracing::trace!("Person not found");
            PersonRecord::default()
        },
        person_from_element,
    )
}

/// First `person` element that carries a record.
#[must_use]
pub fn find_person_element(document: &XmlDocument) -> Option<&Element> {
    document
        .find_all("person")
        .into_iter()
        .find(|element| is_record(element))
}

/// Maps one `person` element including images and filmography.
#[must_use]
pub fn person_from_element(person: &Element) -> PersonRecord {
    PersonRecord {
        id: text_or_unknown(person, "id"),
        name: text_or_unknown(person, "name"),
        biography: text_or_unknown(person, "biography"),
        known_movies: count_or_zero(person, "known_movies"),
        birthday: text_or_unknown(person, "birthday"),
        birthplace: text_or_unknown(person, "birthplace"),
        url: text_or_unknown(person, "url"),
        version: count_or_zero(person, "version"),
        last_modified_at: text_or_unknown(person, "last_modified_at"),
        artwork: person
            .find_all("image")
            .into_iter()
            .map(artwork_from_image)
            .collect(),
        filmography: person
            .find_all("movie")
            .into_iter()
            .map(|film| Filmography {
                id: attr_or_unknown(film, "id"),
                name: attr_or_unknown(film, "name"),
                character: attr_or_unknown(film, "character"),
                job: attr_or_unknown(film, "job"),
                department: attr_or_unknown(film, "department"),
                url: attr_or_unknown(film, "url"),
            })
            .collect(),
    }
}

/// Maps a `Person.getVersion` response, or a default record when it holds no
/// person.
#[must_use]
pub fn parse_person_version(document: &XmlDocument) -> PersonRecord {
    find_person_element(document).map_or_else(PersonRecord::default, person_version_from_element)
}

/// Maps the version fields (`name`, `id`, `version`, `last_modified_at`) of
/// one `person` element.
#[must_use]
pub fn person_version_from_element(person: &Element) -> PersonRecord {
    PersonRecord {
        id: text_or_unknown(person, "id"),
        name: text_or_unknown(person, "name"),
        version: count_or_zero(person, "version"),
        last_modified_at: text_or_unknown(person, "last_modified_at"),
        ..PersonRecord::default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;
    use crate::tmdb::types::UNKNOWN;

    fn doc(xml: &str) -> XmlDocument {
        XmlDocument::parse(xml).unwrap()
    }

    #[test]
    fn test_parse_movie_scalar_fields() {
        // Arrange
        let xml = r"<OpenSearchDescription><movies><movie>
            <popularity>3</popularity>
            <name>Fight Club</name>
            <type>movie</type>
            <id>550</id>
            <imdb_id>tt0137523</imdb_id>
            <url>http://www.themoviedb.org/movie/550</url>
            <overview>A ticking-time-bomb insomniac...</overview>
            <rating>8.5</rating>
            <released>1999-10-15</released>
            <runtime>139</runtime>
            <budget>63000000</budget>
            <revenue>100853753</revenue>
            <homepage>http://www.foxmovies.com/movies/fight-club</homepage>
            <trailer>http://www.youtube.com/watch?v=SUXWAEX2jlg</trailer>
        </movie></movies></OpenSearchDescription>";

        // Act
        let movie = parse_movie(&doc(xml));

        // Assert
        assert_eq!(movie.popularity, "3");
        assert_eq!(movie.title, "Fight Club");
        assert_eq!(movie.movie_type, "movie");
        assert_eq!(movie.id, "550");
        assert_eq!(movie.imdb_id, "tt0137523");
        assert_eq!(movie.url, "http://www.themoviedb.org/movie/550");
        assert_eq!(movie.overview, "A ticking-time-bomb insomniac...");
        assert_eq!(movie.rating, "8.5");
        assert_eq!(movie.release_date, "1999-10-15");
        assert_eq!(movie.runtime, "139");
        assert_eq!(movie.budget, "63000000");
        assert_eq!(movie.revenue, "100853753");
        assert_eq!(movie.homepage, "http://www.foxmovies.com/movies/fight-club");
        assert_eq!(movie.trailer, "http://www.youtube.com/watch?v=SUXWAEX2jlg");
    }

    #[test]
    fn test_parse_movie_missing_fields_use_sentinel() {
        // Arrange & Act
        let movie = parse_movie(&doc("<movies><movie><name>Solo</name></movie></movies>"));

        // Assert
        assert_eq!(movie.title, "Solo");
        assert_eq!(movie.id, UNKNOWN);
        assert_eq!(movie.trailer, UNKNOWN);
        assert!(movie.cast.is_empty());
    }

    #[test]
    fn test_parse_movie_without_movie_element_returns_default() {
        // Arrange & Act
        let movie = parse_movie(&doc("<OpenSearchDescription><movies/></OpenSearchDescription>"));

        // Assert
        assert_eq!(movie, MovieRecord::default());
    }

    #[test]
    fn test_nothing_found_placeholder_is_not_a_record() {
        // Arrange
        let document = doc("<movies><movie>Nothing found.</movie></movies>");

        // Act & Assert
        assert_eq!(parse_movie(&document), MovieRecord::default());
        assert!(parse_movies(&document).is_empty());
    }

    #[test]
    fn test_flat_image_shape() {
        // Arrange
        let xml = r#"<movie><id>550</id><images>
            <image type="poster" size="original" url="u" id="1"/>
        </images></movie>"#;

        // Act
        let movie = parse_movie(&doc(xml));

        // Assert
        assert_eq!(
            movie.artwork,
            vec![Artwork {
                artwork_type: String::from("poster"),
                size: String::from("original"),
                url: String::from("u"),
                id: String::from("1"),
            }]
        );
    }

    #[test]
    fn test_nested_image_shape() {
        // Arrange
        let xml = r#"<movie><id>550</id><images>
            <poster id="5"><image url="u1" size="original"/><image url="u2" size="thumb"/></poster>
        </images></movie>"#;

        // Act
        let movie = parse_movie(&doc(xml));

        // Assert
        assert_eq!(movie.artwork.len(), 2);
        for artwork in &movie.artwork {
            assert_eq!(artwork.artwork_type, "poster");
            assert_eq!(artwork.id, "5");
        }
        assert_eq!(movie.artwork[0].url, "u1");
        assert_eq!(movie.artwork[0].size, "original");
        assert_eq!(movie.artwork[1].url, "u2");
        assert_eq!(movie.artwork[1].size, "thumb");
    }

    #[test]
    fn test_unknown_image_tag_is_skipped() {
        // Arrange
        let xml = r#"<movie><id>1</id><images>
            <logo id="9"/>
            <backdrop id="7"><image url="b" size="original"/></backdrop>
        </images></movie>"#;

        // Act
        let movie = parse_movie(&doc(xml));

        // Assert
        assert_eq!(movie.artwork.len(), 1);
        assert_eq!(movie.artwork[0].artwork_type, "backdrop");
        assert_eq!(movie.artwork[0].id, "7");
    }

    #[test]
    fn test_unknown_image_layout_is_logged() {
        // Arrange
        let document = doc(r#"<movie><id>1</id><images><logo id="9"/></images></movie>"#);
        let (subscriber, handle) = subscriber::mock()
            .event(
                expect::event()
                    .at_level(tracing::Level::WARN)
                    .with_fields(expect::msg("Unknown image layout under <images>, skipping")),
            )
            .only()
            .run_with_handle();

        // Act
        let movie = with_default(subscriber, || parse_movie(&document));

        // Assert
        handle.assert_finished();
        assert!(movie.artwork.is_empty());
    }

    #[test]
    fn test_unknown_nested_image_element_is_logged() {
        // Arrange
        let document = doc(
            r#"<movie><id>1</id><images><poster id="5"><thumb url="t"/><image url="u" size="mid"/></poster></images></movie>"#,
        );
        let (subscriber, handle) = subscriber::mock()
            .event(
                expect::event()
                    .at_level(tracing::Level::WARN)
                    .with_fields(expect::msg("Unknown image element")),
            )
            .only()
            .run_with_handle();

        // Act
        let movie = with_default(subscriber, || parse_movie(&document));

        // Assert
        handle.assert_finished();
        assert_eq!(movie.artwork.len(), 1);
        assert_eq!(movie.artwork[0].size, "mid");
    }

    #[test]
    fn test_categories_cast_and_countries() {
        // Arrange
        let xml = r#"<movie><id>550</id>
            <categories>
                <category type="genre" name="Drama" url="http://www.themoviedb.org/genre/18"/>
                <category type="genre" name="Thriller" url="http://www.themoviedb.org/genre/53"/>
            </categories>
            <countries>
                <country><code>US</code><name>United States of America</name><url>http://www.themoviedb.org/country/us</url></country>
                <country code="DE" name="Germany" url="http://www.themoviedb.org/country/de"/>
            </countries>
            <cast>
                <person name="Brad Pitt" character="Tyler Durden" job="Actor" id="287" url="http://www.themoviedb.org/person/287"/>
                <person name="David Fincher" job="Director" id="7467" url="http://www.themoviedb.org/person/7467"/>
            </cast>
        </movie>"#;

        // Act
        let movie = parse_movie(&doc(xml));

        // Assert
        assert_eq!(movie.categories.len(), 2);
        assert_eq!(movie.categories[1].name, "Thriller");
        assert_eq!(movie.categories[1].category_type, "genre");

        assert_eq!(movie.countries.len(), 2);
        assert_eq!(movie.countries[0].code, "US");
        assert_eq!(movie.countries[0].name, "United States of America");
        assert_eq!(movie.countries[1].code, "DE");
        assert_eq!(movie.countries[1].url, "http://www.themoviedb.org/country/de");

        assert_eq!(movie.cast.len(), 2);
        assert_eq!(movie.cast[0].character, "Tyler Durden");
        assert_eq!(movie.cast[0].id, "287");
        assert_eq!(movie.cast[1].job, "Director");
        assert_eq!(movie.cast[1].character, UNKNOWN);
    }

    #[test]
    fn test_parse_movies_scopes_collections_per_movie() {
        // Arrange
        let xml = r#"<movies>
            <movie><id>1</id><name>A</name><images><image type="poster" size="thumb" url="a" id="10"/></images></movie>
            <movie><id>2</id><name>B</name><images><image type="poster" size="thumb" url="b" id="20"/></images></movie>
        </movies>"#;

        // Act
        let movies = parse_movies(&doc(xml));

        // Assert
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].artwork.len(), 1);
        assert_eq!(movies[0].artwork[0].url, "a");
        assert_eq!(movies[1].title, "B");
        assert_eq!(movies[1].artwork[0].url, "b");
    }

    #[test]
    fn test_parse_person() {
        // Arrange
        let xml = r#"<people><person>
            <popularity>3</popularity>
            <name>Brad Pitt</name>
            <id>287</id>
            <biography>An actor.</biography>
            <known_movies>52</known_movies>
            <birthday>1963-12-18</birthday>
            <birthplace>Shawnee, Oklahoma, United States</birthplace>
            <url>http://www.themoviedb.org/person/287</url>
            <images>
                <image type="profile" size="original" url="http://example.com/p.jpg" id="4c3e"/>
                <image type="profile" size="thumb" url="http://example.com/t.jpg" id="4c3e"/>
            </images>
            <filmography>
                <movie name="Fight Club" id="550" job="Actor" department="Actors" character="Tyler Durden" url="http://www.themoviedb.org/movie/550"/>
            </filmography>
            <version>685</version>
            <last_modified_at>2010-04-08 18:26:56</last_modified_at>
        </person></people>"#;

        // Act
        let person = parse_person(&doc(xml));

        // Assert
        assert_eq!(person.name, "Brad Pitt");
        assert_eq!(person.id, "287");
        assert_eq!(person.known_movies, 52);
        assert_eq!(person.birthplace, "Shawnee, Oklahoma, United States");
        assert_eq!(person.version, 685);
        assert_eq!(person.last_modified_at, "2010-04-08 18:26:56");
        assert_eq!(person.artwork.len(), 2);
        assert_eq!(person.artwork[1].size, "thumb");
        assert_eq!(person.filmography.len(), 1);
        assert_eq!(person.filmography[0].department, "Actors");
        assert_eq!(person.filmography[0].character, "Tyler Durden");
    }

    #[test]
    fn test_parse_person_malformed_numbers_default_to_zero() {
        // Arrange
        let xml = "<person><name>X</name><known_movies>many</known_movies><version>v2</version></person>";

        // Act
        let person = parse_person(&doc(xml));

        // Assert
        assert_eq!(person.name, "X");
        assert_eq!(person.known_movies, 0);
        assert_eq!(person.version, 0);
    }

    #[test]
    fn test_parse_person_absent_returns_default() {
        // Arrange & Act
        let person = parse_person(&doc("<people/>"));

        // Assert
        assert_eq!(person, PersonRecord::default());
    }

    #[test]
    fn test_person_nothing_found_placeholder_is_not_a_record() {
        // Arrange
        let document = doc(include_str!(
            "../../../../fixtures/tmdb/nothing_found_person.xml"
        ));

        // Act & Assert
        assert!(find_person_element(&document).is_none());
        assert_eq!(parse_person(&document), PersonRecord::default());
        assert_eq!(parse_person_version(&document), PersonRecord::default());
    }

    #[test]
    fn test_parse_person_version() {
        // Arrange
        let xml = r"<people><person>
            <name>Brad Pitt</name>
            <id>287</id>
            <version>685</version>
            <last_modified_at>2010-04-08 18:26:56</last_modified_at>
        </person></people>";

        // Act
        let person = parse_person_version(&doc(xml));

        // Assert
        assert_eq!(person.name, "Brad Pitt");
        assert_eq!(person.id, "287");
        assert_eq!(person.version, 685);
        assert_eq!(person.last_modified_at, "2010-04-08 18:26:56");
        assert_eq!(person.biography, UNKNOWN);
        assert!(person.filmography.is_empty());
    }
}
