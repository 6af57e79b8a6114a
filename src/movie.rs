//! The movie record and its validated input shapes.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Rate assigned on creation when the payload leaves it out.
pub const DEFAULT_RATE: f64 = 5.0;

/// The fixed genre enumeration.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Comedy,
    Drama,
    Fantasy,
    Horror,
    Thriller,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Crime,
}

impl Genre {
    pub const ALL: [Genre; 9] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Comedy,
        Genre::Drama,
        Genre::Fantasy,
        Genre::Horror,
        Genre::Thriller,
        Genre::SciFi,
        Genre::Crime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Action    => "Action",
            Genre::Adventure => "Adventure",
            Genre::Comedy    => "Comedy",
            Genre::Drama     => "Drama",
            Genre::Fantasy   => "Fantasy",
            Genre::Horror    => "Horror",
            Genre::Thriller  => "Thriller",
            Genre::SciFi     => "Sci-Fi",
            Genre::Crime     => "Crime",
        }
    }

    /// Exact, case-sensitive lookup by wire name.
    pub fn from_name(name: &str) -> Option<Genre> {
        Genre::ALL.into_iter().find(|g| g.as_str() == name)
    }

    /// Case-insensitive comparison used by genre filtering.
    pub fn matches(self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored movie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub year: u16,
    pub director: String,
    pub duration: u32,
    #[serde(serialize_with = "serialize_rate")]
    pub rate: f64,
    pub poster: String,
    pub genre: Vec<Genre>,
}

impl Movie {
    pub fn has_genre(&self, name: &str) -> bool {
        self.genre.iter().any(|g| g.matches(name))
    }

    /// Overlays every field present in `patch`; absent fields keep their value.
    /// The `id` is never touched.
    pub fn apply(&mut self, patch: MoviePatch) {
        let MoviePatch { title, year, director, duration, rate, poster, genre } = patch;
        if let Some(title) = title { self.title = title; }
        if let Some(year) = year { self.year = year; }
        if let Some(director) = director { self.director = director; }
        if let Some(duration) = duration { self.duration = duration; }
        if let Some(rate) = rate { self.rate = rate; }
        if let Some(poster) = poster { self.poster = poster; }
        if let Some(genre) = genre { self.genre = genre; }
    }
}

/// A fully validated creation payload: every field of [`Movie`] except `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: u16,
    pub director: String,
    pub duration: u32,
    pub rate: f64,
    pub poster: String,
    pub genre: Vec<Genre>,
}

impl NewMovie {
    pub fn into_movie(self, id: String) -> Movie {
        let NewMovie { title, year, director, duration, rate, poster, genre } = self;
        Movie { id, title, year, director, duration, rate, poster, genre }
    }
}

/// A validated partial update. `None` means "leave as is".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub year: Option<u16>,
    pub director: Option<String>,
    pub duration: Option<u32>,
    pub rate: Option<f64>,
    pub poster: Option<String>,
    pub genre: Option<Vec<Genre>>,
}

impl MoviePatch {
    pub fn is_empty(&self) -> bool {
        *self == MoviePatch::default()
    }
}

// Whole-number rates go out as JSON integers (`5`, not `5.0`).
fn serialize_rate<S: Serializer>(rate: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if rate.fract() == 0.0 && rate.is_finite() {
        serializer.serialize_i64(*rate as i64)
    } else {
        serializer.serialize_f64(*rate)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn movie() -> Movie {
        Movie {
            id: "m-1".into(),
            title: "Inception".into(),
            year: 2010,
            director: "Christopher Nolan".into(),
            duration: 148,
            rate: 8.8,
            poster: "https://example.com/inception.jpg".into(),
            genre: vec![Genre::Action, Genre::SciFi],
        }
    }

    #[test]
    fn apply_overlays_only_present_fields() {
        let mut m = movie();
        m.apply(MoviePatch { year: Some(2020), ..Default::default() });

        let expected = Movie { year: 2020, ..movie() };
        assert_eq!(m, expected);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut m = movie();
        let patch = MoviePatch::default();
        assert!(patch.is_empty());
        m.apply(patch);
        assert_eq!(m, movie());
    }

    #[test]
    fn serializes_in_record_order_with_integral_rate() {
        let m = Movie { rate: 5.0, ..movie() };
        let text = serde_json::to_string(&m).unwrap();
        assert_eq!(
            text,
            r#"{"id":"m-1","title":"Inception","year":2010,"director":"Christopher Nolan","duration":148,"rate":5,"poster":"https://example.com/inception.jpg","genre":["Action","Sci-Fi"]}"#
        );
        assert_eq!(serde_json::to_value(&movie()).unwrap()["rate"], json!(8.8));
    }

    #[test]
    fn genre_lookup_is_exact_but_matching_is_not() {
        assert_eq!(Genre::from_name("Sci-Fi"), Some(Genre::SciFi));
        assert_eq!(Genre::from_name("comedy"), None);
        assert!(Genre::Comedy.matches("cOmEdY"));
        assert!(movie().has_genre("sci-fi"));
        assert!(!movie().has_genre("drama"));
    }
}
