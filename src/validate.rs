//! Movie payload validation.
//!
//! Each field has one rule that turns a JSON value into its typed form or a
//! [`FieldIssue`]. [`validate_full`] and [`validate_partial`] run the same
//! rules and differ only in whether a missing field is an issue. Every
//! offending field is reported, not just the first.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::movie::{DEFAULT_RATE, Genre, MoviePatch, NewMovie};

pub const MIN_YEAR: u16 = 1900;
pub const MAX_YEAR: u16 = 2024;
pub const MAX_RATE: f64 = 10.0;

/// Machine-readable kind of a [`FieldIssue`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidType,
    TooSmall,
    TooBig,
    InvalidUrl,
    InvalidEnumValue,
    InvalidJson,
}

/// One problem with one field of a payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: IssueCode,
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self { field: field.into(), code, message: message.into() }
    }
}

/// A rejected payload, with one issue per offending field.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// A payload that could not be read as a JSON object at all.
    pub fn malformed(code: IssueCode, message: impl Into<String>) -> Self {
        Self { issues: vec![FieldIssue::new("body", code, message)] }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.issues.iter().map(|i| i.field.as_str()).collect();
        write!(f, "invalid movie payload ({})", fields.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Checks a creation payload. `rate` falls back to [`DEFAULT_RATE`].
/// Unknown keys, `id` included, are ignored.
pub fn validate_full(payload: &Value) -> Result<NewMovie, ValidationError> {
    let mut fields = Fields::new(payload, Presence::Required)?;

    let title = fields.take("title", rules::title);
    let year = fields.take("year", rules::year);
    let director = fields.take("director", rules::director);
    let duration = fields.take("duration", rules::duration);
    let rate = fields.take_optional("rate", rules::rate);
    let poster = fields.take("poster", rules::poster);
    let genre = fields.take("genre", rules::genre);

    match (title, year, director, duration, poster, genre) {
        (Some(title), Some(year), Some(director), Some(duration), Some(poster), Some(genre))
            if fields.is_clean() =>
        {
            Ok(NewMovie {
                title,
                year,
                director,
                duration,
                rate: rate.unwrap_or(DEFAULT_RATE),
                poster,
                genre,
            })
        }
        _ => Err(fields.into_error()),
    }
}

/// Checks a partial update. Absent fields stay `None`; no defaults apply.
pub fn validate_partial(payload: &Value) -> Result<MoviePatch, ValidationError> {
    let mut fields = Fields::new(payload, Presence::Optional)?;

    let patch = MoviePatch {
        title: fields.take("title", rules::title),
        year: fields.take("year", rules::year),
        director: fields.take("director", rules::director),
        duration: fields.take("duration", rules::duration),
        rate: fields.take("rate", rules::rate),
        poster: fields.take("poster", rules::poster),
        genre: fields.take("genre", rules::genre),
    };

    if fields.is_clean() { Ok(patch) } else { Err(fields.into_error()) }
}

// ── Field plumbing ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum Presence {
    Required,
    Optional,
}

/// Walks one payload object, collecting typed values and issues.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    presence: Presence,
    issues: Vec<FieldIssue>,
}

/// What a rule produces: a value, or issues keyed relative to the field.
type RuleResult<T> = Result<T, Vec<Violation>>;

/// A rule failure. `at` is an array index for per-element genre issues.
struct Violation {
    at: Option<usize>,
    code: IssueCode,
    message: String,
}

impl Violation {
    fn single(code: IssueCode, message: impl Into<String>) -> Vec<Violation> {
        vec![Violation { at: None, code, message: message.into() }]
    }
}

impl<'a> Fields<'a> {
    fn new(payload: &'a Value, presence: Presence) -> Result<Self, ValidationError> {
        match payload {
            Value::Object(object) => Ok(Self { object, presence, issues: Vec::new() }),
            other => Err(ValidationError::malformed(
                IssueCode::InvalidType,
                format!("Expected object, received {}", kind(other)),
            )),
        }
    }

    fn take<T>(&mut self, name: &'static str, rule: fn(&Value) -> RuleResult<T>) -> Option<T> {
        if !self.object.contains_key(name) && self.presence == Presence::Required {
            self.issues.push(FieldIssue::new(name, IssueCode::Required, rules::required_message(name)));
            return None;
        }
        self.take_optional(name, rule)
    }

    fn take_optional<T>(&mut self, name: &'static str, rule: fn(&Value) -> RuleResult<T>) -> Option<T> {
        let value = self.object.get(name)?;
        match rule(value) {
            Ok(v) => Some(v),
            Err(violations) => {
                self.issues.extend(violations.into_iter().map(|v| {
                    let field = match v.at {
                        Some(i) => format!("{name}[{i}]"),
                        None => name.to_owned(),
                    };
                    FieldIssue::new(field, v.code, v.message)
                }));
                None
            }
        }
    }

    fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn into_error(self) -> ValidationError {
        ValidationError { issues: self.issues }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Per-field rules ───────────────────────────────────────────────────────────

mod rules {
    use super::*;

    pub(super) fn required_message(field: &str) -> String {
        match field {
            "title" => "Movie title is required".to_owned(),
            "genre" => "Movie genre is required".to_owned(),
            other => format!("{other} is required"),
        }
    }

    fn string(value: &Value) -> RuleResult<&str> {
        value.as_str().ok_or_else(|| {
            Violation::single(IssueCode::InvalidType, format!("Expected string, received {}", kind(value)))
        })
    }

    fn integer(value: &Value) -> RuleResult<f64> {
        let Some(n) = value.as_f64() else {
            return Err(Violation::single(
                IssueCode::InvalidType,
                format!("Expected number, received {}", kind(value)),
            ));
        };
        if n.fract() != 0.0 {
            return Err(Violation::single(IssueCode::InvalidType, "Expected integer, received float"));
        }
        Ok(n)
    }

    pub(super) fn title(value: &Value) -> RuleResult<String> {
        let Some(title) = value.as_str() else {
            return Err(Violation::single(IssueCode::InvalidType, "Movie title must be a string"));
        };
        if title.is_empty() {
            return Err(Violation::single(IssueCode::TooSmall, "Movie title must not be empty"));
        }
        Ok(title.to_owned())
    }

    pub(super) fn year(value: &Value) -> RuleResult<u16> {
        let year = integer(value)?;
        if year < f64::from(MIN_YEAR) {
            return Err(Violation::single(
                IssueCode::TooSmall,
                format!("Year must be greater than or equal to {MIN_YEAR}"),
            ));
        }
        if year > f64::from(MAX_YEAR) {
            return Err(Violation::single(
                IssueCode::TooBig,
                format!("Year must be less than or equal to {MAX_YEAR}"),
            ));
        }
        Ok(year as u16)
    }

    pub(super) fn director(value: &Value) -> RuleResult<String> {
        string(value).map(str::to_owned)
    }

    pub(super) fn duration(value: &Value) -> RuleResult<u32> {
        let minutes = integer(value)?;
        if minutes <= 0.0 {
            return Err(Violation::single(IssueCode::TooSmall, "Duration must be greater than 0"));
        }
        if minutes > f64::from(u32::MAX) {
            return Err(Violation::single(
                IssueCode::TooBig,
                format!("Duration must be less than or equal to {}", u32::MAX),
            ));
        }
        Ok(minutes as u32)
    }

    pub(super) fn rate(value: &Value) -> RuleResult<f64> {
        let Some(rate) = value.as_f64() else {
            return Err(Violation::single(
                IssueCode::InvalidType,
                format!("Expected number, received {}", kind(value)),
            ));
        };
        if rate < 0.0 {
            return Err(Violation::single(IssueCode::TooSmall, "Rate must be greater than or equal to 0"));
        }
        if rate > MAX_RATE {
            return Err(Violation::single(IssueCode::TooBig, "Rate must be less than or equal to 10"));
        }
        Ok(rate)
    }

    pub(super) fn poster(value: &Value) -> RuleResult<String> {
        let poster = string(value)?;
        match Url::parse(poster) {
            Ok(_) => Ok(poster.to_owned()),
            Err(_) => Err(Violation::single(IssueCode::InvalidUrl, "Poster must be a valid URL")),
        }
    }

    pub(super) fn genre(value: &Value) -> RuleResult<Vec<Genre>> {
        let Some(items) = value.as_array() else {
            return Err(Violation::single(
                IssueCode::InvalidType,
                "Movie genre must be an array of enum genre",
            ));
        };
        if items.is_empty() {
            return Err(Violation::single(IssueCode::TooSmall, "Movie genre must not be empty"));
        }

        let mut genres = Vec::with_capacity(items.len());
        let mut violations = Vec::new();
        for (i, item) in items.iter().enumerate() {
            match item.as_str().map(|name| (name, Genre::from_name(name))) {
                Some((_, Some(genre))) => genres.push(genre),
                Some((name, None)) => violations.push(Violation {
                    at: Some(i),
                    code: IssueCode::InvalidEnumValue,
                    message: format!("Invalid genre `{name}`, expected one of {}", genre_list()),
                }),
                None => violations.push(Violation {
                    at: Some(i),
                    code: IssueCode::InvalidType,
                    message: format!("Expected string, received {}", kind(item)),
                }),
            }
        }

        if violations.is_empty() { Ok(genres) } else { Err(violations) }
    }

    fn genre_list() -> String {
        Genre::ALL.iter().map(|g| g.as_str()).collect::<Vec<_>>().join(", ")
    }
}
