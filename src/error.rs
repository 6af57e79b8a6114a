//! Error types.
//!
//! [`Error`] covers infrastructure failures: binding, configuration and
//! loading the seed collection. They only happen at startup and are fatal.
//! Request-level outcomes are [`ApiError`]s, which render as JSON responses.

use serde::Serialize;
use serde_json::json;

use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::store::NotFound;
use crate::validate::{FieldIssue, ValidationError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned by marquee's fallible startup operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("seed data is not a JSON array: {0}")]
    SeedJson(#[from] serde_json::Error),

    #[error("seed record {index} has no string `id`")]
    SeedMissingId { index: usize },

    #[error("seed record {index} is invalid: {source}")]
    SeedRecord {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("duplicate movie id `{0}` in seed data")]
    DuplicateId(String),
}

/// A request that could not be served as asked.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFound),
}

/// `400` body. Issues keep their declared key order on the wire.
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a [FieldIssue],
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => {
                (Status::BadRequest, Json(ErrorBody { error: e.issues() })).into_response()
            }
            ApiError::NotFound(e) => {
                (Status::NotFound, Json(json!({ "message": e.to_string() }))).into_response()
            }
        }
    }
}
