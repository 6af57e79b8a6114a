//! The `/movies` resource.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `GET` | `/movies[?genre=]` | [`list_movies`] |
//! | `POST` | `/movies` | [`create_movie`] |
//! | `GET` | `/movies/{id}` | [`get_movie`] |
//! | `DELETE` | `/movies/{id}` | [`delete_movie`] |
//! | `PATCH` | `/movies/{id}` | [`patch_movie`] |
//! | `OPTIONS` | `/movies/{id}` | [`preflight`] |
//!
//! Plus `/healthz` and `/readyz` from [`health`](crate::health).

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::health;
use crate::method::Method;
use crate::middleware::cors::CorsGate;
use crate::movie::Movie;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;
use crate::store::{MovieStore, NotFound};
use crate::validate::{IssueCode, ValidationError, validate_full, validate_partial};

/// Everything a handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MovieStore>,
    pub cors: Arc<CorsGate>,
}

impl AppState {
    pub fn new(store: MovieStore, cors: CorsGate) -> Self {
        Self { store: Arc::new(store), cors: Arc::new(cors) }
    }
}

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

/// Builds the application router over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .on(Method::Get,     "/movies",      with_state(&state, list_movies))
        .on(Method::Post,    "/movies",      with_state(&state, create_movie))
        .on(Method::Get,     "/movies/{id}", with_state(&state, get_movie))
        .on(Method::Delete,  "/movies/{id}", with_state(&state, delete_movie))
        .on(Method::Patch,   "/movies/{id}", with_state(&state, patch_movie))
        .on(Method::Options, "/movies/{id}", with_state(&state, preflight))
        .on(Method::Get,     "/healthz",     health::liveness)
        .on(Method::Get,     "/readyz",      with_state(&state, health::readiness))
}

/// Adapts `async fn(AppState, Request)` into a router handler that clones
/// the shared state into every call.
fn with_state<F, Fut>(state: &AppState, f: F) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(AppState, Request) -> Fut + Send + Sync + 'static,
{
    let state = state.clone();
    move |req| f(state.clone(), req)
}

/// `GET /movies`, optionally narrowed by a non-empty `genre` query parameter.
pub async fn list_movies(state: AppState, req: Request) -> Response {
    let movies = match req.query_param("genre").filter(|g| !g.is_empty()) {
        Some(genre) => {
            let movies = state.store.filter_by_genre(&genre);
            debug!(%genre, matched = movies.len(), "filtered movies");
            movies
        }
        None => state.store.list(),
    };
    state.cors.apply(&req, Json(movies).into_response())
}

/// `GET /movies/{id}`
pub async fn get_movie(state: AppState, req: Request) -> Response {
    let res = match state.store.find_by_id(movie_id(&req)) {
        Some(movie) => Json(movie).into_response(),
        None => ApiError::from(NotFound).into_response(),
    };
    state.cors.apply(&req, res)
}

/// `POST /movies`: validate the full schema, then store under a new id.
pub async fn create_movie(state: AppState, req: Request) -> Result<(Status, Json<Movie>), ApiError> {
    let payload = json_body(&req)?;
    let new = validate_full(&payload).inspect_err(|e| warn!("rejected new movie: {e}"))?;
    let movie = state.store.insert(new);
    info!(id = %movie.id, title = %movie.title, "movie created");
    Ok((Status::Created, Json(movie)))
}

/// `DELETE /movies/{id}`
pub async fn delete_movie(state: AppState, req: Request) -> Response {
    let id = movie_id(&req);
    let res = match state.store.delete_by_id(id) {
        Ok(()) => {
            info!(%id, "movie deleted");
            Json(Message { message: "Movie deleted" }).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    };
    state.cors.apply(&req, res)
}

/// `PATCH /movies/{id}`: the payload is validated before the id is looked up.
pub async fn patch_movie(state: AppState, req: Request) -> Result<Json<Movie>, ApiError> {
    let payload = json_body(&req)?;
    let patch = validate_partial(&payload).inspect_err(|e| warn!("rejected movie patch: {e}"))?;
    let movie = state.store.patch_by_id(movie_id(&req), patch)?;
    info!(id = %movie.id, "movie updated");
    Ok(Json(movie))
}

/// `OPTIONS /movies/{id}`
pub async fn preflight(state: AppState, req: Request) -> Response {
    state.cors.preflight(&req)
}

fn movie_id(req: &Request) -> &str {
    req.param("id").unwrap_or_default()
}

/// Parses the body as JSON. An empty body reads as `{}`, so the schema
/// reports each missing field; an unparsable one fails on the body as a whole.
fn json_body(req: &Request) -> Result<Value, ValidationError> {
    if req.body().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(req.body())
        .map_err(|e| ValidationError::malformed(IssueCode::InvalidJson, format!("Malformed JSON: {e}")))
}
