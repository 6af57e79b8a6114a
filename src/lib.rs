//! # marquee
//!
//! A small HTTP resource server for a single in-memory collection of movies.
//!
//! The collection is loaded once at startup from a static JSON seed and lives
//! in memory for the life of the process. Requests list, filter, fetch,
//! create, patch and delete records; every write is validated first.
//!
//! ## Layout
//!
//! - [`validate`]: full and partial schema checks for movie payloads
//! - [`store`]: the ordered, lock-guarded collection
//! - [`routes`]: the `/movies` handlers and [`routes::app`]
//! - [`middleware::cors`]: the origin allow-list gate
//! - [`Router`], [`Server`]: radix-tree routing over hyper, graceful shutdown
//!
//! ## Running it
//!
//! ```rust,no_run
//! use marquee::{Config, CorsGate, MovieStore, Server, routes};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let state = routes::AppState::new(
//!         MovieStore::builtin()?,
//!         CorsGate::new(config.allowed_origins.clone()),
//!     );
//!
//!     Server::bind(config.socket_addr()?).await?
//!         .serve(routes::app(state))
//!         .await?;
//!     Ok(())
//! }
//! ```

mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod movie;
pub mod routes;
pub mod store;
pub mod validate;

pub use crate::config::{Config, LogFormat};
pub use error::{ApiError, Error};
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use middleware::cors::CorsGate;
pub use movie::{Genre, Movie, MoviePatch, NewMovie};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use store::{MovieStore, NotFound};
pub use validate::{FieldIssue, IssueCode, ValidationError, validate_full, validate_partial};
