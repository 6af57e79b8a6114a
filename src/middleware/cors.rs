//! CORS origin gate.
//!
//! Browsers only need `Access-Control-Allow-Origin` when a page from another
//! origin calls the API. The gate echoes the request's `Origin` back when it
//! is on the allow-list and leaves the response untouched otherwise.
//! Status and body are never changed.

use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";
pub const ALLOW_METHODS: &str = "access-control-allow-methods";

/// Methods advertised to preflight requests.
pub const ALLOWED_METHODS: &str = "GET, POST, PATCH, DELETE";

/// Origins trusted out of the box.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "http://localhost:3000",
    "http://movies.com",
];

#[derive(Clone, Debug)]
pub struct CorsGate {
    origins: Vec<String>,
}

impl CorsGate {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { origins: origins.into_iter().map(Into::into).collect() }
    }

    /// A missing origin (same-origin or non-browser caller) is accepted.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        origin.is_none_or(|o| self.origins.iter().any(|allowed| allowed == o))
    }

    /// Echoes an allowed `Origin` onto `res`.
    pub fn apply(&self, req: &Request, res: Response) -> Response {
        match req.header("origin") {
            Some(origin) if self.allows(Some(origin)) => res.with_header(ALLOW_ORIGIN, origin),
            _ => res,
        }
    }

    /// Answers an `OPTIONS` preflight: always `200` with an empty body.
    pub fn preflight(&self, req: &Request) -> Response {
        let origin = req.header("origin");
        if !self.allows(origin) {
            return Response::status(Status::Ok);
        }
        let res = Response::status(Status::Ok).with_header(ALLOW_METHODS, ALLOWED_METHODS);
        match origin {
            Some(origin) => res.with_header(ALLOW_ORIGIN, origin),
            None => res,
        }
    }
}

impl Default for CorsGate {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ORIGINS.iter().copied())
    }
}
