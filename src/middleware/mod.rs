//! Cross-cutting request/response concerns.
//!
//! - [`cors`]: the origin allow-list gate applied by the browser-facing
//!   movie handlers.
//!
//! Per-request tracing (method, path, status, latency) is emitted by the
//! server's dispatch loop.

pub mod cors;
