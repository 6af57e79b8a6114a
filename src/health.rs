//! Liveness and readiness probes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Is the collection loaded and serving? |

use serde::Serialize;

use crate::request::Request;
use crate::response::Json;
use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub movies: usize,
}

/// Always `200 {"status":"ok"}`. No dependencies: answering at all is the signal.
pub async fn liveness(_req: Request) -> Json<Liveness> {
    Json(Liveness { status: "ok" })
}

/// `200` with the current collection size. The store is loaded before the
/// listener opens, so any answer means ready.
pub async fn readiness(state: AppState, _req: Request) -> Json<Readiness> {
    Json(Readiness { status: "ready", movies: state.store.len() })
}
