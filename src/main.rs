//! marquee binary: load configuration and the seed collection, then serve
//! until SIGTERM or Ctrl-C.

use marquee::{Config, CorsGate, LogFormat, MovieStore, Server, routes};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing(config.log_format);

    let store = match &config.seed_path {
        Some(path) => MovieStore::from_path(path)?,
        None => MovieStore::builtin()?,
    };
    info!(movies = store.len(), seed = ?config.seed_path, "collection loaded");

    let state = routes::AppState::new(store, CorsGate::new(config.allowed_origins.clone()));

    Server::bind(config.socket_addr()?)
        .await?
        .with_body_limit(config.max_body_bytes)
        .serve(routes::app(state))
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
