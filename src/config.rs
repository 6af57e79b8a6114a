//! Service configuration.
//!
//! Layered, later wins: built-in defaults, an optional `marquee.{toml,yaml,json}`
//! in the working directory, `MARQUEE_*` environment variables, then `PORT`.
//!
//! ```text
//! PORT=8080
//! MARQUEE_HOST=127.0.0.1
//! MARQUEE_ALLOWED_ORIGINS=http://localhost:8080,http://movies.com
//! MARQUEE_SEED_PATH=./data/movies.json
//! MARQUEE_LOG_FORMAT=json
//! MARQUEE_MAX_BODY_BYTES=102400
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::middleware::cors::DEFAULT_ALLOWED_ORIGINS;
use crate::server::DEFAULT_MAX_BODY_BYTES;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Interface to listen on.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins that receive CORS headers.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// JSON array to load the collection from. The bundled seed when unset.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Largest request body accepted; bigger ones get `413`.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            seed_path: None,
            log_format: LogFormat::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    /// Reads the file and environment layers on top of the defaults.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("marquee").required(false))
            .add_source(
                config::Environment::with_prefix("MARQUEE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("port", std::env::var("PORT").ok())?
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_allowed_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
}
