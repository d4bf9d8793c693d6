//! Startup configuration.
//!
//! The database file path is the sole required parameter, taken as the first
//! command-line argument. Everything else comes from environment variables
//! with workable defaults:
//!
//! | Variable             | Default   | Description                          |
//! |----------------------|-----------|--------------------------------------|
//! | `GATEWAY_HOST`       | `0.0.0.0` | Listen address                       |
//! | `GATEWAY_PORT`       | `5001`    | Listen port                          |
//! | `GATEWAY_LOG`        | `info`    | log level (error/warn/info/debug)    |
//! | `GATEWAY_STATIC_DIR` | `static`  | Client asset directory for `GET /`   |
//! | `GATEWAY_TLS_CERT`   | unset     | PEM certificate chain (enables TLS)  |
//! | `GATEWAY_TLS_KEY`    | unset     | PEM private key (enables TLS)        |
//!
//! TLS is enabled only when both cert and key are present.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};

/// Runtime configuration for the gateway process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file (must already exist).
    pub database: PathBuf,

    /// Listen address.
    pub host: String,

    /// Listen port.
    pub port: u16,

    /// Log filter string for `env_logger`.
    pub log_level: String,

    /// Directory served for the static client routes.
    pub static_dir: PathBuf,

    /// PEM certificate chain, paired with `tls_key`.
    pub tls_cert: Option<PathBuf>,

    /// PEM private key, paired with `tls_cert`.
    pub tls_key: Option<PathBuf>,
}

impl Config {
    /// Build the configuration from `std::env::args` and the environment.
    pub fn load() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(database) = args.next() else {
            bail!("usage: sqlite_gateway <database-file>");
        };
        Ok(Self::from_env(PathBuf::from(database)))
    }

    /// Environment-driven settings around a known database path.
    pub fn from_env(database: PathBuf) -> Self {
        Self {
            database,
            host: env_str("GATEWAY_HOST", "0.0.0.0"),
            port: env_parse("GATEWAY_PORT", 5001),
            log_level: env_str("GATEWAY_LOG", "info"),
            static_dir: PathBuf::from(env_str("GATEWAY_STATIC_DIR", "static")),
            tls_cert: env::var("GATEWAY_TLS_CERT").ok().map(PathBuf::from),
            tls_key: env::var("GATEWAY_TLS_KEY").ok().map(PathBuf::from),
        }
    }

    /// Certificate/key pair when TLS termination is requested.
    pub fn tls_material(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
