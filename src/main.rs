//! Gateway server entrypoint.
//!
//! Loads configuration, verifies the database file exists (refusing to start
//! otherwise), then serves the API plus the static client until shutdown.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context, Result};
use log::info;

use sqlite_gateway::config::Config;
use sqlite_gateway::db;
use sqlite_gateway::handlers::{self, AppState};

#[actix_web::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.log_level),
    )
    .init();

    // The database file must already exist; the gateway never creates one.
    if let Err(e) = db::ensure_exists(&config.database) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }

    info!(
        "gateway v{} serving {} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.database.display(),
        config.host,
        config.port
    );

    let state = web::Data::new(AppState {
        database: config.database.clone(),
    });
    let static_dir = config.static_dir.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    });

    let bind_addr = (config.host.as_str(), config.port);
    let server = match config.tls_material() {
        Some((cert, key)) => {
            let tls = load_tls_config(cert, key)?;
            info!("TLS termination enabled");
            server.bind_rustls_0_23(bind_addr, tls)?
        }
        None => server.bind(bind_addr)?,
    };

    server.run().await?;
    Ok(())
}

/// Build a rustls server config from PEM certificate chain and private key.
fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<rustls::ServerConfig> {
    let mut cert_reader = BufReader::new(
        File::open(cert_path)
            .with_context(|| format!("cannot open certificate {}", cert_path.display()))?,
    );
    let certs = rustls_pemfile::certs(&mut cert_reader)
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("cannot parse certificate {}", cert_path.display()))?;

    let mut key_reader = BufReader::new(
        File::open(key_path)
            .with_context(|| format!("cannot open private key {}", key_path.display()))?,
    );
    let key = rustls_pemfile::private_key(&mut key_reader)
        .with_context(|| format!("cannot parse private key {}", key_path.display()))?
        .ok_or_else(|| anyhow!("no private key found in {}", key_path.display()))?;

    rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("invalid TLS certificate/key pair")
}
