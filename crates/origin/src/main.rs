//! `origin` — HTTPS static origin binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise telemetry (JSON logs, optional OTLP export).
//! 3. Initialise AWS SDK clients.
//! 4. Fetch the TLS certificate and key from Secrets Manager.
//! 5. Write them to the configured local paths.
//! 6. Build the rustls config from those files.
//! 7. Build the Axum router and start the TLS server.
//!
//! A failure at any step ends the process before the listener is bound.

mod aws;
mod config;
mod secrets;
mod server;
mod storage;
mod telemetry;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use secrets::SecretsManagerSource;
use server::state::AppState;
use storage::S3ObjectStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "origin starting"
    );

    // -----------------------------------------------------------------------
    // 3. AWS clients
    // -----------------------------------------------------------------------
    let aws = aws::AwsClients::init(cfg.aws_endpoint_url.as_deref()).await;

    // -----------------------------------------------------------------------
    // 4–6. TLS material
    // -----------------------------------------------------------------------
    let cert_path = Path::new(&cfg.tls_cert_path);
    let key_path = Path::new(&cfg.tls_key_path);

    let material = secrets::fetch_tls_material(
        &SecretsManagerSource::new(aws.secretsmanager.clone()),
        &cfg.tls_cert_secret_id,
        &cfg.tls_key_secret_id,
    )
    .await?;
    secrets::materialize(&material, cert_path, key_path).await?;
    drop(material);

    let tls_config = server::tls::load_server_config(cert_path, key_path).await?;

    // -----------------------------------------------------------------------
    // 7. HTTPS server
    // -----------------------------------------------------------------------
    let store = Arc::new(S3ObjectStore::new(aws.s3.clone()));
    let state = AppState::new(store, &cfg)?;
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    server::tls::serve(listener, tls_config, router).await
}
