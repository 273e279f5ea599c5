//! TLS listener setup using rustls, and the HTTPS accept loop.
//!
//! The certificate and private key are the files written by
//! [`crate::secrets::materialize`] at startup.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::Request, Router};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use rustls::ServerConfig;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt;
use tracing::{debug, error};

/// Build a [`rustls::ServerConfig`] from PEM-encoded certificate and private key bytes.
///
/// Uses the `ring` provider explicitly; the AWS SDK enables a second rustls
/// provider, so the process-level default cannot be inferred. ALPN advertises
/// `h2` and `http/1.1`.
///
/// # Errors
///
/// Returns an error if the certificate or key cannot be parsed, or if rustls
/// rejects the configuration.
pub fn build_server_config(cert_pem: &[u8], key_pem: &[u8]) -> Result<Arc<ServerConfig>> {
    let certs = rustls_pemfile::certs(&mut std::io::BufReader::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to parse TLS certificate chain")?;
    if certs.is_empty() {
        anyhow::bail!("no certificate found in PEM data");
    }

    let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(key_pem))
        .context("failed to read TLS private key")?
        .context("no private key found in PEM data")?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .context("ring provider does not support the default TLS versions")?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("failed to build rustls ServerConfig")?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

/// Read the PEM files at `cert_path` and `key_path` and build a [`ServerConfig`].
///
/// # Errors
///
/// Returns an error if either file cannot be read or
/// [`build_server_config`] fails.
pub async fn load_server_config(cert_path: &Path, key_path: &Path) -> Result<Arc<ServerConfig>> {
    let cert_pem = tokio::fs::read(cert_path)
        .await
        .with_context(|| format!("failed to read {}", cert_path.display()))?;
    let key_pem = tokio::fs::read(key_path)
        .await
        .with_context(|| format!("failed to read {}", key_path.display()))?;
    build_server_config(&cert_pem, &key_pem)
}

/// Accept loop: terminate TLS on each connection and serve `router` over
/// HTTP/1.1 or HTTP/2.
///
/// Runs until the process is killed. Every connection is handled on its own
/// task; handshake and connection errors only end that connection.
pub async fn serve(listener: TcpListener, tls: Arc<ServerConfig>, router: Router) -> Result<()> {
    let acceptor = TlsAcceptor::from(tls);

    loop {
        let (tcp, peer_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!(error = %e, "accept error");
                continue;
            }
        };

        let acceptor = acceptor.clone();
        let router = router.clone();
        tokio::spawn(async move {
            let stream = match acceptor.accept(tcp).await {
                Ok(s) => s,
                Err(e) => {
                    debug!(%peer_addr, error = %e, "TLS handshake failed");
                    return;
                }
            };

            let service = hyper::service::service_fn(move |req: Request<Incoming>| {
                router.clone().oneshot(req)
            });

            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!(%peer_addr, error = %e, "connection closed with error");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_PEM: &[u8] = include_bytes!("../../testdata/localhost.crt");
    const KEY_PEM: &[u8] = include_bytes!("../../testdata/localhost.key");

    #[test]
    fn builds_from_valid_pem() {
        let config = build_server_config(CERT_PEM, KEY_PEM).unwrap();
        assert_eq!(
            config.alpn_protocols,
            vec![b"h2".to_vec(), b"http/1.1".to_vec()]
        );
    }

    #[test]
    fn rejects_key_without_certificate() {
        assert!(build_server_config(b"", KEY_PEM).is_err());
        assert!(build_server_config(CERT_PEM, b"").is_err());
    }

    #[tokio::test]
    async fn loads_materialized_files() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.crt");
        let key = dir.path().join("key.key");
        std::fs::write(&cert, CERT_PEM).unwrap();
        std::fs::write(&key, KEY_PEM).unwrap();

        let config = load_server_config(&cert, &key).await.unwrap();
        assert_eq!(config.alpn_protocols.len(), 2);
    }

    #[test]
    fn rejects_empty_cert_pem() {
        let result = build_server_config(b"", b"");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_garbage_pem() {
        let result = build_server_config(b"not a pem", b"also not a pem");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn load_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_server_config(&dir.path().join("cert.crt"), &dir.path().join("key.key"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cert.crt"));
    }
}
