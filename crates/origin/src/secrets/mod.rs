//! TLS material bootstrap from AWS Secrets Manager.
//!
//! # Lifecycle
//!
//! 1. At startup, [`fetch_tls_material`] reads the certificate chain and the
//!    private key from Secrets Manager.
//! 2. [`materialize`] writes both to the configured local paths.
//! 3. The TLS listener is built from those files.
//!
//! Each step must succeed before the next one runs; a failure at any step
//! stops the process before it listens.
//!
//! # Security invariants
//!
//! - The private key is never logged or included in traces.
//! - On Unix the key file is created with mode `0600`.

pub mod source;

pub use source::{SecretSource, SecretsManagerSource};

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// PEM-encoded certificate chain and private key, as stored in Secrets Manager.
#[derive(Clone)]
pub struct TlsMaterial {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("cert_pem", &format_args!("{} bytes", self.cert_pem.len()))
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

/// Fetch the certificate chain and private key from `source`.
///
/// # Errors
///
/// Returns an error if either secret cannot be read or is empty.
pub async fn fetch_tls_material(
    source: &dyn SecretSource,
    cert_id: &str,
    key_id: &str,
) -> Result<TlsMaterial> {
    let cert_pem = source
        .secret_bytes(cert_id)
        .await
        .with_context(|| format!("failed to fetch TLS certificate secret {cert_id}"))?;
    let key_pem = source
        .secret_bytes(key_id)
        .await
        .with_context(|| format!("failed to fetch TLS key secret {key_id}"))?;

    if cert_pem.is_empty() {
        anyhow::bail!("TLS certificate secret {cert_id} is empty");
    }
    if key_pem.is_empty() {
        anyhow::bail!("TLS key secret {key_id} is empty");
    }

    info!(cert_id, key_id, "TLS material fetched");
    Ok(TlsMaterial { cert_pem, key_pem })
}

/// Write `material` to `cert_path` and `key_path`, replacing existing files.
///
/// # Errors
///
/// Returns an error if a parent directory cannot be created or either file
/// cannot be written.
pub async fn materialize(material: &TlsMaterial, cert_path: &Path, key_path: &Path) -> Result<()> {
    write_file(cert_path, &material.cert_pem, 0o644)
        .await
        .with_context(|| format!("failed to write TLS certificate to {}", cert_path.display()))?;
    write_file(key_path, &material.key_pem, 0o600)
        .await
        .with_context(|| format!("failed to write TLS key to {}", key_path.display()))?;

    info!(
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "TLS material written"
    );
    Ok(())
}

async fn write_file(path: &Path, contents: &[u8], mode: u32) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    // `mode` only applies on creation, so an existing file is narrowed before
    // any bytes are written to it.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options.mode(mode);
        match tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}
