//! Configuration loading and validation for the origin server.
//!
//! All values are read from environment variables at startup. Every variable
//! has a default, so an empty environment is a valid configuration; invalid
//! values stop the process before anything is fetched or bound.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;

use crate::server::middleware::REQUEST_TIMEOUT;

/// Validated origin server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTPS server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where the PEM certificate chain is written before the listener starts.
    #[serde(default = "default_tls_cert_path")]
    pub tls_cert_path: String,

    /// Where the PEM private key is written before the listener starts.
    #[serde(default = "default_tls_key_path")]
    pub tls_key_path: String,

    /// Secrets Manager id (name or ARN) holding the PEM certificate chain.
    #[serde(default = "default_tls_cert_secret_id")]
    pub tls_cert_secret_id: String,

    /// Secrets Manager id (name or ARN) holding the PEM private key.
    #[serde(default = "default_tls_key_secret_id")]
    pub tls_key_secret_id: String,

    /// Value of `Access-Control-Allow-Origin` on every response.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    /// Deadline (seconds) for opening an object in S3. Must be below the
    /// router's request timeout.
    #[serde(default = "default_storage_timeout")]
    pub storage_timeout_secs: u64,

    /// Use the object's own `Cache-Control` metadata, when it has one, instead
    /// of the extension-based policy.
    #[serde(default)]
    pub prefer_object_cache_control: bool,

    /// Endpoint override for S3 and Secrets Manager (e.g. a local emulator).
    #[serde(default)]
    pub aws_endpoint_url: Option<String>,

    /// OTLP collector endpoint. Spans are only exported when this is set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    443
}
fn default_tls_cert_path() -> String {
    "cert.crt".into()
}
fn default_tls_key_path() -> String {
    "key.key".into()
}
fn default_tls_cert_secret_id() -> String {
    "web-origin-cert".into()
}
fn default_tls_key_secret_id() -> String {
    "web-origin-key".into()
}
fn default_allowed_origin() -> String {
    "https://george.black".into()
}
fn default_storage_timeout() -> u64 {
    20
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            tls_cert_path: default_tls_cert_path(),
            tls_key_path: default_tls_key_path(),
            tls_cert_secret_id: default_tls_cert_secret_id(),
            tls_key_secret_id: default_tls_key_secret_id(),
            allowed_origin: default_allowed_origin(),
            storage_timeout_secs: default_storage_timeout(),
            prefer_object_cache_control: false,
            aws_endpoint_url: None,
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// validation fails.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Per-request storage deadline.
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.tls_cert_path, "TLS_CERT_PATH")?;
        ensure_non_empty(&self.tls_key_path, "TLS_KEY_PATH")?;
        ensure_non_empty(&self.tls_cert_secret_id, "TLS_CERT_SECRET_ID")?;
        ensure_non_empty(&self.tls_key_secret_id, "TLS_KEY_SECRET_ID")?;

        if self.tls_cert_path == self.tls_key_path {
            anyhow::bail!("TLS_CERT_PATH and TLS_KEY_PATH must name different files");
        }
        if self.storage_timeout_secs == 0 {
            anyhow::bail!("STORAGE_TIMEOUT_SECS must be > 0");
        }
        if self.storage_timeout() >= REQUEST_TIMEOUT {
            anyhow::bail!(
                "STORAGE_TIMEOUT_SECS must be below the {}s request timeout",
                REQUEST_TIMEOUT.as_secs()
            );
        }
        HeaderValue::from_str(&self.allowed_origin)
            .context("ALLOWED_ORIGIN must be a valid header value")?;
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 443);
        assert_eq!(cfg.tls_cert_path, "cert.crt");
        assert_eq!(cfg.tls_key_path, "key.key");
        assert_eq!(cfg.tls_cert_secret_id, "web-origin-cert");
        assert_eq!(cfg.tls_key_secret_id, "web-origin-key");
        assert_eq!(cfg.allowed_origin, "https://george.black");
        assert_eq!(cfg.storage_timeout(), Duration::from_secs(20));
        assert!(!cfg.prefer_object_cache_control);
        assert!(cfg.aws_endpoint_url.is_none());
        assert!(cfg.otel_exporter_otlp_endpoint.is_none());
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn port_override_is_read() {
        let cfg: Config = config::Config::builder()
            .set_override("port", "8443")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.port, 8443);
        assert_eq!(cfg.tls_cert_path, "cert.crt");
    }

    #[test]
    fn validate_rejects_empty_secret_id() {
        let cfg = Config {
            tls_key_secret_id: "  ".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_shared_tls_path() {
        let cfg = Config {
            tls_key_path: "cert.crt".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let cfg = Config {
            storage_timeout_secs: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_timeout_at_or_above_request_timeout() {
        for secs in [REQUEST_TIMEOUT.as_secs(), REQUEST_TIMEOUT.as_secs() + 60] {
            let cfg = Config {
                storage_timeout_secs: secs,
                ..Config::default()
            };
            assert!(cfg.validate().is_err(), "{secs}s accepted");
        }
    }

    #[test]
    fn default_timeout_is_below_request_timeout() {
        assert!(Config::default().storage_timeout() < REQUEST_TIMEOUT);
    }

    #[test]
    fn validate_rejects_bad_origin() {
        let cfg = Config {
            allowed_origin: "https://example.com\n".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }
}
