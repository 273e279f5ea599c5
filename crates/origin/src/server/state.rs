//! Shared application state injected into every Axum handler.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;

use crate::config::Config;
use crate::storage::ObjectStore;

/// Application state shared across all request handlers.
///
/// Read-only after startup; cloning it per request only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    /// Where assets are read from.
    pub store: Arc<dyn ObjectStore>,
    /// `Access-Control-Allow-Origin` value sent on every response.
    pub allow_origin: HeaderValue,
    /// Deadline for opening an object and reading its first chunk.
    pub storage_timeout: Duration,
    /// Prefer the object's own `Cache-Control` metadata over the extension policy.
    pub prefer_object_cache_control: bool,
}

impl AppState {
    /// Create a new [`AppState`] for `store` using the settings in `cfg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured allowed origin is not a valid header value.
    pub fn new(store: Arc<dyn ObjectStore>, cfg: &Config) -> Result<Self> {
        let allow_origin = HeaderValue::from_str(&cfg.allowed_origin)
            .context("ALLOWED_ORIGIN is not a valid header value")?;
        Ok(Self {
            store,
            allow_origin,
            storage_timeout: cfg.storage_timeout(),
            prefer_object_cache_control: cfg.prefer_object_cache_control,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("allow_origin", &self.allow_origin)
            .field("storage_timeout", &self.storage_timeout)
            .field("prefer_object_cache_control", &self.prefer_object_cache_control)
            .finish_non_exhaustive()
    }
}
