//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - TLS key material never appears in any span attribute or log field.
//! - Upstream error detail goes to logs only, never to response bodies.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
