//! Axum middleware settings applied to the router.
//!
//! Includes request tracing, timeout enforcement, and response compression.

use std::time::Duration;

/// Time allowed for a request to produce its response headers.
///
/// Body streaming is not bounded by this; a large object may take longer.
/// `STORAGE_TIMEOUT_SECS` must stay below this; the layer answers `408`.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

