//! Per-request error types.

use thiserror::Error;

/// Errors that end a single request.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`OriginError::NotFound`] → 404
/// - [`OriginError::MethodNotAllowed`] → 405
/// - [`OriginError::Upstream`] → 500
///
/// None of these affect other requests; process-fatal startup failures are
/// reported separately by the binary.
#[derive(Debug, Error)]
pub enum OriginError {
    /// No object exists under the resolved key.
    #[error("object not found")]
    NotFound,

    /// The request used a method other than `GET` or `OPTIONS`.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The storage service failed for a reason other than a missing object.
    ///
    /// The message is for logs only and must never be written to a response body.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl OriginError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            OriginError::NotFound => 404,
            OriginError::MethodNotAllowed => 405,
            OriginError::Upstream(_) => 500,
        }
    }

    /// Canonical reason phrase used as the plain-text response body.
    pub fn status_phrase(&self) -> &'static str {
        match self {
            OriginError::NotFound => "Not Found",
            OriginError::MethodNotAllowed => "Method Not Allowed",
            OriginError::Upstream(_) => "Internal Server Error",
        }
    }
}
