//! Axum HTTPS server, routing, and middleware.
//!
//! # Responsibilities
//! - Build the rustls listener from the materialized certificate and key.
//! - Define the single catch-all route and shared middleware.
//! - Resolve each request to an object key and stream the object back.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod tls;
