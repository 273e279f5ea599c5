//! Request-path resolution, cache policy, and request errors shared by the
//! `origin` server.
//!
//! Nothing in this crate performs I/O.

pub mod cache_policy;
pub mod error;
pub mod key;

pub use error::OriginError;
pub use key::{resolve, ObjectKey};
