//! Read-only access to the object store holding the served assets.
//!
//! # Module invariants
//!
//! - Objects are only ever read; nothing here writes to or caches objects.
//! - "Not found" is always reported as [`StorageError::NotFound`] so that the
//!   HTTP layer can tell a missing asset from a failing store.

pub mod s3;

pub use s3::S3ObjectStore;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use common::OriginError;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Byte stream of an object's content. Dropping it releases the connection.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Errors produced by an [`ObjectStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The bucket has no object under the requested key.
    #[error("object not found")]
    NotFound,

    /// Any other failure: credentials, network, throttling, missing bucket.
    #[error("storage request failed: {0}")]
    Upstream(String),
}

impl From<StorageError> for OriginError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => OriginError::NotFound,
            StorageError::Upstream(msg) => OriginError::Upstream(msg),
        }
    }
}

/// Metadata returned alongside an object's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_length: Option<u64>,
    pub etag: Option<String>,
    /// Already formatted as an HTTP-date.
    pub last_modified: Option<String>,
}

/// An opened object: its metadata and a reader over its content.
pub struct StoredObject {
    pub metadata: ObjectMetadata,
    pub body: ObjectReader,
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Source of the objects served by the origin.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open `key` in `bucket`, returning its metadata and a content reader.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the key does not exist and
    /// [`StorageError::Upstream`] for every other failure.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_origin_errors() {
        assert!(matches!(
            OriginError::from(StorageError::NotFound),
            OriginError::NotFound
        ));
        let upstream = OriginError::from(StorageError::Upstream("timeout".into()));
        assert_eq!(upstream.http_status(), 500);
    }

    #[test]
    fn stored_object_debug_omits_body() {
        let obj = StoredObject {
            metadata: ObjectMetadata {
                content_type: Some("text/html".into()),
                ..Default::default()
            },
            body: Box::pin(std::io::Cursor::new(b"secret".to_vec())),
        };
        let dbg = format!("{obj:?}");
        assert!(dbg.contains("text/html"));
        assert!(!dbg.contains("secret"));
    }
}
