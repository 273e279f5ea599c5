//! [`ObjectStore`] backed by Amazon S3.

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
use aws_smithy_types::date_time::Format;

use super::{ObjectMetadata, ObjectStore, StorageError, StoredObject};

/// Reads objects with S3 `GetObject`, which returns metadata and the content
/// stream in a single round trip.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;

        let metadata = metadata_from(&output);
        Ok(StoredObject {
            metadata,
            body: Box::pin(output.body.into_async_read()),
        })
    }
}

fn metadata_from(output: &GetObjectOutput) -> ObjectMetadata {
    ObjectMetadata {
        content_type: output.content_type().map(str::to_owned),
        cache_control: output.cache_control().map(str::to_owned),
        content_length: output
            .content_length()
            .and_then(|len| u64::try_from(len).ok()),
        etag: output.e_tag().map(str::to_owned),
        last_modified: output
            .last_modified()
            .and_then(|t| t.fmt(Format::HttpDate).ok()),
    }
}

/// Separate "no such key" from every other `GetObject` failure.
///
/// A bare 404 also counts: S3 omits the error body on some responses.
fn classify(err: SdkError<GetObjectError>) -> StorageError {
    let missing = err
        .as_service_error()
        .is_some_and(GetObjectError::is_no_such_key)
        || err
            .raw_response()
            .is_some_and(|r| r.status().as_u16() == 404);

    if missing {
        StorageError::NotFound
    } else {
        StorageError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::types::error::{InvalidObjectState, NoSuchKey};
    use aws_smithy_runtime_api::http::{Response, StatusCode};
    use aws_smithy_types::body::SdkBody;
    use aws_smithy_types::DateTime;

    fn raw_response(status: u16) -> Response {
        Response::new(StatusCode::try_from(status).unwrap(), SdkBody::empty())
    }

    #[test]
    fn no_such_key_is_not_found() {
        let err = SdkError::service_error(
            GetObjectError::NoSuchKey(NoSuchKey::builder().build()),
            raw_response(404),
        );
        assert!(matches!(classify(err), StorageError::NotFound));
    }

    #[test]
    fn other_service_errors_are_upstream() {
        let err = SdkError::service_error(
            GetObjectError::InvalidObjectState(InvalidObjectState::builder().build()),
            raw_response(403),
        );
        assert!(matches!(classify(err), StorageError::Upstream(_)));
    }

    #[test]
    fn metadata_is_copied_from_output() {
        let output = GetObjectOutput::builder()
            .content_type("text/css")
            .cache_control("no-cache")
            .content_length(42)
            .e_tag("\"abc\"")
            .last_modified(DateTime::from_secs(0))
            .build();
        let meta = metadata_from(&output);
        assert_eq!(meta.content_type.as_deref(), Some("text/css"));
        assert_eq!(meta.cache_control.as_deref(), Some("no-cache"));
        assert_eq!(meta.content_length, Some(42));
        assert_eq!(meta.etag.as_deref(), Some("\"abc\""));
        assert_eq!(
            meta.last_modified.as_deref(),
            Some("Thu, 01 Jan 1970 00:00:00 GMT")
        );
    }

    #[test]
    fn negative_content_length_is_dropped() {
        let output = GetObjectOutput::builder().content_length(-1).build();
        assert_eq!(metadata_from(&output).content_length, None);
    }
}
