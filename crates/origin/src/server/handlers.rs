//! The origin request handler: method dispatch, object lookup, header
//! derivation, and body streaming.

use std::borrow::Cow;
use std::io::Cursor;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CACHE_CONTROL,
            CONTENT_LENGTH, CONTENT_TYPE, ETAG, HOST, LAST_MODIFIED,
        },
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};
use bytes::{Bytes, BytesMut};
use common::{cache_policy, resolve, ObjectKey, OriginError};
use percent_encoding::percent_decode_str;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use super::state::AppState;
use crate::storage::{ObjectMetadata, ObjectReader, StorageError, StoredObject};

/// Value of both `Allow` and `Access-Control-Allow-Methods`.
pub const ALLOWED_METHODS: &str = "GET, OPTIONS";

/// Size of the read that must succeed before the response status is committed.
const FIRST_CHUNK_LEN: usize = 8 * 1024;

/// Catch-all handler for every method and path.
///
/// The path is percent-decoded and resolved to an object key; a path that
/// does not decode to UTF-8 is resolved as received. The bucket is the
/// request host without its port.
pub async fn origin(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let raw = uri.path();
    let path = percent_decode_str(raw).decode_utf8().unwrap_or(Cow::Borrowed(raw));
    let key = resolve(&path);
    let bucket = request_host(&headers, &uri).map(|h| bucket_name(&h));

    let mut response = match serve(&state, &key, &method, bucket.as_deref()).await {
        Ok(resp) => resp,
        Err(e) => {
            match &e {
                OriginError::Upstream(_) => {
                    warn!(bucket = ?bucket, key = %key, error = %e, "failed to serve object");
                }
                _ => debug!(bucket = ?bucket, key = %key, error = %e, "request rejected"),
            }
            error_response(&e)
        }
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, state.allow_origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    response
}

/// Answer a request for `key` in `bucket`.
///
/// `OPTIONS` and unsupported methods are answered without touching storage.
/// For `GET`, the object is opened and its first chunk read under
/// [`AppState::storage_timeout`]; failures up to that point become error
/// statuses. A failure after that aborts the body stream, which ends the
/// connection with a partial response.
///
/// # Errors
///
/// - [`OriginError::MethodNotAllowed`] for anything but `GET` / `OPTIONS`.
/// - [`OriginError::NotFound`] if there is no host or no such object.
/// - [`OriginError::Upstream`] for any other storage failure or timeout.
pub async fn serve(
    state: &AppState,
    key: &ObjectKey,
    method: &Method,
    bucket: Option<&str>,
) -> Result<Response, OriginError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    if method != Method::GET {
        return Err(OriginError::MethodNotAllowed);
    }
    let Some(bucket) = bucket.filter(|b| !b.is_empty()) else {
        return Err(OriginError::NotFound);
    };

    let opened = tokio::time::timeout(state.storage_timeout, open(state, bucket, key)).await;
    let (metadata, body) = match opened {
        Ok(result) => result?,
        Err(_) => {
            return Err(OriginError::Upstream(format!(
                "storage did not respond within {:?}",
                state.storage_timeout
            )))
        }
    };

    let mut response = Response::new(body);
    set_object_headers(
        response.headers_mut(),
        key,
        &metadata,
        state.prefer_object_cache_control,
    );
    Ok(response)
}

/// Open the object and read its first chunk, returning a body that replays
/// that chunk followed by the rest of the object.
async fn open(
    state: &AppState,
    bucket: &str,
    key: &ObjectKey,
) -> Result<(ObjectMetadata, Body), OriginError> {
    let StoredObject { metadata, body } = state.store.get_object(bucket, key.as_str()).await?;

    let (first, rest) = read_first_chunk(body)
        .await
        .map_err(|e| StorageError::Upstream(format!("failed to read object body: {e}")))?;

    let reader = Cursor::new(first).chain(rest);
    Ok((metadata, Body::from_stream(ReaderStream::new(reader))))
}

async fn read_first_chunk(mut body: ObjectReader) -> std::io::Result<(Bytes, ObjectReader)> {
    let mut first = BytesMut::with_capacity(FIRST_CHUNK_LEN);
    body.read_buf(&mut first).await?;
    Ok((first.freeze(), body))
}

/// Set `Content-Type`, `Cache-Control`, and the validators carried in `metadata`.
///
/// Metadata values that are not valid header values are skipped.
fn set_object_headers(
    headers: &mut HeaderMap,
    key: &ObjectKey,
    metadata: &ObjectMetadata,
    prefer_object_cache_control: bool,
) {
    let cache_control = metadata
        .cache_control
        .as_deref()
        .filter(|_| prefer_object_cache_control)
        .and_then(|v| HeaderValue::from_str(v).ok())
        .or_else(|| HeaderValue::from_str(&cache_policy::cache_control(key)).ok());
    if let Some(value) = cache_control {
        headers.insert(CACHE_CONTROL, value);
    }

    insert_metadata(headers, CONTENT_TYPE, metadata.content_type.as_deref());
    insert_metadata(headers, ETAG, metadata.etag.as_deref());
    insert_metadata(headers, LAST_MODIFIED, metadata.last_modified.as_deref());
    if let Some(len) = metadata.content_length {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    }
}

fn insert_metadata(headers: &mut HeaderMap, name: HeaderName, value: Option<&str>) {
    if let Some(value) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
        headers.insert(name, value);
    }
}

/// Plain-text error response carrying only the status phrase.
fn error_response(err: &OriginError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (
        status,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        err.status_phrase(),
    )
        .into_response();
    if matches!(err, OriginError::MethodNotAllowed) {
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    }
    response
}

/// `Host` header, or the URI authority for HTTP/2 requests.
fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|a| a.host().to_owned()))
}

/// Bucket name for `host`: port removed, lowercased.
fn bucket_name(host: &str) -> String {
    let name = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    };
    name.to_ascii_lowercase()
}
