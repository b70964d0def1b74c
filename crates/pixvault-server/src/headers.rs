//! Request-header parsing for the picture API.
//!
//! Everything here turns raw header values into the domain types the
//! pipelines consume; nothing touches storage.

use axum::http::HeaderMap;

use pixvault_index::RangeSpec;
use pixvault_types::{ConditionalToken, ContentId};

use crate::error::ApiError;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Parse a conditional validator header (`If-Match` / `If-None-Match`).
///
/// Returns `None` when the header is absent. A malformed value is treated
/// as absent rather than rejected: conditional headers are advisory and the
/// write path has its own required-validator check.
pub fn conditional(headers: &HeaderMap, name: &str) -> Option<ConditionalToken> {
    let raw = header_str(headers, name)?;
    ConditionalToken::parse(raw).ok()
}

/// Parse the `Content-Digest` header, requiring the `sha-256` algorithm.
///
/// Accepts the structured form `sha-256=:<hex>:` and the bare
/// `sha-256=<hex>` variant. `Ok(None)` means the header is absent;
/// a present but unusable value is a 400.
pub fn content_digest(headers: &HeaderMap) -> Result<Option<ContentId>, ApiError> {
    let Some(raw) = header_str(headers, "content-digest") else {
        return Ok(None);
    };
    let value = raw
        .split(',')
        .map(str::trim)
        .find_map(|entry| entry.strip_prefix("sha-256="))
        .ok_or_else(|| ApiError::BadRequest(format!("unsupported digest algorithm: {raw}")))?;
    let hex_str = value.trim_matches(':');
    let id = ContentId::from_hex(hex_str)
        .map_err(|e| ApiError::BadRequest(format!("malformed Content-Digest: {e}")))?;
    Ok(Some(id))
}

/// Parse the `Content-Encoding` header value (not the encoding itself —
/// that is the store's job; this only extracts the string).
pub fn content_encoding(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, "content-encoding")
}

/// The request's `Content-Type`, with any parameters stripped.
pub fn content_type(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, "content-type").map(|v| v.split(';').next().unwrap_or("").trim())
}

/// The `Origin` header, used to build the `Location` response header.
pub fn origin(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, "origin").filter(|v| !v.is_empty())
}

/// Parse the listing `Range` header into offset windows.
pub fn range(headers: &HeaderMap) -> Result<Option<RangeSpec>, ApiError> {
    match header_str(headers, "range") {
        None => Ok(None),
        Some(raw) => RangeSpec::parse(raw).map(Some).map_err(ApiError::from),
    }
}

/// Format an identifier as a quoted strong ETag.
pub fn format_etag(id: &ContentId) -> String {
    format!("\"{}\"", id.to_hex())
}

/// Format an identifier as a `Content-Digest` response value.
pub fn format_content_digest(id: &ContentId) -> String {
    format!("sha-256=:{}:", id.to_hex())
}
