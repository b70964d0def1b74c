//! HTTP handlers for the picture API.
//!
//! Each handler validates headers in a fixed order (identity, media type,
//! digest, conditionals), then hands off to the blocking
//! [`PictureService`] pipelines via `spawn_blocking`.

use std::io::Read;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;

use pixvault_types::{Owner, RenditionKind};

use crate::error::ApiError;
use crate::headers;
use crate::service::{PictureService, Retrieval, UploadRequest};
use crate::session::SessionManager;

/// Shared state behind every handler.
pub struct AppState {
    pub service: PictureService,
    pub sessions: Arc<dyn SessionManager>,
    /// Normalized URL prefix, used when building `Location`.
    pub prefix: String,
    /// Ceiling on an uploaded body, applied to the encoded bytes at the
    /// transport layer and to the decoded stream during ingest.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct PictureQuery {
    /// Rendition selector: absent/`raw`, `thumb`, or `preview`.
    lev: Option<String>,
    /// `purge=1` on DELETE frees the name instead of hiding it.
    purge: Option<String>,
}

impl PictureQuery {
    fn kind(&self) -> Result<RenditionKind, ApiError> {
        // An unknown rendition names a resource that does not exist.
        RenditionKind::from_query(self.lev.as_deref()).map_err(|_| ApiError::NotFound)
    }

    fn is_purge(&self) -> bool {
        matches!(self.purge.as_deref(), Some("1") | Some("true"))
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Owner, ApiError> {
    state.sessions.resolve(headers).ok_or(ApiError::Unauthenticated)
}

async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::StorageUnavailable(e.to_string()))?
}

fn ok_envelope() -> Json<serde_json::Value> {
    Json(json!({ "code": 0, "msg": "" }))
}

/// Bridge a blocking blob reader into a response body.
///
/// The reader is moved onto the blocking pool and dropped (closing the
/// underlying resource) when it is exhausted, errors, or the receiving side
/// goes away because the client disconnected.
fn body_from_reader(mut reader: Box<dyn Read + Send>) -> Body {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Bytes, std::io::Error>>(8);
    tokio::task::spawn_blocking(move || {
        let mut buf = [0u8; 64 * 1024];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.blocking_send(Ok(Bytes::copy_from_slice(&buf[..n]))).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(Err(e));
                    break;
                }
            }
        }
    });
    Body::from_stream(ReceiverStream::new(rx))
}

/// `GET /` — list the owner's live pictures in creation order.
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let owner = authenticate(&state, &headers)?;
    let range = headers::range(&headers)?;

    let service = state.service.clone();
    let records = run_blocking(move || service.list(&owner, range.as_ref())).await?;

    let body = Json(json!({ "code": 0, "msg": "", "data": records }));
    Ok(([(header::VARY, "Cookie")], body).into_response())
}

/// `GET`/`HEAD /:name` — conditional retrieval of a picture or rendition.
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<PictureQuery>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let owner = authenticate(&state, &headers)?;
    let kind = query.kind()?;
    let cached = headers::conditional(&headers, "if-none-match");
    let head_only = method == Method::HEAD;

    let service = state.service.clone();
    let retrieval = run_blocking(move || {
        service.retrieve(&owner, &name, kind, head_only, cached.as_ref())
    })
    .await?;

    let response = match retrieval {
        Retrieval::NotModified => (
            StatusCode::NOT_MODIFIED,
            [(header::VARY, "Cookie".to_string())],
            Body::empty(),
        )
            .into_response(),
        Retrieval::Meta(meta) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, meta.content_type.to_string()),
                (header::CONTENT_LENGTH, meta.size.to_string()),
                (header::ETAG, headers::format_etag(&meta.etag)),
                (
                    header::HeaderName::from_static("content-digest"),
                    headers::format_content_digest(&meta.digest),
                ),
                (header::VARY, "Cookie".to_string()),
            ],
            Body::empty(),
        )
            .into_response(),
        Retrieval::Full(meta, handle) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, meta.content_type.to_string()),
                (header::CONTENT_LENGTH, meta.size.to_string()),
                (header::ETAG, headers::format_etag(&meta.etag)),
                (
                    header::HeaderName::from_static("content-digest"),
                    headers::format_content_digest(&meta.digest),
                ),
                (header::VARY, "Cookie".to_string()),
            ],
            body_from_reader(handle.reader),
        )
            .into_response(),
    };
    Ok(response)
}

/// `PUT /:name` — upload a new picture or replace an existing version.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<PictureQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let owner = authenticate(&state, &headers)?;

    // Only the original can be uploaded; renditions are derived via POST.
    if query.kind()?.is_derived() {
        return Err(ApiError::MethodNotAllowed);
    }

    match headers::content_type(&headers) {
        Some(ct) if ct.starts_with("image/") => {}
        _ => return Err(ApiError::UnsupportedMedia),
    }

    // The write path answers with an absolute Location; a client that
    // cannot name its origin gets refused up front.
    let origin = headers::origin(&headers)
        .ok_or_else(|| ApiError::BadRequest("Origin header required".to_string()))?
        .to_string();

    let digest = headers::content_digest(&headers)?.ok_or(ApiError::DigestMissing)?;
    let encoding = pixvault_store::TransferEncoding::from_header(headers::content_encoding(
        &headers,
    ))
    .map_err(ApiError::from)?;
    // A weak If-Match collapses to absent: it cannot authorize an overwrite.
    let claimed = headers::conditional(&headers, "if-match")
        .as_ref()
        .and_then(|t| t.normalize())
        .map(str::to_string);

    let location = format!("{origin}{}/{name}", state.prefix);

    let service = state.service.clone();
    let max_bytes = state.max_upload_bytes as u64;
    let upload_name = name.clone();
    let outcome = run_blocking(move || {
        let request = UploadRequest {
            encoding,
            digest,
            claimed,
            max_bytes,
        };
        let mut reader = &body[..];
        service.upload(&owner, &upload_name, &request, &mut reader)
    })
    .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        [
            (header::ETAG, headers::format_etag(&outcome.id)),
            (
                header::HeaderName::from_static("content-digest"),
                headers::format_content_digest(&outcome.id),
            ),
            (header::LOCATION, location),
            (header::VARY, "Cookie".to_string()),
        ],
        ok_envelope(),
    )
        .into_response())
}

/// `POST /:name?lev=thumb|preview` — derive a rendition of the current
/// version. Idempotent; `lev` is required and must name a derived kind.
pub async fn derive(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<PictureQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let owner = authenticate(&state, &headers)?;
    let kind = query.kind()?;
    if !kind.is_derived() {
        return Err(ApiError::MethodNotAllowed);
    }

    let service = state.service.clone();
    run_blocking(move || service.derive(&owner, &name, kind)).await?;

    Ok((StatusCode::CREATED, ok_envelope()).into_response())
}

/// `DELETE /:name` — hide the picture; `?purge=1` frees the name too.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<PictureQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let owner = authenticate(&state, &headers)?;
    let purge = query.is_purge();

    let service = state.service.clone();
    run_blocking(move || {
        if purge {
            service.hard_delete(&owner, &name)
        } else {
            service.soft_delete(&owner, &name)
        }
    })
    .await?;

    Ok(ok_envelope().into_response())
}
