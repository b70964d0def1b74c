//! Orchestration of the write, read, rendition, and delete pipelines.
//!
//! [`PictureService`] is the synchronous core behind the HTTP handlers: it
//! runs the gate, the ingest pipeline, and the index commit for writes, and
//! the conditional-read logic for retrievals. Handlers call it through
//! `spawn_blocking`; everything here may block on file I/O.

use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use pixvault_gate::{decide, Disposition};
use pixvault_index::{IndexError, PictureIndex, RangeSpec, Record, RecordPatch};
use pixvault_rendition::RenditionGenerator;
use pixvault_store::{extension_of, BlobHandle, BlobStore, TransferEncoding};
use pixvault_types::{ConditionalToken, ContentId, Owner, RenditionKind};

use crate::error::ApiError;

/// Validated upload inputs, after header parsing.
#[derive(Debug)]
pub struct UploadRequest {
    pub encoding: TransferEncoding,
    /// Client-declared content digest (required).
    pub digest: ContentId,
    /// Weak-normalized `If-Match` value; `None` when absent or weak.
    pub claimed: Option<String>,
    /// Ceiling on the decoded body size.
    pub max_bytes: u64,
}

/// Outcome of an accepted upload.
#[derive(Debug, PartialEq, Eq)]
pub struct UploadOutcome {
    pub id: ContentId,
    /// `true` for a first write (201), `false` for an overwrite (200).
    pub created: bool,
}

/// Metadata attached to a retrieval response, derived from the stored
/// blob's actual bytes plus the index row.
#[derive(Debug, Clone)]
pub struct PictureMeta {
    pub content_type: &'static str,
    pub size: u64,
    pub digest: ContentId,
    pub etag: ContentId,
    pub created_at: DateTime<Utc>,
}

/// Result of the conditional-read pipeline.
#[derive(Debug)]
pub enum Retrieval {
    /// Strong validator matched; no body, no metadata.
    NotModified,
    /// Metadata only (HEAD); any opened handle is already closed.
    Meta(PictureMeta),
    /// Metadata plus an open handle on the blob. The caller owns the
    /// handle's lifecycle; dropping it closes the underlying resource on
    /// every exit path, including a client disconnect mid-stream.
    Full(PictureMeta, BlobHandle),
}

/// The synchronous core of the picture API.
#[derive(Clone)]
pub struct PictureService {
    index: Arc<dyn PictureIndex>,
    store: Arc<dyn BlobStore>,
    generator: Arc<RenditionGenerator>,
}

impl PictureService {
    pub fn new(
        index: Arc<dyn PictureIndex>,
        store: Arc<dyn BlobStore>,
        generator: Arc<RenditionGenerator>,
    ) -> Self {
        Self {
            index,
            store,
            generator,
        }
    }

    /// The write pipeline: gate, ingest, commit.
    ///
    /// The gate's decision is revalidated by the index commit; a racing
    /// writer surfaces as the same rejection the gate would have produced
    /// had it seen the other writer's row.
    pub fn upload(
        &self,
        owner: &Owner,
        name: &str,
        request: &UploadRequest,
        body: &mut dyn Read,
    ) -> Result<UploadOutcome, ApiError> {
        // Soft-deleted rows still occupy the name: only a hard delete
        // frees it for ToCreate.
        let existing = self.index.lookup(owner, name)?;
        let current_hex = existing.as_ref().map(|r| r.content_id.to_hex());
        let claimed = request.claimed.as_deref().unwrap_or("");

        let disposition = decide(current_hex.as_deref(), claimed);
        match disposition {
            Disposition::Removed => return Err(ApiError::Gone),
            Disposition::Existed => return Err(ApiError::Existed),
            Disposition::NotMatch => return Err(ApiError::PreconditionFailed),
            Disposition::ToCreate | Disposition::ToUpdate => {}
        }

        let ext = extension_of(name);
        let stored =
            self.store
                .ingest(ext, request.encoding, &request.digest, request.max_bytes, body)?;

        match disposition {
            Disposition::ToCreate => {
                let record = Record::new(
                    owner.clone(),
                    name,
                    stored.id,
                    request.digest,
                    stored.size,
                    stored.created_at,
                );
                self.index.insert(record).map_err(|e| match e {
                    // Lost the first-write race: behave as if the gate had
                    // seen the winner's row.
                    IndexError::Conflict { .. } => ApiError::Existed,
                    other => other.into(),
                })?;
            }
            Disposition::ToUpdate => {
                let expected = existing
                    .as_ref()
                    .map(|r| r.content_id)
                    .expect("ToUpdate implies an existing row");
                self.index.update(
                    owner,
                    name,
                    &expected,
                    RecordPatch {
                        content_id: stored.id,
                        digest: request.digest,
                        size: stored.size,
                    },
                )?;
            }
            _ => unreachable!("rejections returned above"),
        }

        tracing::info!(
            %owner,
            name,
            id = %stored.id.short_hex(),
            ?disposition,
            "accepted upload"
        );
        Ok(UploadOutcome {
            id: stored.id,
            created: disposition == Disposition::ToCreate,
        })
    }

    /// The conditional-read pipeline.
    pub fn retrieve(
        &self,
        owner: &Owner,
        name: &str,
        kind: RenditionKind,
        head_only: bool,
        cached: Option<&ConditionalToken>,
    ) -> Result<Retrieval, ApiError> {
        let record = match self.index.lookup(owner, name)? {
            Some(r) if !r.deleted => r,
            _ => return Err(ApiError::NotFound),
        };

        // Strong comparison only; a weak validator never produces 304.
        if cached.is_some_and(|t| t.matches_strong(&record.content_id.to_hex())) {
            return Ok(Retrieval::NotModified);
        }

        let ext = extension_of(name);
        let handle = self.store.open(kind, &record.content_id, ext)?;
        let Some(handle) = handle else {
            return if kind.is_derived() {
                // Rendition not derived yet: absent, not inconsistent.
                Err(ApiError::NotFound)
            } else {
                Err(ApiError::IndexInconsistency(format!(
                    "record exists but raw blob {} is missing",
                    record.content_id.short_hex()
                )))
            };
        };

        let meta = PictureMeta {
            content_type: handle.content_type,
            size: handle.size,
            digest: record.digest,
            etag: record.content_id,
            created_at: record.created_at,
        };

        if head_only {
            // Dropping the handle closes it before we return.
            return Ok(Retrieval::Meta(meta));
        }

        Ok(Retrieval::Full(meta, handle))
    }

    /// Derive a rendition of the current version.
    pub fn derive(
        &self,
        owner: &Owner,
        name: &str,
        kind: RenditionKind,
    ) -> Result<(), ApiError> {
        self.generator.derive(owner, name, kind).map_err(ApiError::from)
    }

    /// List an owner's live records.
    pub fn list(
        &self,
        owner: &Owner,
        range: Option<&RangeSpec>,
    ) -> Result<Vec<Record>, ApiError> {
        self.index.list(owner, range).map_err(ApiError::from)
    }

    /// Hide a record from listings (the name stays taken).
    pub fn soft_delete(&self, owner: &Owner, name: &str) -> Result<(), ApiError> {
        self.index.soft_delete(owner, name).map_err(ApiError::from)
    }

    /// Purge a record, freeing its name. The blob is deliberately left in
    /// place: other records may share it.
    pub fn hard_delete(&self, owner: &Owner, name: &str) -> Result<(), ApiError> {
        self.index.hard_delete(owner, name).map_err(ApiError::from)
    }
}
