use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pixvault_types::{ContentId, Owner};

/// One picture record: the current version of a named resource for an owner.
///
/// Exactly one live record exists per `(owner, name)`. The record is
/// mutated in place on a validated overwrite and carries a soft-delete flag
/// until it is purged by a hard delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub owner: Owner,
    pub name: String,
    /// Current strong validator, derived from the blob's content hash.
    pub content_id: ContentId,
    /// The digest the client declared at upload time.
    pub digest: ContentId,
    /// Size of the stored blob in bytes.
    pub size: u64,
    pub created_at: DateTime<Utc>,
    /// Soft-deleted rows are hidden from listings but still occupy the
    /// name for write gating.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl Record {
    pub fn new(
        owner: Owner,
        name: impl Into<String>,
        content_id: ContentId,
        digest: ContentId,
        size: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            content_id,
            digest,
            size,
            created_at,
            deleted: false,
        }
    }
}

/// The fields replaced when a record is overwritten in place.
///
/// `created_at` is not part of the patch: creation time is a property of
/// the record, not of its latest content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordPatch {
    pub content_id: ContentId,
    pub digest: ContentId,
    pub size: u64,
}
