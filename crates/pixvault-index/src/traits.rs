use pixvault_types::{ContentId, Owner};

use crate::error::IndexResult;
use crate::range::RangeSpec;
use crate::record::{Record, RecordPatch};

/// Storage backend for picture records.
///
/// Implementations must be thread-safe (`Send + Sync`) and must make
/// `insert` and `update` atomic per `(owner, name)`: the gate's decision is
/// revalidated at commit time, so a lost-update race between two writers of
/// the same name is detected here rather than silently overwriting.
pub trait PictureIndex: Send + Sync {
    /// Read the row for `(owner, name)`.
    ///
    /// Returns `Ok(None)` only when no row exists at all. Soft-deleted rows
    /// are returned with their `deleted` flag set: they still occupy the
    /// name for write gating, while retrieval and listing treat them as
    /// absent.
    fn lookup(&self, owner: &Owner, name: &str) -> IndexResult<Option<Record>>;

    /// Create the row for a first write.
    ///
    /// Fails with [`Conflict`](crate::IndexError::Conflict) if any row
    /// (live or soft-deleted) already occupies the name — the
    /// unique-constraint analogue that turns a racing second insert into a
    /// detectable error.
    fn insert(&self, record: Record) -> IndexResult<()>;

    /// Overwrite the row in place, compare-and-set style.
    ///
    /// `expected` is the content identifier the gate observed. Fails with
    /// [`NotFound`](crate::IndexError::NotFound) if no row exists and with
    /// [`Conflict`](crate::IndexError::Conflict) if the stored identifier
    /// no longer equals `expected` or the row was deleted in the meantime.
    fn update(
        &self,
        owner: &Owner,
        name: &str,
        expected: &ContentId,
        patch: RecordPatch,
    ) -> IndexResult<()>;

    /// Hide the row from listings. The row keeps existing for write gating.
    fn soft_delete(&self, owner: &Owner, name: &str) -> IndexResult<()>;

    /// Purge the row entirely, freeing the name for re-creation.
    fn hard_delete(&self, owner: &Owner, name: &str) -> IndexResult<()>;

    /// List an owner's live records in creation order.
    ///
    /// Soft-deleted rows are excluded. `range` selects offset windows over
    /// the ordered sequence; `None` lists everything. The result is finite
    /// and restartable (a fresh `Vec`, not a lazy cursor).
    fn list(&self, owner: &Owner, range: Option<&RangeSpec>) -> IndexResult<Vec<Record>>;
}
