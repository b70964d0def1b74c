use std::io::Read;

use pixvault_types::{ContentId, RenditionKind};

use crate::error::StoreResult;
use crate::ingest::{StoredBlob, TransferEncoding};

/// An open blob plus the metadata derived from its actual bytes.
///
/// The handle owns the underlying resource; dropping it releases the file
/// descriptor (or buffer) on every exit path. Metadata reflects the stored
/// bytes, never anything the client declared.
pub struct BlobHandle {
    /// Size of the stored blob in bytes.
    pub size: u64,
    /// Content type sniffed from the blob's leading bytes.
    pub content_type: &'static str,
    /// Reader positioned at the start of the blob.
    pub reader: Box<dyn Read + Send>,
}

impl std::fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobHandle")
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Content-addressed blob storage.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once present at a `(namespace, id)` pair.
/// - Writes are atomic: a reader can never observe a partial blob.
/// - Writing an identifier that already exists is a successful no-op.
/// - The store is shared across owners; deduplication is a consequence of
///   content addressing, not a separate mechanism.
pub trait BlobStore: Send + Sync {
    /// Decode, hash, and durably store an uploaded body in the raw
    /// namespace.
    ///
    /// The body is decoded according to `encoding`, hashed while being
    /// written, and persisted at the content-addressed path. `claimed` is
    /// the client-declared digest; a mismatch with the computed hash fails
    /// the ingest and leaves nothing behind. `max_bytes` bounds the
    /// *decoded* stream — the transport limit covers only the encoded
    /// body, so the cap is re-checked after inflation.
    fn ingest(
        &self,
        ext: &str,
        encoding: TransferEncoding,
        claimed: &ContentId,
        max_bytes: u64,
        body: &mut dyn Read,
    ) -> StoreResult<StoredBlob>;

    /// Store already-derived bytes under a rendition namespace.
    ///
    /// `id` is the *original's* content identifier. Atomic and idempotent.
    fn put(
        &self,
        kind: RenditionKind,
        id: &ContentId,
        ext: &str,
        data: &[u8],
    ) -> StoreResult<()>;

    /// Open a blob for reading.
    ///
    /// Returns `Ok(None)` if no blob exists at the given coordinates.
    fn open(
        &self,
        kind: RenditionKind,
        id: &ContentId,
        ext: &str,
    ) -> StoreResult<Option<BlobHandle>>;

    /// Check whether a blob exists at the given coordinates.
    fn exists(&self, kind: RenditionKind, id: &ContentId, ext: &str) -> StoreResult<bool>;
}

/// The file extension of a resource name, including the leading dot.
///
/// Returns an empty string when the name has no extension. The extension is
/// carried through to the stored blob's file name so that direct serving
/// keeps a recognizable suffix.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx < name.len() - 1 => &name[idx..],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_with_dot() {
        assert_eq!(extension_of("cat.jpg"), ".jpg");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
    }

    #[test]
    fn extension_absent() {
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of(".hidden"), "");
        assert_eq!(extension_of("trailing."), "");
    }
}
