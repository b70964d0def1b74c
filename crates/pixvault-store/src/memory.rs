use std::collections::HashMap;
use std::io::{copy, Cursor, Read};
use std::sync::RwLock;

use chrono::Utc;

use pixvault_types::{ContentId, RenditionKind};

use crate::error::StoreResult;
use crate::ingest::{verify_claimed, HashingWriter, StoredBlob, TransferEncoding};
use crate::sniff::sniff_content_type;
use crate::traits::{BlobHandle, BlobStore};

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. All blobs are held in memory behind a
/// `RwLock`, keyed by `(namespace, id, ext)`. Semantics match
/// [`FsBlobStore`](crate::FsBlobStore): immutable, idempotent, shared
/// across owners.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<(RenditionKind, String), Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored, across all namespaces.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    fn key(kind: RenditionKind, id: &ContentId, ext: &str) -> (RenditionKind, String) {
        (kind, format!("{}{}", id.to_hex(), ext))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn ingest(
        &self,
        ext: &str,
        encoding: TransferEncoding,
        claimed: &ContentId,
        max_bytes: u64,
        body: &mut dyn Read,
    ) -> StoreResult<StoredBlob> {
        let mut writer = HashingWriter::new(Vec::new());
        let mut decoded = encoding.decode(body).take(max_bytes + 1);
        copy(&mut decoded, &mut writer)?;
        drop(decoded);
        let (bytes, id, size) = writer.finish()?;
        if size > max_bytes {
            return Err(crate::StoreError::TooLarge { limit: max_bytes });
        }

        verify_claimed(claimed, &id)?;

        let mut blobs = self.blobs.write().expect("lock poisoned");
        // Idempotent: identical content maps to the same key.
        blobs.entry(Self::key(RenditionKind::Raw, &id, ext)).or_insert(bytes);

        Ok(StoredBlob {
            id,
            size,
            created_at: Utc::now(),
        })
    }

    fn put(
        &self,
        kind: RenditionKind,
        id: &ContentId,
        ext: &str,
        data: &[u8],
    ) -> StoreResult<()> {
        let mut blobs = self.blobs.write().expect("lock poisoned");
        blobs
            .entry(Self::key(kind, id, ext))
            .or_insert_with(|| data.to_vec());
        Ok(())
    }

    fn open(
        &self,
        kind: RenditionKind,
        id: &ContentId,
        ext: &str,
    ) -> StoreResult<Option<BlobHandle>> {
        let blobs = self.blobs.read().expect("lock poisoned");
        let Some(bytes) = blobs.get(&Self::key(kind, id, ext)) else {
            return Ok(None);
        };
        Ok(Some(BlobHandle {
            size: bytes.len() as u64,
            content_type: sniff_content_type(bytes),
            reader: Box::new(Cursor::new(bytes.clone())),
        }))
    }

    fn exists(&self, kind: RenditionKind, id: &ContentId, ext: &str) -> StoreResult<bool> {
        let blobs = self.blobs.read().expect("lock poisoned");
        Ok(blobs.contains_key(&Self::key(kind, id, ext)))
    }
}
