//! Filesystem-backed blob store.
//!
//! Layout: one directory per namespace under the storage root, file name =
//! hex content identifier + original extension:
//!
//! ```text
//! <root>/
//!   original/<hex id><ext>
//!   thumbnail/<hex id><ext>
//!   preview/<hex id><ext>
//! ```
//!
//! Writes stream into a temporary file in the target directory and are
//! published with an atomic rename, so a content path either holds a
//! complete blob or nothing. Concurrent writers of identical bytes converge
//! on the same path and either rename wins; the bytes are the same.

use std::fs::File;
use std::io::{copy, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;

use pixvault_types::{ContentId, RenditionKind};

use crate::error::StoreResult;
use crate::ingest::{verify_claimed, HashingWriter, StoredBlob, TransferEncoding};
use crate::sniff::{sniff_content_type, SNIFF_LEN};
use crate::traits::{BlobHandle, BlobStore};

/// Directory-per-namespace filesystem blob store.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (and create, if necessary) a store rooted at `root`.
    ///
    /// All namespace directories are created up front so that every later
    /// write is a plain file operation.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for kind in RenditionKind::ALL {
            std::fs::create_dir_all(root.join(kind.namespace()))?;
        }
        Ok(Self { root })
    }

    /// The storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, kind: RenditionKind, id: &ContentId, ext: &str) -> PathBuf {
        self.root
            .join(kind.namespace())
            .join(format!("{}{}", id.to_hex(), ext))
    }
}

impl BlobStore for FsBlobStore {
    fn ingest(
        &self,
        ext: &str,
        encoding: TransferEncoding,
        claimed: &ContentId,
        max_bytes: u64,
        body: &mut dyn Read,
    ) -> StoreResult<StoredBlob> {
        let dir = self.root.join(RenditionKind::Raw.namespace());
        let tmp = NamedTempFile::new_in(&dir)?;

        let mut writer = HashingWriter::new(tmp);
        // Reading one byte past the cap is enough to detect overflow while
        // keeping the temp file bounded.
        let mut decoded = encoding.decode(body).take(max_bytes + 1);
        copy(&mut decoded, &mut writer)?;
        drop(decoded);
        let (tmp, id, size) = writer.finish()?;
        if size > max_bytes {
            return Err(crate::StoreError::TooLarge { limit: max_bytes });
        }

        // Unverified content never reaches a content path; the tempfile is
        // unlinked on drop.
        verify_claimed(claimed, &id)?;

        let target = self.blob_path(RenditionKind::Raw, &id, ext);
        if target.exists() {
            tracing::debug!(id = %id.short_hex(), "blob already stored, dedup no-op");
        } else {
            tmp.persist(&target).map_err(|e| e.error)?;
            tracing::info!(id = %id.short_hex(), size, "stored new blob");
        }

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
        let target = self.blob_path(kind, id, ext);
        if target.exists() {
            return Ok(());
        }
        let dir = self.root.join(kind.namespace());
        let mut tmp = NamedTempFile::new_in(&dir)?;
        std::io::Write::write_all(&mut tmp, data)?;
        tmp.persist(&target).map_err(|e| e.error)?;
        tracing::info!(id = %id.short_hex(), namespace = %kind, "stored rendition blob");
        Ok(())
    }

    fn open(
        &self,
        kind: RenditionKind,
        id: &ContentId,
        ext: &str,
    ) -> StoreResult<Option<BlobHandle>> {
        let path = self.blob_path(kind, id, ext);
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata()?.len();

        let mut head = [0u8; SNIFF_LEN];
        let mut filled = 0;
        while filled < head.len() {
            let n = file.read(&mut head[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        let content_type = sniff_content_type(&head[..filled]);
        file.seek(SeekFrom::Start(0))?;

        Ok(Some(BlobHandle {
            size,
            content_type,
            reader: Box::new(file),
        }))
    }

    fn exists(&self, kind: RenditionKind, id: &ContentId, ext: &str) -> StoreResult<bool> {
        Ok(self.blob_path(kind, id, ext).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEAD: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const CAP: u64 = 1 << 20;

    fn png_bytes(tail: &[u8]) -> Vec<u8> {
        let mut v = PNG_HEAD.to_vec();
        v.extend_from_slice(tail);
        v
    }

    fn store() -> (tempfile::TempDir, FsBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();
        (dir, store)
    }

    // ---- Ingest ----

    #[test]
    fn ingest_stores_at_content_path() {
        let (_dir, store) = store();
        let data = png_bytes(b"picture one");
        let claimed = ContentId::of(&data);

        let mut body: &[u8] = &data;
        let stored = store
            .ingest(".png", TransferEncoding::Identity, &claimed, CAP, &mut body)
            .unwrap();

        assert_eq!(stored.id, claimed);
        assert_eq!(stored.size, data.len() as u64);
        assert!(store
            .exists(RenditionKind::Raw, &stored.id, ".png")
            .unwrap());
    }

    #[test]
    fn ingest_rejects_digest_mismatch_and_leaves_nothing() {
        let (_dir, store) = store();
        let data = png_bytes(b"actual bytes");
        let claimed = ContentId::of(b"something else");

        let mut body: &[u8] = &data;
        let err = store
            .ingest(".png", TransferEncoding::Identity, &claimed, CAP, &mut body)
            .unwrap_err();
        assert!(matches!(err, crate::StoreError::DigestMismatch { .. }));

        // Neither the claimed nor the computed path may exist.
        let computed = ContentId::of(&data);
        assert!(!store.exists(RenditionKind::Raw, &claimed, ".png").unwrap());
        assert!(!store.exists(RenditionKind::Raw, &computed, ".png").unwrap());

        // And no stray temp files remain in the namespace directory.
        let raw_dir = store.root().join("original");
        assert_eq!(std::fs::read_dir(raw_dir).unwrap().count(), 0);
    }

    #[test]
    fn ingest_caps_the_decoded_stream() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let (_dir, store) = store();
        // 64 KiB of zeros compresses to a body far below the cap; the cap
        // must still trip on the inflated size.
        let inflated = vec![0u8; 64 * 1024];
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&inflated).unwrap();
        let compressed = enc.finish().unwrap();
        assert!(compressed.len() < 1024);

        let claimed = ContentId::of(&inflated);
        let mut body: &[u8] = &compressed;
        let err = store
            .ingest(".png", TransferEncoding::Gzip, &claimed, 1024, &mut body)
            .unwrap_err();
        assert!(matches!(err, crate::StoreError::TooLarge { limit: 1024 }));

        // Nothing persisted, no stray temp file.
        let raw_dir = store.root().join("original");
        assert_eq!(std::fs::read_dir(raw_dir).unwrap().count(), 0);
    }

    #[test]
    fn ingest_gzip_hashes_decoded_bytes() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let (_dir, store) = store();
        let original = png_bytes(b"compressed upload");
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&original).unwrap();
        let compressed = enc.finish().unwrap();

        let claimed = ContentId::of(&original);
        let mut body: &[u8] = &compressed;
        let stored = store
            .ingest(".png", TransferEncoding::Gzip, &claimed, CAP, &mut body)
            .unwrap();

        assert_eq!(stored.id, claimed);
        assert_eq!(stored.size, original.len() as u64);
    }

    #[test]
    fn ingest_is_dedup_idempotent() {
        let (_dir, store) = store();
        let data = png_bytes(b"same bytes twice");
        let claimed = ContentId::of(&data);

        let mut b1: &[u8] = &data;
        let s1 = store
            .ingest(".png", TransferEncoding::Identity, &claimed, CAP, &mut b1)
            .unwrap();
        let mut b2: &[u8] = &data;
        let s2 = store
            .ingest(".png", TransferEncoding::Identity, &claimed, CAP, &mut b2)
            .unwrap();

        assert_eq!(s1.id, s2.id);
        // One file, not two.
        let raw_dir = store.root().join("original");
        assert_eq!(std::fs::read_dir(raw_dir).unwrap().count(), 1);
    }

    // ---- Open / metadata ----

    #[test]
    fn open_returns_sniffed_metadata_and_bytes() {
        let (_dir, store) = store();
        let data = png_bytes(b"metadata check");
        let claimed = ContentId::of(&data);
        let mut body: &[u8] = &data;
        let stored = store
            .ingest(".png", TransferEncoding::Identity, &claimed, CAP, &mut body)
            .unwrap();

        let mut handle = store
            .open(RenditionKind::Raw, &stored.id, ".png")
            .unwrap()
            .expect("blob should exist");
        assert_eq!(handle.size, data.len() as u64);
        assert_eq!(handle.content_type, "image/png");

        let mut read_back = Vec::new();
        handle.reader.read_to_end(&mut read_back).unwrap();
        assert_eq!(read_back, data);
    }

    #[test]
    fn open_missing_blob_returns_none() {
        let (_dir, store) = store();
        let id = ContentId::of(b"never stored");
        assert!(store.open(RenditionKind::Raw, &id, ".png").unwrap().is_none());
    }

    // ---- Rendition namespace ----

    #[test]
    fn put_is_atomic_and_idempotent() {
        let (_dir, store) = store();
        let id = ContentId::of(b"original");
        let rendered = png_bytes(b"small");

        store
            .put(RenditionKind::Thumb, &id, ".png", &rendered)
            .unwrap();
        assert!(store.exists(RenditionKind::Thumb, &id, ".png").unwrap());

        // Second put with the same key is a no-op, never a partial write.
        store
            .put(RenditionKind::Thumb, &id, ".png", &rendered)
            .unwrap();
        let thumb_dir = store.root().join("thumbnail");
        assert_eq!(std::fs::read_dir(thumb_dir).unwrap().count(), 1);

        let mut handle = store
            .open(RenditionKind::Thumb, &id, ".png")
            .unwrap()
            .unwrap();
        let mut bytes = Vec::new();
        handle.reader.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, rendered);
    }

    #[test]
    fn namespaces_are_isolated() {
        let (_dir, store) = store();
        let data = png_bytes(b"raw only");
        let claimed = ContentId::of(&data);
        let mut body: &[u8] = &data;
        let stored = store
            .ingest(".png", TransferEncoding::Identity, &claimed, CAP, &mut body)
            .unwrap();

        assert!(store.exists(RenditionKind::Raw, &stored.id, ".png").unwrap());
        assert!(!store.exists(RenditionKind::Thumb, &stored.id, ".png").unwrap());
        assert!(!store.exists(RenditionKind::Preview, &stored.id, ".png").unwrap());
    }
}
