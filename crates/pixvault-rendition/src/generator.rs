use std::io::Read;
use std::sync::Arc;

use pixvault_index::PictureIndex;
use pixvault_store::{extension_of, BlobStore};
use pixvault_types::{Owner, RenditionKind};

use crate::error::{RenditionError, RenditionResult};
use crate::processor::ImageProcessor;

/// Derives renditions of stored originals.
///
/// Derivation is idempotent: a `(kind, id)` pair that already has a blob is
/// skipped, and the store's tempfile-then-rename write guarantees a failure
/// mid-derivation never leaves a readable partial blob.
pub struct RenditionGenerator {
    index: Arc<dyn PictureIndex>,
    store: Arc<dyn BlobStore>,
    processor: Arc<dyn ImageProcessor>,
}

impl RenditionGenerator {
    pub fn new(
        index: Arc<dyn PictureIndex>,
        store: Arc<dyn BlobStore>,
        processor: Arc<dyn ImageProcessor>,
    ) -> Self {
        Self {
            index,
            store,
            processor,
        }
    }

    /// Derive `kind` for the named picture's current version.
    pub fn derive(&self, owner: &Owner, name: &str, kind: RenditionKind) -> RenditionResult<()> {
        if !kind.is_derived() {
            return Err(RenditionError::InvalidKind(kind));
        }

        let record = match self.index.lookup(owner, name)? {
            Some(r) if !r.deleted => r,
            _ => return Err(RenditionError::NotFound),
        };
        let ext = extension_of(name);
        let id = record.content_id;

        if self.store.exists(kind, &id, ext)? {
            tracing::debug!(id = %id.short_hex(), %kind, "rendition already present, skipping");
            return Ok(());
        }

        let mut source = self
            .store
            .open(RenditionKind::Raw, &id, ext)?
            .ok_or_else(|| RenditionError::SourceUnreadable(format!("no raw blob for {id}")))?;
        let mut bytes = Vec::with_capacity(source.size as usize);
        source
            .reader
            .read_to_end(&mut bytes)
            .map_err(|e| RenditionError::SourceUnreadable(e.to_string()))?;

        let rendered = self.processor.process(kind, &bytes)?;
        self.store.put(kind, &id, ext, &rendered)?;
        tracing::info!(id = %id.short_hex(), %kind, "derived rendition");
        Ok(())
    }
}
