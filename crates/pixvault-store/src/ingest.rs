//! Ingest-side building blocks: transfer decoding and the hashing writer.
//!
//! Uploaded bytes are decoded (identity or gzip), hashed with SHA-256 while
//! they are written, and only then does the computed hash become the blob's
//! content identifier. The hash and the write happen in one streaming pass;
//! the body is never buffered whole.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use flate2::read::MultiGzDecoder;
use sha2::{Digest, Sha256};

use pixvault_types::ContentId;

use crate::error::{StoreError, StoreResult};

/// The transfer encodings the ingest pipeline can decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Pass-through; the body is the blob.
    Identity,
    /// Gzip-compressed body, inflated while streaming.
    Gzip,
}

impl TransferEncoding {
    /// Parse a `Content-Encoding` header value. An absent header means
    /// identity; anything other than `identity` or `gzip` is rejected.
    pub fn from_header(value: Option<&str>) -> StoreResult<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("identity") => Ok(Self::Identity),
            Some("gzip") => Ok(Self::Gzip),
            Some(other) => Err(StoreError::UnsupportedEncoding(other.to_string())),
        }
    }

    /// Wrap a body reader with the decoder for this encoding.
    pub fn decode<'a>(&self, body: &'a mut dyn Read) -> Box<dyn Read + 'a> {
        match self {
            Self::Identity => Box::new(body),
            Self::Gzip => Box::new(MultiGzDecoder::new(body)),
        }
    }
}

/// Result of a successful ingest: the new content identifier plus the
/// metadata the index row needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub id: ContentId,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// A writer that hashes and counts everything passing through it.
pub struct HashingWriter<W: Write> {
    inner: W,
    hasher: Sha256,
    written: u64,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            written: 0,
        }
    }

    /// Finish the stream: flush the inner writer and return it together
    /// with the computed content identifier and byte count.
    pub fn finish(mut self) -> StoreResult<(W, ContentId, u64)> {
        self.inner.flush()?;
        let id = ContentId::from_digest(self.hasher.finalize().into());
        Ok((self.inner, id, self.written))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Verify the client-declared digest against the computed identifier.
///
/// A disagreement hard-fails the ingest; unverified content is never
/// silently stored.
pub fn verify_claimed(claimed: &ContentId, computed: &ContentId) -> StoreResult<()> {
    if claimed != computed {
        return Err(StoreError::DigestMismatch {
            claimed: *claimed,
            computed: *computed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::copy;

    #[test]
    fn identity_header_forms() {
        assert_eq!(
            TransferEncoding::from_header(None).unwrap(),
            TransferEncoding::Identity
        );
        assert_eq!(
            TransferEncoding::from_header(Some("identity")).unwrap(),
            TransferEncoding::Identity
        );
        assert_eq!(
            TransferEncoding::from_header(Some("")).unwrap(),
            TransferEncoding::Identity
        );
    }

    #[test]
    fn gzip_header() {
        assert_eq!(
            TransferEncoding::from_header(Some("gzip")).unwrap(),
            TransferEncoding::Gzip
        );
    }

    #[test]
    fn brotli_is_unsupported() {
        let err = TransferEncoding::from_header(Some("br")).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedEncoding(e) if e == "br"));
    }

    #[test]
    fn hashing_writer_matches_direct_hash() {
        let data = b"some picture bytes";
        let mut w = HashingWriter::new(Vec::new());
        w.write_all(data).unwrap();
        let (out, id, n) = w.finish().unwrap();

        assert_eq!(out, data.to_vec());
        assert_eq!(n, data.len() as u64);
        assert_eq!(id, ContentId::of(data));
    }

    #[test]
    fn gzip_decode_roundtrip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let original = b"inflate me please".to_vec();
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&original).unwrap();
        let compressed = enc.finish().unwrap();

        let mut src: &[u8] = &compressed;
        let mut decoded = TransferEncoding::Gzip.decode(&mut src);
        let mut sink = HashingWriter::new(Vec::new());
        copy(&mut decoded, &mut sink).unwrap();
        let (out, id, _) = sink.finish().unwrap();

        assert_eq!(out, original);
        assert_eq!(id, ContentId::of(&original));
    }

    #[test]
    fn claimed_digest_must_match() {
        let computed = ContentId::of(b"actual");
        let claimed = ContentId::of(b"declared");
        let err = verify_claimed(&claimed, &computed).unwrap_err();
        assert!(matches!(err, StoreError::DigestMismatch { .. }));

        verify_claimed(&computed, &computed).unwrap();
    }
}
