//! Content-addressed blob storage for pixvault.
//!
//! Every uploaded picture is stored as an immutable blob whose file name is
//! the SHA-256 hash of its bytes. Identical content uploaded by different
//! owners lands on the same path, so the store deduplicates automatically.
//! Derived renditions live in sibling namespaces keyed by the *original's*
//! content identifier.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`FsBlobStore`] -- directory-per-namespace filesystem store; writes go
//!   through a temporary file and an atomic rename, so a readable partial
//!   blob can never exist at a content path
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content-addressing guarantees this).
//! 2. Writing the same identifier twice is a no-op; the hash is trusted to
//!    imply identical bytes.
//! 3. Record-level operations never delete blobs.
//! 4. The ingest path hashes while it writes; the declared client digest is
//!    verified against the computed hash before the blob becomes visible.

pub mod error;
pub mod fs;
pub mod ingest;
pub mod memory;
pub mod sniff;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBlobStore;
pub use ingest::{StoredBlob, TransferEncoding};
pub use memory::InMemoryBlobStore;
pub use sniff::sniff_content_type;
pub use traits::{extension_of, BlobHandle, BlobStore};
