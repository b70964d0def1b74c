//! Per-owner picture metadata index.
//!
//! The index maps `(owner, name)` to the current content identifier plus
//! upload metadata. It is the only mutable shared resource in the system:
//! blobs are append-only and shared, but the index row for a name changes
//! on every accepted write.
//!
//! # Commit-time revalidation
//!
//! The write gate's decision and the index commit are separate calls, so
//! two concurrent first-writers can both be told `ToCreate`. The
//! [`PictureIndex`] contract closes that race: [`PictureIndex::insert`]
//! fails with [`IndexError::Conflict`] when a row already exists, and
//! [`PictureIndex::update`] is a compare-and-set against the expected
//! current identifier. A conflict at commit surfaces exactly like the
//! corresponding gate rejection; it never corrupts the row.
//!
//! # Delete lifecycle
//!
//! Soft delete hides a row from listings but keeps it in existence for the
//! write gate (the name is still taken). Hard delete removes the row; only
//! then can the name be re-created. Neither touches blobs.

pub mod error;
pub mod memory;
pub mod range;
pub mod record;
pub mod traits;

pub use error::{IndexError, IndexResult};
pub use memory::InMemoryPictureIndex;
pub use range::{RangeSpec, Segment};
pub use record::{Record, RecordPatch};
pub use traits::PictureIndex;
