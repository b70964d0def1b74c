//! Derived-rendition generation.
//!
//! A rendition is a secondary representation (thumbnail, preview) of a
//! stored original, keyed by the *original's* content identifier under a
//! separate storage namespace. Renditions have no lifecycle of their own:
//! they are always regenerable from the original, so they are written
//! best-effort and never transactionally tied to record updates.
//!
//! The actual pixel work is behind the [`ImageProcessor`] seam — image
//! decoding and resizing internals are an external collaborator, not part
//! of this crate.

pub mod error;
pub mod generator;
pub mod processor;

pub use error::{RenditionError, RenditionResult};
pub use generator::RenditionGenerator;
pub use processor::{ImageProcessor, PassThroughProcessor};
