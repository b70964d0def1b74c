//! Foundation types for pixvault.
//!
//! This crate provides the identity and validator types used throughout the
//! pixvault system. Every other pixvault crate depends on `pixvault-types`.
//!
//! # Key Types
//!
//! - [`ContentId`] — Content-addressed identifier (SHA-256 hash), doubling as
//!   the strong validator (ETag) for conditional requests
//! - [`ConditionalToken`] — A validator parsed from `If-Match` /
//!   `If-None-Match`, carrying the strong/weak flag
//! - [`RenditionKind`] — Closed set of stored representations (raw original
//!   plus derived renditions)
//! - [`Owner`] — The tenant a record belongs to

pub mod content_id;
pub mod error;
pub mod owner;
pub mod rendition;
pub mod token;

pub use content_id::ContentId;
pub use error::TypeError;
pub use owner::Owner;
pub use rendition::RenditionKind;
pub use token::ConditionalToken;
