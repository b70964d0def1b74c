//! HTTP server for the picture store.
//!
//! Exposes per-user picture storage with conditional (ETag / `If-Match`)
//! write semantics, derived renditions, and paginated listing over a
//! content-addressed blob store.

pub mod config;
pub mod error;
pub mod handler;
pub mod headers;
pub mod router;
pub mod server;
pub mod service;
pub mod session;

pub use config::ServerConfig;
pub use error::ApiError;
pub use handler::AppState;
pub use server::PixvaultServer;
pub use service::{PictureService, Retrieval, UploadOutcome, UploadRequest};
pub use session::{SessionManager, StaticTokenSessions};
