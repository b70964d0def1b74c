//! Content-type detection from a blob's leading bytes.
//!
//! The retrieval pipeline reports the type of what is actually stored, not
//! what the uploading client declared. Only the image formats the service
//! accepts need precise signatures; anything else falls back to the opaque
//! octet-stream type.

/// Number of leading bytes needed to classify any supported format.
pub const SNIFF_LEN: usize = 12;

/// Sniff a content type from the first bytes of a blob.
pub fn sniff_content_type(head: &[u8]) -> &'static str {
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if head.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png";
    }
    if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
        return "image/webp";
    }
    if head.starts_with(b"BM") {
        return "image/bmp";
    }
    "application/octet-stream"
}
