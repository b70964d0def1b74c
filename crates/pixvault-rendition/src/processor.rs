use pixvault_types::RenditionKind;

use crate::error::RenditionResult;

/// The image-processing collaborator.
///
/// Given the original blob's bytes, produce the bytes of the requested
/// derived representation. Implementations wrap whatever codec/resizer a
/// deployment uses; this crate only requires that the transform is
/// deterministic enough to make re-derivation equivalent.
pub trait ImageProcessor: Send + Sync {
    fn process(&self, kind: RenditionKind, source: &[u8]) -> RenditionResult<Vec<u8>>;
}

/// A processor that returns the source bytes unchanged.
///
/// Useful for tests and for deployments that defer real scaling to a CDN:
/// the rendition namespace then simply mirrors the original.
#[derive(Debug, Default)]
pub struct PassThroughProcessor;

impl ImageProcessor for PassThroughProcessor {
    fn process(&self, _kind: RenditionKind, source: &[u8]) -> RenditionResult<Vec<u8>> {
        Ok(source.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_through_returns_source() {
        let p = PassThroughProcessor;
        let out = p.process(RenditionKind::Thumb, b"bytes").unwrap();
        assert_eq!(out, b"bytes");
    }
}
