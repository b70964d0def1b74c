//! Opaque range specification for paginated listing.
//!
//! Clients pass offset windows in a `Range: records=a-b,c-d` header. The
//! parsed segments select record *indices* in the listing order; the
//! backend applies them after filtering and sorting. An open-ended segment
//! (`a-`) selects everything from `a` on.

use crate::error::{IndexError, IndexResult};

/// One inclusive offset window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: u64,
    /// Inclusive end; `None` means unbounded.
    pub end: Option<u64>,
}

impl Segment {
    /// Whether this window selects the record at `index`.
    pub fn selects(&self, index: u64) -> bool {
        index >= self.start && self.end.map_or(true, |end| index <= end)
    }
}

/// A set of offset windows, in client order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeSpec {
    pub segments: Vec<Segment>,
}

impl RangeSpec {
    /// Parse a range header value such as `records=0-9,20-29` or `10-`.
    ///
    /// The `records=` unit prefix is optional. Empty or backwards segments
    /// are rejected.
    pub fn parse(raw: &str) -> IndexResult<Self> {
        let body = raw.trim().strip_prefix("records=").unwrap_or(raw.trim());
        if body.is_empty() {
            return Err(IndexError::InvalidRange(raw.to_string()));
        }

        let mut segments = Vec::new();
        for part in body.split(',') {
            let part = part.trim();
            let Some((start, end)) = part.split_once('-') else {
                return Err(IndexError::InvalidRange(part.to_string()));
            };
            let start: u64 = start
                .trim()
                .parse()
                .map_err(|_| IndexError::InvalidRange(part.to_string()))?;
            let end = match end.trim() {
                "" => None,
                e => Some(
                    e.parse::<u64>()
                        .map_err(|_| IndexError::InvalidRange(part.to_string()))?,
                ),
            };
            if end.is_some_and(|e| e < start) {
                return Err(IndexError::InvalidRange(part.to_string()));
            }
            segments.push(Segment { start, end });
        }
        Ok(Self { segments })
    }

    /// Whether any window selects the record at `index`.
    pub fn selects(&self, index: u64) -> bool {
        self.segments.iter().any(|s| s.selects(index))
    }
}
