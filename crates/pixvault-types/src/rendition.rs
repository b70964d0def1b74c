use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The closed set of stored representations of a picture.
///
/// `Raw` is the uploaded original; the others are derived from it and are
/// always regenerable. Each kind maps to its own storage namespace
/// (directory) under the blob root; within a namespace blobs are keyed by
/// the *original's* content identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenditionKind {
    /// The uploaded original bytes.
    Raw,
    /// Small thumbnail for grid views.
    Thumb,
    /// Medium-sized preview.
    Preview,
}

impl RenditionKind {
    /// All kinds, in namespace order.
    pub const ALL: [RenditionKind; 3] = [Self::Raw, Self::Thumb, Self::Preview];

    /// The storage namespace (directory name) for this kind.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Raw => "original",
            Self::Thumb => "thumbnail",
            Self::Preview => "preview",
        }
    }

    /// Parse the `lev` query parameter. An absent parameter means `Raw`.
    pub fn from_query(lev: Option<&str>) -> Result<Self, TypeError> {
        match lev {
            None | Some("") | Some("raw") => Ok(Self::Raw),
            Some("thumb") => Ok(Self::Thumb),
            Some("preview") => Ok(Self::Preview),
            Some(other) => Err(TypeError::UnknownRendition(other.to_string())),
        }
    }

    /// Returns `true` for derived kinds (everything except `Raw`).
    pub fn is_derived(&self) -> bool {
        !matches!(self, Self::Raw)
    }
}

impl fmt::Display for RenditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespace())
    }
}

impl std::str::FromStr for RenditionKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_query(Some(s))
    }
}
