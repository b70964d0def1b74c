use std::fmt;

use crate::error::TypeError;

/// A conditional-request validator parsed from `If-Match` / `If-None-Match`.
///
/// Carries the opaque validator value plus the strong/weak flag. Weak
/// validators (`W/"..."`) denote semantic equivalence only; they are
/// excluded from write-path gating (a weak `If-Match` behaves exactly like
/// an absent one) and never satisfy the strong not-modified comparison on
/// the read path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionalToken {
    pub value: String,
    pub weak: bool,
}

impl ConditionalToken {
    /// Parse a single validator from a header value.
    ///
    /// Accepts `"value"`, `W/"value"`, and the bare forms without quotes.
    /// Returns an error on an empty validator.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let trimmed = raw.trim();
        let (weak, rest) = match trimmed.strip_prefix("W/").or_else(|| trimmed.strip_prefix("w/")) {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let value = rest.trim().trim_matches('"');
        if value.is_empty() {
            return Err(TypeError::MalformedValidator(raw.to_string()));
        }
        Ok(Self {
            value: value.to_string(),
            weak,
        })
    }

    /// Normalize for write-path gating: a weak validator collapses to `None`.
    pub fn normalize(&self) -> Option<&str> {
        if self.weak {
            None
        } else {
            Some(&self.value)
        }
    }

    /// Strong comparison: byte-exact equality, strong validators only.
    pub fn matches_strong(&self, current: &str) -> bool {
        !self.weak && self.value == current
    }
}

impl fmt::Display for ConditionalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.value)
        } else {
            write!(f, "\"{}\"", self.value)
        }
    }
}
