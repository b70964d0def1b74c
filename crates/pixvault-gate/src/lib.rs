//! Optimistic-concurrency decision gate for picture writes.
//!
//! Before a write is accepted, the client's claimed resource version (the
//! strong `If-Match` validator, already weak-normalized to an empty claim)
//! is reconciled against the stored version. [`decide`] is a pure function
//! over that pair; the resulting [`Disposition`] drives exactly one of
//! insert, update, or reject at the index layer.
//!
//! The gate performs no I/O. Because the lookup that feeds it and the
//! commit that follows it are separate index calls, the index contract
//! revalidates the decision at commit time with a per-key compare-and-set;
//! a commit conflict surfaces the same way the matching rejection here
//! would have.

use serde::{Deserialize, Serialize};

/// Outcome of the write-gate decision.
///
/// Exactly one disposition applies to any `(record state, claim)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    /// No record and no claim: accept as a first write (insert).
    ToCreate,
    /// Record exists and the claim matches its current version: accept as
    /// an overwrite (update).
    ToUpdate,
    /// Record exists but the client presented no validator: refuse the
    /// silent overwrite.
    Existed,
    /// Record exists and the claim names a different version: precondition
    /// failed.
    NotMatch,
    /// No record but the client claimed a prior version: the resource the
    /// client knew is gone.
    Removed,
}

impl Disposition {
    /// Returns `true` for the three dispositions that reject the write.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Existed | Self::NotMatch | Self::Removed)
    }
}

/// Decide the write disposition for a record.
///
/// `current` is the stored content identifier if a record exists (soft
/// deleted rows still count as existing here — only a hard delete frees the
/// name). `claimed` is the weak-normalized `If-Match` value; an empty
/// string means no validator was presented.
pub fn decide(current: Option<&str>, claimed: &str) -> Disposition {
    match current {
        None if claimed.is_empty() => Disposition::ToCreate,
        None => Disposition::Removed,
        Some(_) if claimed.is_empty() => Disposition::Existed,
        Some(cur) if claimed != cur => Disposition::NotMatch,
        Some(_) => Disposition::ToUpdate,
    }
}
