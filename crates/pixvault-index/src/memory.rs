//! In-memory picture index for testing and single-process deployments.
//!
//! All rows live in a `HashMap` behind a `RwLock`. Holding the write lock
//! across the read-check-write sequence of `insert` and `update` gives the
//! per-key compare-and-set the trait requires.

use std::collections::HashMap;
use std::sync::RwLock;

use pixvault_types::{ContentId, Owner};

use crate::error::{IndexError, IndexResult};
use crate::range::RangeSpec;
use crate::record::{Record, RecordPatch};
use crate::traits::PictureIndex;

/// An in-memory implementation of [`PictureIndex`].
#[derive(Debug, Default)]
pub struct InMemoryPictureIndex {
    rows: RwLock<HashMap<(Owner, String), Record>>,
}

impl InMemoryPictureIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, including soft-deleted ones.
    pub fn len(&self) -> usize {
        self.rows.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the index holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.read().expect("lock poisoned").is_empty()
    }
}

impl PictureIndex for InMemoryPictureIndex {
    fn lookup(&self, owner: &Owner, name: &str) -> IndexResult<Option<Record>> {
        let rows = self.rows.read().expect("lock poisoned");
        Ok(rows.get(&(owner.clone(), name.to_string())).cloned())
    }

    fn insert(&self, record: Record) -> IndexResult<()> {
        let mut rows = self.rows.write().expect("lock poisoned");
        let key = (record.owner.clone(), record.name.clone());
        if rows.contains_key(&key) {
            return Err(IndexError::Conflict {
                owner: record.owner.to_string(),
                name: record.name,
                reason: "row already exists".to_string(),
            });
        }
        rows.insert(key, record);
        Ok(())
    }

    fn update(
        &self,
        owner: &Owner,
        name: &str,
        expected: &ContentId,
        patch: RecordPatch,
    ) -> IndexResult<()> {
        let mut rows = self.rows.write().expect("lock poisoned");
        let key = (owner.clone(), name.to_string());
        let Some(row) = rows.get_mut(&key) else {
            return Err(IndexError::NotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        };
        if row.deleted {
            return Err(IndexError::Conflict {
                owner: owner.to_string(),
                name: name.to_string(),
                reason: "row was deleted".to_string(),
            });
        }
        if row.content_id != *expected {
            return Err(IndexError::Conflict {
                owner: owner.to_string(),
                name: name.to_string(),
                reason: format!(
                    "expected {}, found {}",
                    expected.short_hex(),
                    row.content_id.short_hex()
                ),
            });
        }
        row.content_id = patch.content_id;
        row.digest = patch.digest;
        row.size = patch.size;
        Ok(())
    }

    fn soft_delete(&self, owner: &Owner, name: &str) -> IndexResult<()> {
        let mut rows = self.rows.write().expect("lock poisoned");
        let key = (owner.clone(), name.to_string());
        let Some(row) = rows.get_mut(&key) else {
            return Err(IndexError::NotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        };
        row.deleted = true;
        Ok(())
    }

    fn hard_delete(&self, owner: &Owner, name: &str) -> IndexResult<()> {
        let mut rows = self.rows.write().expect("lock poisoned");
        let key = (owner.clone(), name.to_string());
        if rows.remove(&key).is_none() {
            return Err(IndexError::NotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn list(&self, owner: &Owner, range: Option<&RangeSpec>) -> IndexResult<Vec<Record>> {
        let rows = self.rows.read().expect("lock poisoned");
        let mut records: Vec<Record> = rows
            .values()
            .filter(|r| r.owner == *owner && !r.deleted)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        if let Some(range) = range {
            records = records
                .into_iter()
                .enumerate()
                .filter(|(i, _)| range.selects(*i as u64))
                .map(|(_, r)| r)
                .collect();
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(owner: &str, name: &str, content: &[u8], at: i64) -> Record {
        let id = ContentId::of(content);
        Record::new(
            Owner::new(owner),
            name,
            id,
            id,
            content.len() as u64,
            Utc.timestamp_opt(at, 0).unwrap(),
        )
    }

    fn alice() -> Owner {
        Owner::new("alice")
    }

    // ---- Insert / lookup ----

    #[test]
    fn insert_and_lookup() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "cat.jpg", b"cat", 1)).unwrap();

        let found = index.lookup(&alice(), "cat.jpg").unwrap().unwrap();
        assert_eq!(found.content_id, ContentId::of(b"cat"));
        assert!(!found.deleted);
    }

    #[test]
    fn lookup_missing_returns_none() {
        let index = InMemoryPictureIndex::new();
        assert!(index.lookup(&alice(), "nope.jpg").unwrap().is_none());
    }

    #[test]
    fn insert_conflicts_with_existing_row() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "cat.jpg", b"v1", 1)).unwrap();

        let err = index
            .insert(record("alice", "cat.jpg", b"v2", 2))
            .unwrap_err();
        assert!(matches!(err, IndexError::Conflict { .. }));
    }

    #[test]
    fn records_are_scoped_per_owner() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "cat.jpg", b"same", 1)).unwrap();
        // Same name and content under another owner is a separate record.
        index.insert(record("bob", "cat.jpg", b"same", 2)).unwrap();
        assert_eq!(index.len(), 2);
    }

    // ---- Compare-and-set update ----

    #[test]
    fn update_with_matching_expectation() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "cat.jpg", b"v1", 1)).unwrap();

        let new_id = ContentId::of(b"v2");
        index
            .update(
                &alice(),
                "cat.jpg",
                &ContentId::of(b"v1"),
                RecordPatch {
                    content_id: new_id,
                    digest: new_id,
                    size: 2,
                },
            )
            .unwrap();

        let found = index.lookup(&alice(), "cat.jpg").unwrap().unwrap();
        assert_eq!(found.content_id, new_id);
        assert_eq!(found.size, 2);
    }

    #[test]
    fn update_preserves_created_at() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "cat.jpg", b"v1", 42)).unwrap();

        let new_id = ContentId::of(b"v2");
        index
            .update(
                &alice(),
                "cat.jpg",
                &ContentId::of(b"v1"),
                RecordPatch {
                    content_id: new_id,
                    digest: new_id,
                    size: 2,
                },
            )
            .unwrap();

        let found = index.lookup(&alice(), "cat.jpg").unwrap().unwrap();
        assert_eq!(found.created_at.timestamp(), 42);
    }

    #[test]
    fn update_with_stale_expectation_conflicts() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "cat.jpg", b"v2", 1)).unwrap();

        let stale = ContentId::of(b"v1");
        let err = index
            .update(
                &alice(),
                "cat.jpg",
                &stale,
                RecordPatch {
                    content_id: ContentId::of(b"v3"),
                    digest: ContentId::of(b"v3"),
                    size: 2,
                },
            )
            .unwrap_err();
        assert!(matches!(err, IndexError::Conflict { .. }));

        // The row is untouched.
        let found = index.lookup(&alice(), "cat.jpg").unwrap().unwrap();
        assert_eq!(found.content_id, ContentId::of(b"v2"));
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let index = InMemoryPictureIndex::new();
        let id = ContentId::of(b"x");
        let err = index
            .update(
                &alice(),
                "ghost.jpg",
                &id,
                RecordPatch {
                    content_id: id,
                    digest: id,
                    size: 1,
                },
            )
            .unwrap_err();
        assert!(matches!(err, IndexError::NotFound { .. }));
    }

    // ---- Delete lifecycle ----

    #[test]
    fn soft_delete_hides_from_listing_but_keeps_row() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "cat.jpg", b"cat", 1)).unwrap();
        index.soft_delete(&alice(), "cat.jpg").unwrap();

        // Gone from listings.
        assert!(index.list(&alice(), None).unwrap().is_empty());
        // Still present for gating, flagged deleted.
        let row = index.lookup(&alice(), "cat.jpg").unwrap().unwrap();
        assert!(row.deleted);
        // The name is still taken: a fresh insert conflicts.
        let err = index
            .insert(record("alice", "cat.jpg", b"new", 2))
            .unwrap_err();
        assert!(matches!(err, IndexError::Conflict { .. }));
    }

    #[test]
    fn hard_delete_frees_the_name() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "cat.jpg", b"cat", 1)).unwrap();
        index.soft_delete(&alice(), "cat.jpg").unwrap();
        index.hard_delete(&alice(), "cat.jpg").unwrap();

        assert!(index.lookup(&alice(), "cat.jpg").unwrap().is_none());
        // Re-creation succeeds now.
        index.insert(record("alice", "cat.jpg", b"new", 2)).unwrap();
    }

    #[test]
    fn deletes_on_missing_rows_are_not_found() {
        let index = InMemoryPictureIndex::new();
        assert!(matches!(
            index.soft_delete(&alice(), "ghost.jpg").unwrap_err(),
            IndexError::NotFound { .. }
        ));
        assert!(matches!(
            index.hard_delete(&alice(), "ghost.jpg").unwrap_err(),
            IndexError::NotFound { .. }
        ));
    }

    // ---- Listing ----

    #[test]
    fn list_orders_by_creation_time() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "b.jpg", b"b", 2)).unwrap();
        index.insert(record("alice", "a.jpg", b"a", 1)).unwrap();
        index.insert(record("alice", "c.jpg", b"c", 3)).unwrap();

        let names: Vec<String> = index
            .list(&alice(), None)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn list_excludes_other_owners() {
        let index = InMemoryPictureIndex::new();
        index.insert(record("alice", "a.jpg", b"a", 1)).unwrap();
        index.insert(record("bob", "b.jpg", b"b", 2)).unwrap();

        let listed = index.list(&alice(), None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "a.jpg");
    }

    #[test]
    fn list_applies_range_windows() {
        let index = InMemoryPictureIndex::new();
        for i in 0..10 {
            index
                .insert(record("alice", &format!("p{i}.jpg"), format!("{i}").as_bytes(), i))
                .unwrap();
        }

        let range = RangeSpec::parse("records=0-2,8-").unwrap();
        let names: Vec<String> = index
            .list(&alice(), Some(&range))
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["p0.jpg", "p1.jpg", "p2.jpg", "p8.jpg", "p9.jpg"]);
    }
}
