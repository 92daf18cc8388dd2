//! In-process content store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    now_timestamp, Collection, ContentStore, NewRecord, Record, RecordId, RecordPatch, Status,
    StoreError, StoreResult,
};

/// Rows and the last issued id, per collection.
#[derive(Debug, Default)]
struct Tables {
    last_ids: HashMap<Collection, RecordId>,
    rows: HashMap<Collection, Vec<Record>>,
}

/// A [`ContentStore`] kept entirely in memory.
///
/// Records are ordered by insertion, so "most recent" means "last inserted".
/// Slugs are unique per collection, mirroring the SQLite schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection, regardless of status.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.lock().rows.get(&collection).map_or(0, Vec::len)
    }

    /// Returns `true` if no collection holds any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().rows.values().all(Vec::is_empty)
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-written row
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_slug(rows: &[Record], collection: Collection, slug: &str, skip: Option<RecordId>) -> StoreResult<()> {
    if rows.iter().any(|r| r.slug == slug && Some(r.id) != skip) {
        return Err(StoreError::Duplicate {
            collection,
            field: "slug",
            value: slug.to_string(),
        });
    }
    Ok(())
}

impl ContentStore for MemoryStore {
    fn insert(&self, collection: Collection, record: NewRecord) -> StoreResult<RecordId> {
        let mut tables = self.lock();
        let Tables { last_ids, rows } = &mut *tables;

        let rows = rows.entry(collection).or_default();
        check_slug(rows, collection, &record.slug, None)?;

        // Ids are per collection and never reused, like AUTOINCREMENT
        let last_id = last_ids.entry(collection).or_default();
        *last_id += 1;
        let id = *last_id;

        let now = now_timestamp();
        rows.push(Record {
            id,
            slug: record.slug,
            title: record.title,
            document: record.document,
            meta: record.meta,
            status: record.status,
            created_at: now.clone(),
            updated_at: now,
        });
        Ok(id)
    }

    fn get(&self, collection: Collection, id: RecordId) -> StoreResult<Option<Record>> {
        Ok(self
            .lock()
            .rows
            .get(&collection)
            .and_then(|rows| rows.iter().find(|r| r.id == id))
            .cloned())
    }

    fn recent(
        &self,
        collection: Collection,
        status: Status,
        limit: usize,
    ) -> StoreResult<Vec<Record>> {
        Ok(self
            .lock()
            .rows
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .rev()
                    .filter(|r| r.status == status)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn update(&self, collection: Collection, id: RecordId, patch: RecordPatch) -> StoreResult<bool> {
        let mut tables = self.lock();
        let rows = tables.rows.entry(collection).or_default();

        if let Some(ref slug) = patch.slug {
            check_slug(rows, collection, slug, Some(id))?;
        }

        let Some(record) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };

        if let Some(slug) = patch.slug {
            record.slug = slug;
        }
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(document) = patch.document {
            record.document = Some(document);
        }
        if let Some(meta) = patch.meta {
            record.meta = Some(meta);
        }
        record.updated_at = now_timestamp();
        Ok(true)
    }

    fn delete(&self, collection: Collection, id: RecordId) -> StoreResult<bool> {
        let mut tables = self.lock();
        let rows = tables.rows.entry(collection).or_default();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slug: &str, status: Status) -> NewRecord {
        NewRecord {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            document: None,
            hero: None,
            meta: None,
            status,
        }
    }

    #[test]
    fn ids_are_numbered_per_collection() {
        let store = MemoryStore::new();
        let page = store.insert(Collection::Pages, record("a", Status::Published)).unwrap();
        let post = store.insert(Collection::Posts, record("a", Status::Published)).unwrap();
        assert_eq!((page, post), (1, 1));

        assert!(store.insert(Collection::Pages, record("a", Status::Published)).is_err());
        assert!(store.delete(Collection::Pages, page).unwrap());
        let next = store.insert(Collection::Pages, record("b", Status::Published)).unwrap();
        assert_eq!(next, 2);
    }

    #[test]
    fn recent_filters_and_orders() {
        let store = MemoryStore::new();
        for slug in ["a", "b", "c"] {
            store
                .insert(Collection::Posts, record(slug, Status::Published))
                .unwrap();
        }
        store
            .insert(Collection::Posts, record("d", Status::Draft))
            .unwrap();

        let recent = store.recent(Collection::Posts, Status::Published, 2).unwrap();
        let slugs: Vec<_> = recent.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, ["c", "b"]);
        assert_eq!(store.len(Collection::Posts), 4);
        assert_eq!(store.len(Collection::Pages), 0);
    }

    #[test]
    fn duplicate_slug_rejected() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Pages, record("about", Status::Published))
            .unwrap();
        let err = store
            .insert(Collection::Pages, record("about", Status::Published))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.len(Collection::Pages), 1);

        // Slugs are only unique within a collection
        store
            .insert(Collection::Posts, record("about", Status::Published))
            .unwrap();
    }

    #[test]
    fn update_and_delete() {
        let store = MemoryStore::new();
        let id = store
            .insert(Collection::Categories, record("news", Status::Published))
            .unwrap();

        let patch = RecordPatch {
            title: Some("Latest News".to_string()),
            ..RecordPatch::default()
        };
        assert!(store.update(Collection::Categories, id, patch).unwrap());
        let stored = store.get(Collection::Categories, id).unwrap().unwrap();
        assert_eq!(stored.title, "Latest News");
        assert_eq!(stored.slug, "news");

        assert!(store.delete(Collection::Categories, id).unwrap());
        assert!(!store.delete(Collection::Categories, id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn update_missing_record() {
        let store = MemoryStore::new();
        let patch = RecordPatch {
            title: Some("x".to_string()),
            ..RecordPatch::default()
        };
        assert!(!store.update(Collection::Pages, 99, patch).unwrap());
    }
}
