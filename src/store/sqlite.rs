//! SQLite-backed content store.
//!
//! Every operation opens its own connection and closes it before returning;
//! mutations run inside a transaction that is committed before the
//! connection is dropped. Nothing is pooled or cached between calls.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ErrorCode as SqliteErrorCode, OptionalExtension, Row};
use serde_json::Value;

use super::{
    now_timestamp, Collection, ContentStore, NewRecord, Record, RecordId, RecordPatch, Status,
    StoreError, StoreResult,
};

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS pages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        document TEXT,
        hero TEXT,
        meta TEXT,
        status TEXT NOT NULL,
        published_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        document TEXT,
        hero TEXT,
        meta TEXT,
        status TEXT NOT NULL,
        published_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        document TEXT,
        hero TEXT,
        meta TEXT,
        status TEXT NOT NULL,
        published_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_pages_status_created ON pages(status, created_at);
    CREATE INDEX IF NOT EXISTS idx_posts_status_created ON posts(status, created_at);
";

/// A [`ContentStore`] persisted in a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be created,
    /// or if the schema cannot be applied.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self { path };
        store.connect()?.execute_batch(SCHEMA)?;
        tracing::debug!(path = %store.path.display(), "Content store opened");
        Ok(store)
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            r"
            PRAGMA busy_timeout=30000;
            PRAGMA foreign_keys=ON;
            ",
        )?;
        Ok(conn)
    }
}

fn encode(value: Option<&Value>) -> StoreResult<Option<String>> {
    Ok(value.map(serde_json::to_string).transpose()?)
}

fn decode(text: Option<String>) -> Option<Value> {
    // Documents written by other tools may not be JSON; keep them as strings
    text.map(|t| serde_json::from_str(&t).unwrap_or(Value::String(t)))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    let status: String = row.get(5)?;
    Ok(Record {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        document: decode(row.get(3)?),
        meta: decode(row.get(4)?),
        status: Status::from_stored(&status),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Maps a UNIQUE violation on `slug` to [`StoreError::Duplicate`].
fn map_write_error(err: rusqlite::Error, collection: Collection, slug: Option<&str>) -> StoreError {
    match (&err, slug) {
        (rusqlite::Error::SqliteFailure(e, _), Some(slug))
            if e.code == SqliteErrorCode::ConstraintViolation =>
        {
            StoreError::Duplicate {
                collection,
                field: "slug",
                value: slug.to_string(),
            }
        }
        _ => StoreError::Sqlite(err),
    }
}

impl ContentStore for SqliteStore {
    fn insert(&self, collection: Collection, record: NewRecord) -> StoreResult<RecordId> {
        let document = encode(record.document.as_ref())?;
        let hero = encode(record.hero.as_ref())?;
        let meta = encode(record.meta.as_ref())?;
        let now = now_timestamp();
        let published_at = (record.status == Status::Published).then(|| now.clone());

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let sql = format!(
            "INSERT INTO {} (slug, title, document, hero, meta, status, published_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            collection.table()
        );
        tx.execute(
            &sql,
            params![
                record.slug,
                record.title,
                document,
                hero,
                meta,
                record.status.as_str(),
                published_at,
                now
            ],
        )
        .map_err(|e| map_write_error(e, collection, Some(&record.slug)))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!(%collection, id, slug = %record.slug, "Record inserted");
        Ok(id)
    }

    fn get(&self, collection: Collection, id: RecordId) -> StoreResult<Option<Record>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT id, slug, title, document, meta, status, created_at, updated_at
             FROM {} WHERE id = ?1",
            collection.table()
        );
        Ok(conn.query_row(&sql, [id], record_from_row).optional()?)
    }

    fn recent(
        &self,
        collection: Collection,
        status: Status,
        limit: usize,
    ) -> StoreResult<Vec<Record>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT id, slug, title, document, meta, status, created_at, updated_at
             FROM {}
             WHERE status = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
            collection.table()
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![status.as_str(), limit], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn update(&self, collection: Collection, id: RecordId, patch: RecordPatch) -> StoreResult<bool> {
        let document = encode(patch.document.as_ref())?;
        let meta = encode(patch.meta.as_ref())?;

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let sql = format!(
            "UPDATE {} SET
                slug = COALESCE(?1, slug),
                title = COALESCE(?2, title),
                document = COALESCE(?3, document),
                meta = COALESCE(?4, meta),
                updated_at = ?5
             WHERE id = ?6",
            collection.table()
        );
        let changed = tx
            .execute(
                &sql,
                params![patch.slug, patch.title, document, meta, now_timestamp(), id],
            )
            .map_err(|e| map_write_error(e, collection, patch.slug.as_deref()))?;
        tx.commit()?;

        Ok(changed > 0)
    }

    fn delete(&self, collection: Collection, id: RecordId) -> StoreResult<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", collection.table());
        let changed = tx.execute(&sql, [id])?;
        tx.commit()?;

        Ok(changed > 0)
    }
}
