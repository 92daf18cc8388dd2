//! Content store collaborator.
//!
//! The MCP tools only need a handful of operations from the backing store:
//! insert a record and get its identifier back, fetch the N most recent
//! records with a given status, and get/update/delete by identifier. Those
//! operations are captured by [`ContentStore`]; the crate ships a SQLite
//! implementation for real use and an in-memory one for tests.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde_json::Value;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected the operation (constraint violation, I/O, ...).
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A structured document could not be encoded or decoded.
    #[error("Document encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The database file location could not be prepared.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A uniqueness constraint was violated.
    #[error("Duplicate {field} in {collection}: {value}")]
    Duplicate {
        /// Collection the record belongs to.
        collection: Collection,
        /// Column that must be unique.
        field: &'static str,
        /// The offending value.
        value: String,
    },
}

/// The record collections managed by the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Static pages with a block layout.
    Pages,
    /// Blog posts with a rich-text body.
    Posts,
    /// Post categories.
    Categories,
}

impl Collection {
    /// All collections, in schema order.
    pub const ALL: [Self; 3] = [Self::Pages, Self::Posts, Self::Categories];

    /// Table name backing this collection.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Posts => "posts",
            Self::Categories => "categories",
        }
    }

    /// Singular, capitalised record noun used in user-facing text.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Pages => "Page",
            Self::Posts => "Post",
            Self::Categories => "Category",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Publication status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Visible on the site.
    Published,
    /// Work in progress.
    Draft,
}

impl Status {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
        }
    }

    /// Parses the stored representation, treating anything unknown as a draft.
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        if s == "published" {
            Self::Published
        } else {
            Self::Draft
        }
    }
}

/// Identifier assigned by the store on insert.
pub type RecordId = i64;

/// A record to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// URL slug, unique within the collection.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Structured body (page layout or post rich text).
    pub document: Option<Value>,
    /// Page hero block.
    pub hero: Option<Value>,
    /// SEO metadata (title and description).
    pub meta: Option<Value>,
    /// Publication status.
    pub status: Status,
}

/// Field changes applied by [`ContentStore::update`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    /// New slug.
    pub slug: Option<String>,
    /// New title.
    pub title: Option<String>,
    /// New structured body.
    pub document: Option<Value>,
    /// New metadata.
    pub meta: Option<Value>,
}

impl RecordPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slug.is_none() && self.title.is_none() && self.document.is_none() && self.meta.is_none()
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// URL slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Structured body.
    pub document: Option<Value>,
    /// SEO metadata.
    pub meta: Option<Value>,
    /// Publication status.
    pub status: Status,
    /// Creation timestamp (RFC 3339, UTC).
    pub created_at: String,
    /// Last update timestamp (RFC 3339, UTC).
    pub updated_at: String,
}

impl Record {
    /// The summary stored in the record's metadata, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.get("description"))
            .and_then(Value::as_str)
    }
}

/// The operations the MCP tools require from a backing store.
///
/// Implementations must make each call self-contained: no state is carried
/// between calls apart from the stored data itself.
pub trait ContentStore: Send + Sync {
    /// Inserts a record and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the record.
    fn insert(&self, collection: Collection, record: NewRecord) -> StoreResult<RecordId>;

    /// Fetches one record by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn get(&self, collection: Collection, id: RecordId) -> StoreResult<Option<Record>>;

    /// Fetches up to `limit` records with the given status, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn recent(&self, collection: Collection, status: Status, limit: usize)
        -> StoreResult<Vec<Record>>;

    /// Applies a patch. Returns `false` if no such record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the change.
    fn update(&self, collection: Collection, id: RecordId, patch: RecordPatch) -> StoreResult<bool>;

    /// Deletes a record. Returns `false` if no such record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the deletion.
    fn delete(&self, collection: Collection, id: RecordId) -> StoreResult<bool>;
}

/// Current time in the stored timestamp format.
///
/// Microsecond precision keeps lexical order equal to chronological order.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        assert_eq!(Status::from_stored(Status::Published.as_str()), Status::Published);
        assert_eq!(Status::from_stored("draft"), Status::Draft);
        assert_eq!(Status::from_stored("archived"), Status::Draft);
    }

    #[test]
    fn empty_patch() {
        assert!(RecordPatch::default().is_empty());
        let patch = RecordPatch {
            title: Some("New".to_string()),
            ..RecordPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let a = now_timestamp();
        let b = now_timestamp();
        assert!(a <= b);
        assert!(a.ends_with('Z'));
    }

    #[test]
    fn duplicate_error_display() {
        let err = StoreError::Duplicate {
            collection: Collection::Pages,
            field: "slug",
            value: "about".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate slug in pages: about");
    }
}
