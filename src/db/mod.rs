pub mod firestore;
pub mod memory;
pub mod sqlite;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StoreConfig;

/// Field map of a stored document. Documents are flat JSON-like maps.
pub type Fields = serde_json::Map<String, serde_json::Value>;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Access token exchange failed: {0}")]
    Token(String),

    #[error("Malformed document {id}: {reason}")]
    Decode { id: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The three top-level collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Patients,
    Doctors,
    Inventory,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Patients, Collection::Doctors, Collection::Inventory];

    /// Collection name as stored remotely.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Patients => "Patients",
            Collection::Doctors => "Doctors",
            Collection::Inventory => "Inventory",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document: opaque identifier plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Storage capability the application needs from the document database.
///
/// Implementations must make each single-document write atomic; nothing
/// spans documents or collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of `collection`, in the store's iteration order.
    async fn read_all(&self, collection: Collection) -> Result<Vec<Document>, DatabaseError>;

    /// Whether `collection` holds no documents. Backends should answer
    /// without reading the whole collection.
    async fn is_empty(&self, collection: Collection) -> Result<bool, DatabaseError> {
        Ok(self.read_all(collection).await?.is_empty())
    }

    /// Insert under a freshly generated identifier, returned on success.
    async fn insert(&self, collection: Collection, fields: Fields) -> Result<String, DatabaseError>;

    /// Insert under `id` unless a document with that id already exists.
    /// Returns `true` when the document was written.
    async fn insert_if_absent(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, DatabaseError>;
}

/// Shared handle used by request handlers.
pub type SharedStore = Arc<dyn DocumentStore>;

/// Open the store selected by configuration.
pub fn connect(config: &StoreConfig) -> Result<SharedStore, DatabaseError> {
    let store: SharedStore = match config {
        StoreConfig::Firestore { key, .. } => Arc::new(FirestoreStore::new(key.clone())?),
        StoreConfig::Sqlite(path) => Arc::new(SqliteStore::open(path)?),
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!(backend = config.backend_name(), "Document store ready");
    Ok(store)
}

/// Generate an opaque document identifier for stores without their own.
pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_match_remote_layout() {
        let names: Vec<&str> = Collection::ALL.iter().map(Collection::as_str).collect();
        assert_eq!(names, ["Patients", "Doctors", "Inventory"]);
    }

    #[test]
    fn generated_ids_are_unique_and_opaque() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn memory_backend_connects() {
        assert!(connect(&StoreConfig::Memory).is_ok());
    }
}
