use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};
#[cfg(test)]
use rusqlite::OptionalExtension;

use super::{generate_id, Collection, DatabaseError, Document, DocumentStore, Fields};

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS schema_version (
         version INTEGER PRIMARY KEY,
         applied_at TEXT NOT NULL DEFAULT (datetime('now'))
     );
     CREATE TABLE IF NOT EXISTS documents (
         collection TEXT NOT NULL,
         id TEXT NOT NULL,
         body TEXT NOT NULL,
         created_at TEXT NOT NULL DEFAULT (datetime('now')),
         PRIMARY KEY (collection, id)
     );
     INSERT INTO schema_version (version) VALUES (1);",
)];

/// Single-file local document store.
///
/// Each document is one row keyed by (collection, id) with a JSON body.
/// Reads return documents in insertion order. rusqlite calls block, so
/// every trait method runs them on the blocking thread pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite store at the given path and run migrations
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    #[cfg(test)]
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
            f(&guard)
        })
        .await?
    }
}

/// Run all pending migrations
fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    for &(version, sql) in MIGRATIONS {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

fn decode_body(id: String, body: &str) -> Result<Document, DatabaseError> {
    let fields: Fields = serde_json::from_str(body).map_err(|e| DatabaseError::Decode {
        id: id.clone(),
        reason: e.to_string(),
    })?;
    Ok(Document { id, fields })
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Document>, DatabaseError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body FROM documents WHERE collection = ?1 ORDER BY rowid",
            )?;
            let rows = stmt.query_map(params![collection.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut docs = Vec::new();
            for row in rows {
                let (id, body) = row?;
                docs.push(decode_body(id, &body)?);
            }
            Ok(docs)
        })
        .await
    }

    async fn is_empty(&self, collection: Collection) -> Result<bool, DatabaseError> {
        self.with_conn(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ?1)",
                params![collection.as_str()],
                |row| row.get(0),
            )?;
            Ok(!exists)
        })
        .await
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<String, DatabaseError> {
        let id = generate_id();
        let body = serde_json::to_string(&fields)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                params![collection.as_str(), id, body],
            )?;
            Ok(id)
        })
        .await
    }

    async fn insert_if_absent(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, DatabaseError> {
        let id = id.to_string();
        let body = serde_json::to_string(&fields)?;
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                params![collection.as_str(), id, body],
            )?;
            Ok(changed == 1)
        })
        .await
    }
}

#[cfg(test)]
impl SqliteStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, DatabaseError> {
        let conn = self.lock()?;
        let body = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        body.map(|b| decode_body(id.to_string(), &b)).transpose()
    }
}
