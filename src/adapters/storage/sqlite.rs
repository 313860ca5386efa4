/// SQLite storage adapter
///
/// Implements BlobStorePort on a single key/value table.
use crate::error::Result;
use crate::ports::storage::BlobStorePort;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite storage implementation
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Create a new SQLite storage with the given database path
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> Result<()> {
        use rusqlite_migration::{Migrations, M};

        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../../migrations/001_initial.sql"
        ))]);

        let mut conn = self.conn.lock().unwrap();
        migrations.to_latest(&mut conn)?;

        Ok(())
    }
}

impl BlobStorePort for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().timestamp()],
        )?;
        log::debug!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }
}
