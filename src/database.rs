use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Lock error")]
    Lock,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not determine data directory")]
    NoDataDir,
}

/// A durable named slot in local key-value storage.
///
/// The document store persists its whole state as one value under a fixed key.
pub trait KeyValueSlot {
    fn read(&self, key: &str) -> Result<Option<String>, DbError>;
    fn write(&self, key: &str, value: &str) -> Result<(), DbError>;
    fn remove(&self, key: &str) -> Result<bool, DbError>;
}

impl<T: KeyValueSlot + ?Sized> KeyValueSlot for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, DbError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), DbError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, DbError> {
        (**self).remove(key)
    }
}

pub struct Database {
    pub(crate) conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) a database file, creating parent directories as needed
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Database {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        };
        db.create_kv_table()?;
        Ok(db)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Database {
            conn: Mutex::new(conn),
            path: None,
        };
        db.create_kv_table()?;
        Ok(db)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the key-value table
    pub fn create_kv_table(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

impl KeyValueSlot for Database {
    fn read(&self, key: &str) -> Result<Option<String>, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;

        let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;

        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;
        let now = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;

        let affected = conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;

        Ok(affected > 0)
    }
}

/// `<data dir>/rich-editor/rich-editor.db`
pub fn default_database_path() -> Result<PathBuf, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::NoDataDir)?;
    Ok(data_dir.join("rich-editor").join("rich-editor.db"))
}
