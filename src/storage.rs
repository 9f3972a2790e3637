use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// A string keyed store of string values, kept in a single table of a
/// SQLite database. Every value is written and read whole.
pub struct Storage {
    db: Connection,
}

impl Storage {
    /// Open the storage file, creating it if it does not exist.
    pub fn open(path: &Path) -> Result<Storage> {
        let db = Connection::open(path)
            .with_context(|| format!("Failed to open storage file {}.", path.display()))?;
        Storage::init(db)
    }

    /// A storage that lives only as long as the value does.
    pub fn in_memory() -> Result<Storage> {
        let db = Connection::open_in_memory().context("Failed to open in-memory storage.")?;
        Storage::init(db)
    }

    fn init(db: Connection) -> Result<Storage> {
        db.execute(
            "CREATE TABLE if not exists storage (
                  key             TEXT PRIMARY KEY,
                  value           TEXT NOT NULL
                  )",
            [],
        )
        .context("Failed to create storage table.")?;
        Ok(Storage { db })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("Failed to read '{}' from storage.", key))?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .execute(
                "INSERT INTO storage (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("Failed to write '{}' to storage.", key))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.db
            .execute("DELETE FROM storage WHERE key = ?1", params![key])
            .with_context(|| format!("Failed to remove '{}' from storage.", key))?;
        Ok(())
    }
}
