//! [`SqliteStorage`] — the SQLite implementation of [`KeyValueStorage`].

use std::path::Path;

use cita_core::storage::KeyValueStorage;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{Error, Result, schema::SCHEMA};

// ─── Storage ─────────────────────────────────────────────────────────────────

/// A key-value area backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStorage {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStorage {
  /// Open (or create) a storage file at `path` and run schema initialisation.
  /// Missing parent directories are created.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Error::CreateDir { path: dir.to_path_buf(), source })?;
    }

    debug!(path = %path.display(), "opening sqlite storage");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let storage = Self { conn };
    storage.init_schema().await?;
    Ok(storage)
  }

  /// Open an in-memory storage — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let storage = Self { conn };
    storage.init_schema().await?;
    Ok(storage)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── KeyValueStorage impl ────────────────────────────────────────────────────

impl KeyValueStorage for SqliteStorage {
  type Error = Error;

  async fn get_item(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value = self
      .conn
      .call(move |conn| {
        let value: Option<String> = conn
          .query_row(
            "SELECT value FROM items WHERE key = ?1",
            rusqlite::params![key],
            |r| r.get(0),
          )
          .optional()?;
        Ok(value)
      })
      .await?;
    Ok(value)
  }

  async fn set_item(&self, key: &str, value: String) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
