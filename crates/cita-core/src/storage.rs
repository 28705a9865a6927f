//! The `KeyValueStorage` trait and an in-memory implementation.
//!
//! The store needs nothing more than a string-to-string map: one key holds
//! the whole serialised appointment list. Backends (e.g.
//! `cita-store-sqlite`) implement this trait; [`MemoryStorage`] is used in
//! tests and for throwaway sessions.

use std::{
  collections::HashMap,
  future::Future,
  sync::{Mutex, MutexGuard},
};

use thiserror::Error;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A persistent string map, in the manner of a browser's local storage.
///
/// `set_item` must either store the whole value or fail; a reader never sees
/// a partially written value.
pub trait KeyValueStorage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`, or `None` if the key is unset.
  fn get_item<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Replace the value stored under `key`.
  fn set_item<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MemoryStorageError {
  #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
  QuotaExceeded { needed: usize, quota: usize },
}

/// A [`KeyValueStorage`] that lives in process memory.
///
/// An optional byte quota (keys plus values) makes writes fail the way a full
/// browser storage area does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  items: Mutex<HashMap<String, String>>,
  quota: Option<usize>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  /// Storage that refuses writes which would grow it past `bytes`.
  pub fn with_quota(bytes: usize) -> Self {
    Self { items: Mutex::default(), quota: Some(bytes) }
  }

  fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
    self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl KeyValueStorage for MemoryStorage {
  type Error = MemoryStorageError;

  async fn get_item(&self, key: &str) -> Result<Option<String>, MemoryStorageError> {
    Ok(self.items().get(key).cloned())
  }

  async fn set_item(&self, key: &str, value: String) -> Result<(), MemoryStorageError> {
    let mut items = self.items();
    if let Some(quota) = self.quota {
      let others: usize = items
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
      let needed = others + key.len() + value.len();
      if needed > quota {
        return Err(MemoryStorageError::QuotaExceeded { needed, quota });
      }
    }
    items.insert(key.to_owned(), value);
    Ok(())
  }
}
