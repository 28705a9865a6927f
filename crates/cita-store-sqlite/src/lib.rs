//! SQLite backend for the Cita appointment book.
//!
//! Provides [`SqliteStorage`], a [`KeyValueStorage`](cita_core::storage::KeyValueStorage)
//! over a single SQLite file. Wraps [`tokio_rusqlite`] so all database access
//! runs on a dedicated thread without blocking the async runtime.

mod schema;
mod storage;

pub mod error;

pub use error::{Error, Result};
pub use storage::SqliteStorage;
