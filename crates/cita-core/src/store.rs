//! [`AppointmentStore`] — CRUD over the persisted appointment list.
//!
//! The whole list is kept as one JSON array under a single storage key. Every
//! operation reads that array, and every mutation writes the complete result
//! back; the store holds no copy of its own between calls, so what a caller
//! sees after an operation returns is exactly what is persisted.
//!
//! Array elements that do not decode as appointments are not listed, but they
//! are written back unchanged in their original position.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  appointment::{Appointment, AppointmentId, Submission},
  storage::KeyValueStorage,
};

/// Storage key the appointment list lives under.
pub const STORAGE_KEY: &str = "citas";

// ─── Stored elements ─────────────────────────────────────────────────────────

/// One element of the persisted array.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Entry {
  Record(Appointment),
  /// Not a readable appointment; kept verbatim.
  Opaque(Value),
}

impl Entry {
  fn decode(index: usize, value: Value) -> Self {
    match Appointment::deserialize(&value) {
      Ok(appt) => Entry::Record(appt),
      Err(e) => {
        warn!(index, error = %e, "stored appointment is unreadable; keeping it as is");
        Entry::Opaque(value)
      }
    }
  }

  fn record(&self) -> Option<&Appointment> {
    match self {
      Entry::Record(appt) => Some(appt),
      Entry::Opaque(_) => None,
    }
  }

  fn is(&self, id: &AppointmentId) -> bool { self.record().is_some_and(|a| &a.id == id) }
}

/// Give every repeated id after its first occurrence a derived id
/// (`<id>-2`, `<id>-3`, ...) not used anywhere in the list.
///
/// Derived ids depend only on the list, so repeated reads agree on them; the
/// next write persists them.
fn settle_duplicate_ids(entries: &mut [Entry]) {
  let mut taken: HashSet<AppointmentId> =
    entries.iter().filter_map(Entry::record).map(|a| a.id.clone()).collect();
  let mut seen = HashSet::new();

  for entry in entries.iter_mut() {
    let Entry::Record(appt) = entry else { continue };
    if seen.insert(appt.id.clone()) {
      continue;
    }
    let reissued = (2..)
      .map(|n| AppointmentId::from(format!("{}-{n}", appt.id)))
      .find(|candidate| !taken.contains(candidate))
      .unwrap_or_else(AppointmentId::generate);
    warn!(id = %appt.id, new_id = %reissued, "duplicate appointment id; reissuing");
    taken.insert(reissued.clone());
    seen.insert(reissued.clone());
    appt.id = reissued;
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The appointment book, backed by any [`KeyValueStorage`].
#[derive(Debug)]
pub struct AppointmentStore<S> {
  storage: S,
  key:     String,
}

impl<S: KeyValueStorage> AppointmentStore<S> {
  /// A store keeping its list under [`STORAGE_KEY`].
  pub fn new(storage: S) -> Self { Self::with_key(storage, STORAGE_KEY) }

  pub fn with_key(storage: S, key: impl Into<String>) -> Self {
    Self { storage, key: key.into() }
  }

  pub fn storage(&self) -> &S { &self.storage }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Every appointment, in insertion order.
  ///
  /// A missing payload, or one that is not a JSON array, is an empty list.
  /// Only a failure of the storage backend itself is returned as an error.
  pub async fn load_all(&self) -> Result<Vec<Appointment>> {
    let entries = self.read().await?;
    Ok(
      entries
        .into_iter()
        .filter_map(|e| match e {
          Entry::Record(appt) => Some(appt),
          Entry::Opaque(_) => None,
        })
        .collect(),
    )
  }

  /// The appointment with `id`, if present.
  pub async fn get(&self, id: &AppointmentId) -> Result<Option<Appointment>> {
    Ok(self.load_all().await?.into_iter().find(|a| &a.id == id))
  }

  async fn read(&self) -> Result<Vec<Entry>> {
    let raw = self
      .storage
      .get_item(&self.key)
      .await
      .map_err(Error::storage)?;

    let Some(raw) = raw else {
      return Ok(Vec::new());
    };

    let items = match serde_json::from_str::<Value>(&raw) {
      Ok(Value::Array(items)) => items,
      Ok(Value::Null) => return Ok(Vec::new()),
      Ok(_) => {
        warn!(key = %self.key, "stored appointment list is not an array; treating as empty");
        return Ok(Vec::new());
      }
      Err(e) => {
        warn!(key = %self.key, error = %e, "stored appointment list is unreadable; treating as empty");
        return Ok(Vec::new());
      }
    };

    let mut entries: Vec<Entry> = items
      .into_iter()
      .enumerate()
      .map(|(i, v)| Entry::decode(i, v))
      .collect();
    settle_duplicate_ids(&mut entries);
    Ok(entries)
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Insert a new appointment or replace an existing one.
  ///
  /// Without an id, a fresh id is assigned and the record is appended. With
  /// an id, the matching record is replaced in place; if no record matches,
  /// nothing is written and [`Error::NotFound`] is returned.
  pub async fn upsert(&self, submission: Submission) -> Result<Appointment> {
    let mut entries = self.read().await?;
    let Submission { id, details } = submission;

    let stored = match id.filter(|id| !id.is_blank()) {
      Some(id) => {
        let Some(Entry::Record(slot)) = entries.iter_mut().find(|e| e.is(&id)) else {
          return Err(Error::NotFound(id));
        };
        slot.details = details;
        let stored = slot.clone();
        debug!(id = %stored.id, "updating appointment");
        stored
      }
      None => {
        let stored = Appointment { id: AppointmentId::generate(), details };
        debug!(id = %stored.id, "creating appointment");
        entries.push(Entry::Record(stored.clone()));
        stored
      }
    };

    self.persist(&entries).await?;
    Ok(stored)
  }

  /// Delete the appointment with `id`. Returns whether one was removed.
  pub async fn remove(&self, id: &AppointmentId) -> Result<bool> {
    let mut entries = self.read().await?;

    let Some(pos) = entries.iter().position(|e| e.is(id)) else {
      debug!(%id, "no appointment to remove");
      return Ok(false);
    };
    entries.remove(pos);

    self.persist(&entries).await?;
    debug!(%id, "removed appointment");
    Ok(true)
  }

  async fn persist(&self, entries: &[Entry]) -> Result<()> {
    let payload = serde_json::to_string(entries)?;
    self
      .storage
      .set_item(&self.key, payload)
      .await
      .map_err(Error::storage)
  }
}
