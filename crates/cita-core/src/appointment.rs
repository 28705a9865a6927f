//! Appointment types — the single record kind held by the store.
//!
//! Records are persisted as one JSON array. Field names on the wire are the
//! ones the booking form has always written (`fecha`, `hora`, `nombre`, ...),
//! so lists saved by earlier versions load unchanged.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque identifier of an appointment.
///
/// Older lists stored millisecond timestamps as JSON numbers; those are read
/// back as their decimal string. New ids are random UUIDs. Ids are always
/// written as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct AppointmentId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
  Text(String),
  Number(serde_json::Number),
}

impl From<RawId> for AppointmentId {
  fn from(raw: RawId) -> Self {
    match raw {
      RawId::Text(s) => Self(s),
      RawId::Number(n) => Self(n.to_string()),
    }
  }
}

impl From<AppointmentId> for String {
  fn from(id: AppointmentId) -> Self { id.0 }
}

impl From<&str> for AppointmentId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for AppointmentId {
  fn from(s: String) -> Self { Self(s) }
}

impl AppointmentId {
  /// A fresh, collision-resistant identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4().hyphenated().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// A blank id means "not assigned yet".
  pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }
}

impl fmt::Display for AppointmentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Everything about an appointment except its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDetails {
  #[serde(rename = "fecha")]
  pub date:        NaiveDate,
  #[serde(rename = "hora", with = "hh_mm")]
  pub time:        NaiveTime,
  #[serde(rename = "nombre")]
  pub first_name:  String,
  #[serde(rename = "apellidos")]
  pub last_name:   String,
  /// 8 digits followed by an uppercase letter.
  #[serde(rename = "dni")]
  pub national_id: String,
  /// 9 digits.
  #[serde(rename = "telefono")]
  pub phone:       String,
  #[serde(rename = "fechaNacimiento")]
  pub birth_date:  NaiveDate,
  #[serde(rename = "observaciones", default, deserialize_with = "null_as_empty")]
  pub notes:       String,
}

/// A persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  pub id:      AppointmentId,
  #[serde(flatten)]
  pub details: AppointmentDetails,
}

/// Input to [`AppointmentStore::upsert`](crate::store::AppointmentStore::upsert).
///
/// `id: None` (or a blank id) creates a new appointment; any other id
/// replaces the matching record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
  pub id:      Option<AppointmentId>,
  pub details: AppointmentDetails,
}

impl Submission {
  pub fn create(details: AppointmentDetails) -> Self { Self { id: None, details } }

  pub fn update(id: AppointmentId, details: AppointmentDetails) -> Self {
    Self { id: Some(id), details }
  }

  /// The target id, if it names an existing record.
  pub fn target(&self) -> Option<&AppointmentId> {
    self.id.as_ref().filter(|id| !id.is_blank())
  }
}

// ─── Wire helpers ────────────────────────────────────────────────────────────

/// Notes saved as `null` read back as empty text.
fn null_as_empty<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// `HH:MM` times, as written by a time input. Seconds are accepted on read.
mod hh_mm {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&t.format("%H:%M"))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_time(&raw).ok_or_else(|| D::Error::custom(format!("invalid time: {raw:?}")))
  }
}

/// Parse an `HH:MM` (or `HH:MM:SS`) time of day.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
  let raw = raw.trim();
  NaiveTime::parse_from_str(raw, "%H:%M")
    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    .ok()
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
