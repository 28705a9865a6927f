//! Core types and operations for the Cita appointment book.
//!
//! This crate holds the appointment model, the field validator and the
//! [`AppointmentStore`](store::AppointmentStore) CRUD manager. Persistence is
//! abstracted behind [`KeyValueStorage`](storage::KeyValueStorage); concrete
//! backends live in their own crates.

pub mod appointment;
pub mod error;
pub mod storage;
pub mod store;
pub mod validate;

pub use appointment::{Appointment, AppointmentDetails, AppointmentId, Submission};
pub use error::{Error, Result};
pub use store::AppointmentStore;
