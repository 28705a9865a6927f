//! Application state and the user actions it supports.

use chrono::NaiveDate;
use cita_core::{
  Appointment, AppointmentId, AppointmentStore, Error as StoreError,
  storage::KeyValueStorage,
  validate::AppointmentForm,
};

use crate::ui::form::{FieldErrors, FormMode};

// ─── Notices ──────────────────────────────────────────────────────────────────

/// What the user is told after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Saved(Appointment),
  Updated(Appointment),
  Deleted(AppointmentId),
  /// The targeted appointment no longer exists; nothing changed.
  NotFound(AppointmentId),
  /// Some fields failed validation; see [`App::errors`].
  Invalid,
}

impl Notice {
  /// Whether the action went through.
  pub fn is_success(&self) -> bool {
    matches!(self, Notice::Saved(_) | Notice::Updated(_) | Notice::Deleted(_))
  }
}

impl std::fmt::Display for Notice {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Notice::Saved(a) => write!(f, "appointment saved ({})", a.id),
      Notice::Updated(a) => write!(f, "appointment updated ({})", a.id),
      Notice::Deleted(id) => write!(f, "appointment deleted ({id})"),
      Notice::NotFound(id) => write!(f, "no appointment with id {id}"),
      Notice::Invalid => f.write_str("please correct the highlighted fields"),
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// The booking form and its backing store.
pub struct App<S> {
  store: AppointmentStore<S>,

  /// Values currently in the form; `form.id` is set while editing.
  pub form: AppointmentForm,

  /// Messages displayed beside the form fields.
  pub errors: FieldErrors,

  /// The day submissions are validated against.
  today: NaiveDate,
}

impl<S: KeyValueStorage> App<S> {
  pub fn new(store: AppointmentStore<S>, today: NaiveDate) -> Self {
    Self {
      store,
      form: AppointmentForm::default(),
      errors: FieldErrors::default(),
      today,
    }
  }

  pub fn mode(&self) -> FormMode { FormMode::for_id(self.form.id.as_ref()) }

  /// The rows of the appointment table, in order.
  pub async fn appointments(&self) -> anyhow::Result<Vec<Appointment>> {
    Ok(self.store.load_all().await?)
  }

  pub async fn appointment(&self, id: &AppointmentId) -> anyhow::Result<Option<Appointment>> {
    Ok(self.store.get(id).await?)
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  /// Load an appointment into the form, switching to edit mode.
  ///
  /// Returns `false` (and leaves the form alone) if the id is unknown.
  pub async fn begin_edit(&mut self, id: &AppointmentId) -> anyhow::Result<bool> {
    match self.store.get(id).await? {
      Some(appt) => {
        self.form = AppointmentForm::from_appointment(&appt);
        self.errors.clear();
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Validate the form and, if it passes, save it.
  ///
  /// On success the form is reset to create mode. Storage failures are
  /// returned as errors; the form keeps its values so nothing typed is lost.
  pub async fn submit(&mut self) -> anyhow::Result<Notice> {
    let submission = match self.form.parse(self.today) {
      Ok(submission) => {
        self.errors.clear();
        submission
      }
      Err(validation) => {
        self.errors.apply(&validation);
        tracing::debug!(failing = self.errors.len(), "submission rejected");
        return Ok(Notice::Invalid);
      }
    };
    let editing = submission.target().is_some();

    let notice = match self.store.upsert(submission).await {
      Ok(stored) if editing => Notice::Updated(stored),
      Ok(stored) => Notice::Saved(stored),
      Err(StoreError::NotFound(id)) => Notice::NotFound(id),
      Err(e) => return Err(e.into()),
    };

    self.form = AppointmentForm::default();
    self.errors.clear();
    Ok(notice)
  }

  /// Delete an appointment by id.
  pub async fn delete(&mut self, id: &AppointmentId) -> anyhow::Result<Notice> {
    if !self.store.remove(id).await? {
      return Ok(Notice::NotFound(id.clone()));
    }
    if self.form.id.as_ref() == Some(id) {
      self.form = AppointmentForm::default();
      self.errors.clear();
    }
    Ok(Notice::Deleted(id.clone()))
  }
}

#[cfg(test)]
mod tests {
  use cita_core::{
    storage::MemoryStorage,
    validate::{Field, INVALID_PHONE, NAME_REQUIRED},
  };

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() }

  fn app() -> App<MemoryStorage> {
    App::new(AppointmentStore::new(MemoryStorage::new()), today())
  }

  fn fill(app: &mut App<MemoryStorage>, first_name: &str) {
    app.form = AppointmentForm {
      id:          app.form.id.clone(),
      date:        "2024-06-17".into(),
      time:        "11:00".into(),
      first_name:  first_name.into(),
      last_name:   "Vidal".into(),
      national_id: "55667788K".into(),
      phone:       "677889900".into(),
      birth_date:  "1995-12-24".into(),
      notes:       String::new(),
    };
  }

  #[tokio::test]
  async fn create_then_list() {
    let mut app = app();
    assert_eq!(app.mode(), FormMode::Create);
    fill(&mut app, "Rosa");

    let notice = app.submit().await.unwrap();
    assert!(matches!(notice, Notice::Saved(_)));
    assert!(notice.to_string().starts_with("appointment saved"));
    assert_eq!(app.form, AppointmentForm::default());

    let rows = app.appointments().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].details.first_name, "Rosa");
  }

  #[tokio::test]
  async fn invalid_submission_shows_errors_and_saves_nothing() {
    let mut app = app();
    fill(&mut app, "");
    app.form.phone = "6778".into();

    let notice = app.submit().await.unwrap();
    assert_eq!(notice, Notice::Invalid);
    assert!(!notice.is_success());
    assert_eq!(app.errors.get(Field::FirstName), Some(NAME_REQUIRED));
    assert_eq!(app.errors.get(Field::Phone), Some(INVALID_PHONE));
    assert!(app.appointments().await.unwrap().is_empty());

    // Fixing the fields clears their messages on the next submit.
    app.form.first_name = "Rosa".into();
    app.form.phone = "677889900".into();
    app.submit().await.unwrap();
    assert!(app.errors.is_empty());
  }

  #[tokio::test]
  async fn edit_flow_updates_in_place() {
    let mut app = app();
    fill(&mut app, "Rosa");
    app.submit().await.unwrap();
    fill(&mut app, "Sara");
    app.submit().await.unwrap();
    let rows = app.appointments().await.unwrap();

    assert!(app.begin_edit(&rows[0].id).await.unwrap());
    assert_eq!(app.mode(), FormMode::Edit(rows[0].id.clone()));
    assert_eq!(app.mode().submit_label(), "Update");
    assert_eq!(app.form.first_name, "Rosa");

    app.form.first_name = "Rocío".into();
    let notice = app.submit().await.unwrap();
    assert!(matches!(notice, Notice::Updated(ref a) if a.id == rows[0].id));
    assert_eq!(app.mode(), FormMode::Create);

    let after = app.appointments().await.unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].details.first_name, "Rocío");
    assert_eq!(after[1], rows[1]);
  }

  #[tokio::test]
  async fn edit_of_deleted_appointment_is_a_notice() {
    let mut app = app();
    fill(&mut app, "Rosa");
    app.submit().await.unwrap();
    let id = app.appointments().await.unwrap()[0].id.clone();

    app.begin_edit(&id).await.unwrap();
    // Removed behind the form's back, e.g. from another session.
    app.store.remove(&id).await.unwrap();

    let notice = app.submit().await.unwrap();
    assert_eq!(notice, Notice::NotFound(id));
    assert!(app.appointments().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn begin_edit_unknown_id() {
    let mut app = app();
    assert!(!app.begin_edit(&"nope".into()).await.unwrap());
    assert_eq!(app.mode(), FormMode::Create);
  }

  #[tokio::test]
  async fn delete_reports_outcome() {
    let mut app = app();
    fill(&mut app, "Rosa");
    app.submit().await.unwrap();
    let id = app.appointments().await.unwrap()[0].id.clone();

    assert_eq!(app.delete(&id).await.unwrap(), Notice::Deleted(id.clone()));
    assert_eq!(app.delete(&id).await.unwrap(), Notice::NotFound(id));
  }

  #[tokio::test]
  async fn storage_failure_is_an_error_and_keeps_the_form() {
    let mut app = App::new(AppointmentStore::new(MemoryStorage::with_quota(16)), today());
    fill(&mut app, "Rosa");

    assert!(app.submit().await.is_err());
    assert_eq!(app.form.first_name, "Rosa");
    assert!(app.appointments().await.unwrap().is_empty());
  }
}
