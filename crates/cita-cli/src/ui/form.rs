//! Form state shown next to the inputs: the submit mode and the per-field
//! error messages.

use std::{collections::BTreeMap, fmt};

use cita_core::{
  AppointmentId,
  validate::{Feedback, Field, Validation},
};

// ─── Mode ─────────────────────────────────────────────────────────────────────

/// Whether the form creates a new appointment or edits a loaded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
  Create,
  Edit(AppointmentId),
}

impl FormMode {
  /// Edit mode exactly when an id is loaded into the form.
  pub fn for_id(id: Option<&AppointmentId>) -> Self {
    match id.filter(|id| !id.is_blank()) {
      Some(id) => FormMode::Edit(id.clone()),
      None => FormMode::Create,
    }
  }

  /// Label of the visible submit button.
  pub fn submit_label(&self) -> &'static str {
    match self {
      FormMode::Create => "Save",
      FormMode::Edit(_) => "Update",
    }
  }
}

// ─── Field errors ─────────────────────────────────────────────────────────────

/// Messages currently displayed beside the form fields.
///
/// Each field shows at most one message; re-failing a field replaces its
/// message rather than adding another, and passing clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
  shown: BTreeMap<Field, &'static str>,
}

impl FieldErrors {
  /// Apply the outcome of one validation pass.
  pub fn apply(&mut self, validation: &Validation) {
    for (field, feedback) in validation.outcomes() {
      match feedback {
        Feedback::Set(msg) => {
          self.shown.insert(field, msg);
        }
        Feedback::Clear => {
          self.shown.remove(&field);
        }
        Feedback::Untouched => {}
      }
    }
  }

  pub fn clear(&mut self) { self.shown.clear(); }

  pub fn is_empty(&self) -> bool { self.shown.is_empty() }

  pub fn get(&self, field: Field) -> Option<&'static str> { self.shown.get(&field).copied() }

  pub fn len(&self) -> usize { self.shown.len() }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (field, msg) in &self.shown {
      writeln!(f, "  {field}: {msg}")?;
    }
    Ok(())
  }
}
