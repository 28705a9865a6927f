//! Field validation for the booking form.
//!
//! Validation works on the raw strings the form hands over and never touches
//! the store. Every rule runs on every submission, so one pass reports all
//! failing fields at once. For each field the result says whether a message
//! must be shown, cleared, or left alone; the front end applies that to
//! whatever it displays.

use std::{fmt, sync::LazyLock};

use chrono::{NaiveDate, NaiveTime, Timelike};
use regex::Regex;

use crate::appointment::{
  Appointment, AppointmentDetails, AppointmentId, Submission, parse_date, parse_time,
};

static NATIONAL_ID: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9]{8}[A-Z]$").expect("national id pattern"));
static PHONE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9]{9}$").expect("phone pattern"));

/// First bookable time of day, as `(hour, minute)`.
pub const OPENING_TIME: (u32, u32) = (8, 0);
/// Last bookable time of day (inclusive), as `(hour, minute)`.
pub const CLOSING_TIME: (u32, u32) = (20, 0);

// ─── Messages ────────────────────────────────────────────────────────────────

pub const NAME_REQUIRED: &str = "name is required";
pub const LAST_NAME_REQUIRED: &str = "last name is required";
pub const INVALID_NATIONAL_ID: &str = "invalid national ID format";
pub const INVALID_PHONE: &str = "invalid phone format";
pub const DATE_REQUIRED: &str = "date is required";
pub const DATE_IN_PAST: &str = "date cannot be in the past";
pub const INVALID_DATE: &str = "invalid date";
pub const TIME_REQUIRED: &str = "time is required";
pub const INVALID_TIME: &str = "invalid time";
pub const TIME_OUT_OF_HOURS: &str = "time must be between 08:00 and 20:00";
pub const BIRTH_DATE_REQUIRED: &str = "birth date is required";
pub const BIRTH_DATE_IN_FUTURE: &str = "birth date cannot be in the future";

// ─── Fields ──────────────────────────────────────────────────────────────────

/// A form field, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
  Date,
  Time,
  FirstName,
  LastName,
  NationalId,
  Phone,
  BirthDate,
  Notes,
}

impl Field {
  pub const ALL: [Field; 8] = [
    Field::Date,
    Field::Time,
    Field::FirstName,
    Field::LastName,
    Field::NationalId,
    Field::Phone,
    Field::BirthDate,
    Field::Notes,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Field::Date => "date",
      Field::Time => "time",
      Field::FirstName => "first name",
      Field::LastName => "last name",
      Field::NationalId => "national ID",
      Field::Phone => "phone",
      Field::BirthDate => "birth date",
      Field::Notes => "notes",
    }
  }

  fn index(self) -> usize { self as usize }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// What the front end should do with a field's message after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feedback {
  /// The field is not validated; leave its display alone.
  #[default]
  Untouched,
  /// The field failed; show this message.
  Set(&'static str),
  /// The field passed; remove any message shown earlier.
  Clear,
}

impl Feedback {
  pub fn message(self) -> Option<&'static str> {
    match self {
      Feedback::Set(msg) => Some(msg),
      _ => None,
    }
  }
}

/// Per-field outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
  outcomes: [Feedback; Field::ALL.len()],
}

impl Validation {
  pub fn is_valid(&self) -> bool { self.errors().next().is_none() }

  pub fn feedback(&self, field: Field) -> Feedback { self.outcomes[field.index()] }

  /// Every field with its outcome, in form order.
  pub fn outcomes(&self) -> impl Iterator<Item = (Field, Feedback)> + '_ {
    Field::ALL.into_iter().map(|f| (f, self.feedback(f)))
  }

  /// Failing fields and their messages, in form order.
  pub fn errors(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
    self
      .outcomes()
      .filter_map(|(f, fb)| fb.message().map(|msg| (f, msg)))
  }

  fn record<T>(&mut self, field: Field, check: &Result<T, &'static str>) {
    self.outcomes[field.index()] = match check {
      Ok(_) => Feedback::Clear,
      Err(msg) => Feedback::Set(*msg),
    };
  }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Raw field values as typed into the booking form.
///
/// `id` is set while an existing appointment is loaded for editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
  pub id:          Option<AppointmentId>,
  pub date:        String,
  pub time:        String,
  pub first_name:  String,
  pub last_name:   String,
  pub national_id: String,
  pub phone:       String,
  pub birth_date:  String,
  pub notes:       String,
}

impl AppointmentForm {
  /// Fill the form from a stored appointment, ready for editing.
  pub fn from_appointment(appt: &Appointment) -> Self {
    let d = &appt.details;
    Self {
      id:          Some(appt.id.clone()),
      date:        d.date.format("%Y-%m-%d").to_string(),
      time:        d.time.format("%H:%M").to_string(),
      first_name:  d.first_name.clone(),
      last_name:   d.last_name.clone(),
      national_id: d.national_id.clone(),
      phone:       d.phone.clone(),
      birth_date:  d.birth_date.format("%Y-%m-%d").to_string(),
      notes:       d.notes.clone(),
    }
  }

  /// Check every field against the rules as of `today`.
  pub fn validate(&self, today: NaiveDate) -> Validation {
    match self.parse(today) {
      Ok(_) => {
        let mut v = Validation::default();
        for field in Field::ALL.into_iter().filter(|f| *f != Field::Notes) {
          v.outcomes[field.index()] = Feedback::Clear;
        }
        v
      }
      Err(v) => v,
    }
  }

  /// Validate and, if every rule passes, build the submission for the store.
  pub fn parse(&self, today: NaiveDate) -> Result<Submission, Validation> {
    let first_name = required_text(&self.first_name, NAME_REQUIRED);
    let national_id = matching(&NATIONAL_ID, &self.national_id, INVALID_NATIONAL_ID);
    let last_name = required_text(&self.last_name, LAST_NAME_REQUIRED);
    let phone = matching(&PHONE, &self.phone, INVALID_PHONE);
    let date = appointment_date(&self.date, today);
    let time = appointment_time(&self.time);
    let birth_date = birth_date(&self.birth_date, today);

    let mut v = Validation::default();
    v.record(Field::FirstName, &first_name);
    v.record(Field::NationalId, &national_id);
    v.record(Field::LastName, &last_name);
    v.record(Field::Phone, &phone);
    v.record(Field::Date, &date);
    v.record(Field::Time, &time);
    v.record(Field::BirthDate, &birth_date);

    match (date, time, first_name, last_name, national_id, phone, birth_date) {
      (
        Ok(date),
        Ok(time),
        Ok(first_name),
        Ok(last_name),
        Ok(national_id),
        Ok(phone),
        Ok(birth_date),
      ) => Ok(Submission {
        id:      self.id.clone().filter(|id| !id.is_blank()),
        details: AppointmentDetails {
          date,
          time,
          first_name,
          last_name,
          national_id,
          phone,
          birth_date,
          notes: self.notes.clone(),
        },
      }),
      _ => Err(v),
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn required_text(raw: &str, msg: &'static str) -> Result<String, &'static str> {
  if raw.trim().is_empty() {
    Err(msg)
  } else {
    Ok(raw.trim().to_owned())
  }
}

fn matching(re: &Regex, raw: &str, msg: &'static str) -> Result<String, &'static str> {
  if re.is_match(raw) { Ok(raw.to_owned()) } else { Err(msg) }
}

fn required_date(raw: &str, missing: &'static str) -> Result<NaiveDate, &'static str> {
  if raw.trim().is_empty() {
    return Err(missing);
  }
  parse_date(raw).ok_or(INVALID_DATE)
}

fn appointment_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, &'static str> {
  let date = required_date(raw, DATE_REQUIRED)?;
  if date < today { Err(DATE_IN_PAST) } else { Ok(date) }
}

fn birth_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, &'static str> {
  let date = required_date(raw, BIRTH_DATE_REQUIRED)?;
  if date > today { Err(BIRTH_DATE_IN_FUTURE) } else { Ok(date) }
}

fn appointment_time(raw: &str) -> Result<NaiveTime, &'static str> {
  if raw.trim().is_empty() {
    return Err(TIME_REQUIRED);
  }
  let time = parse_time(raw).ok_or(INVALID_TIME)?;
  if within_opening_hours(time) { Ok(time) } else { Err(TIME_OUT_OF_HOURS) }
}

/// Whether `time` falls inside the bookable window, both ends included.
pub fn within_opening_hours(time: NaiveTime) -> bool {
  let secs = |(h, m): (u32, u32)| h * 3600 + m * 60;
  let t = time.num_seconds_from_midnight();
  (secs(OPENING_TIME)..=secs(CLOSING_TIME)).contains(&t)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() }

  fn valid_form() -> AppointmentForm {
    AppointmentForm {
      id:          None,
      date:        "2024-06-20".into(),
      time:        "10:15".into(),
      first_name:  "Lucía".into(),
      last_name:   "García Pérez".into(),
      national_id: "12345678A".into(),
      phone:       "612345678".into(),
      birth_date:  "1990-02-01".into(),
      notes:       String::new(),
    }
  }

  fn message(form: &AppointmentForm, field: Field) -> Option<&'static str> {
    form.validate(today()).feedback(field).message()
  }

  #[test]
  fn valid_form_has_no_errors() {
    let v = valid_form().validate(today());
    assert!(v.is_valid());
    assert_eq!(v.errors().count(), 0);
    assert_eq!(v.feedback(Field::FirstName), Feedback::Clear);
    assert_eq!(v.feedback(Field::Notes), Feedback::Untouched);
  }

  #[test]
  fn valid_form_parses_into_details() {
    let sub = valid_form().parse(today()).unwrap();
    assert!(sub.id.is_none());
    assert_eq!(sub.details.first_name, "Lucía");
    assert_eq!(sub.details.time, NaiveTime::from_hms_opt(10, 15, 0).unwrap());
    assert_eq!(sub.details.date, NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
  }

  #[test]
  fn blank_first_name_reports_only_that_field() {
    let mut form = valid_form();
    form.first_name = "   ".into();
    let v = form.validate(today());
    assert!(!v.is_valid());
    let errors: Vec<_> = v.errors().collect();
    assert_eq!(errors, vec![(Field::FirstName, NAME_REQUIRED)]);
  }

  #[test]
  fn every_failing_field_is_reported() {
    let form = AppointmentForm::default();
    let v = form.validate(today());
    let errors: Vec<_> = v.errors().collect();
    assert_eq!(errors, vec![
      (Field::Date, DATE_REQUIRED),
      (Field::Time, TIME_REQUIRED),
      (Field::FirstName, NAME_REQUIRED),
      (Field::LastName, LAST_NAME_REQUIRED),
      (Field::NationalId, INVALID_NATIONAL_ID),
      (Field::Phone, INVALID_PHONE),
      (Field::BirthDate, BIRTH_DATE_REQUIRED),
    ]);
    assert_eq!(v.feedback(Field::Notes), Feedback::Untouched);
  }

  #[test]
  fn national_id_format() {
    let mut form = valid_form();
    assert_eq!(message(&form, Field::NationalId), None);
    form.national_id = "1234567A".into();
    assert_eq!(message(&form, Field::NationalId), Some(INVALID_NATIONAL_ID));
    form.national_id = "12345678a".into();
    assert_eq!(message(&form, Field::NationalId), Some(INVALID_NATIONAL_ID));
    form.national_id = "12345678AB".into();
    assert_eq!(message(&form, Field::NationalId), Some(INVALID_NATIONAL_ID));
  }

  #[test]
  fn phone_format() {
    let mut form = valid_form();
    form.phone = "123456789".into();
    assert_eq!(message(&form, Field::Phone), None);
    form.phone = "12345678".into();
    assert_eq!(message(&form, Field::Phone), Some(INVALID_PHONE));
    form.phone = "12345678a".into();
    assert_eq!(message(&form, Field::Phone), Some(INVALID_PHONE));
  }

  #[test]
  fn appointment_date_relative_to_today() {
    let mut form = valid_form();
    form.date = "2024-06-14".into();
    assert_eq!(message(&form, Field::Date), Some(DATE_IN_PAST));
    form.date = "2024-06-15".into();
    assert_eq!(message(&form, Field::Date), None);
    form.date = "2024-06-16".into();
    assert_eq!(message(&form, Field::Date), None);
    form.date = "15/06/2024".into();
    assert_eq!(message(&form, Field::Date), Some(INVALID_DATE));
  }

  #[test]
  fn time_window_is_inclusive() {
    let mut form = valid_form();
    for ok in ["08:00", "13:45", "20:00"] {
      form.time = ok.into();
      assert_eq!(message(&form, Field::Time), None, "{ok}");
    }
    for late in ["07:59", "20:01", "23:00"] {
      form.time = late.into();
      assert_eq!(message(&form, Field::Time), Some(TIME_OUT_OF_HOURS), "{late}");
    }
    form.time = "noon".into();
    assert_eq!(message(&form, Field::Time), Some(INVALID_TIME));
  }

  #[test]
  fn birth_date_cannot_be_in_the_future() {
    let mut form = valid_form();
    form.birth_date = "2024-06-15".into();
    assert_eq!(message(&form, Field::BirthDate), None);
    form.birth_date = "2024-06-16".into();
    assert_eq!(message(&form, Field::BirthDate), Some(BIRTH_DATE_IN_FUTURE));
  }

  #[test]
  fn form_round_trips_through_an_appointment() {
    let sub = valid_form().parse(today()).unwrap();
    let appt = Appointment { id: "7".into(), details: sub.details };
    let form = AppointmentForm::from_appointment(&appt);
    assert_eq!(form.id, Some("7".into()));
    assert_eq!(form.time, "10:15");
    let again = form.parse(today()).unwrap();
    assert_eq!(again.id, Some("7".into()));
    assert_eq!(again.details, appt.details);
  }
}
