//! Appointment table — one numbered row per appointment.

use cita_core::Appointment;

const HEADERS: [&str; 10] = [
  "#",
  "date",
  "time",
  "first name",
  "last name",
  "national ID",
  "phone",
  "birth date",
  "notes",
  "id",
];

/// Shown as the only row when there is nothing to list.
pub const EMPTY_ROW: &str = "no appointments";

fn cells(index: usize, appt: &Appointment) -> [String; 10] {
  let d = &appt.details;
  [
    (index + 1).to_string(),
    d.date.format("%Y-%m-%d").to_string(),
    d.time.format("%H:%M").to_string(),
    d.first_name.clone(),
    d.last_name.clone(),
    d.national_id.clone(),
    d.phone.clone(),
    d.birth_date.format("%Y-%m-%d").to_string(),
    d.notes.replace('\n', " "),
    appt.id.to_string(),
  ]
}

/// Render `list` as an aligned text table, header included.
pub fn render(list: &[Appointment]) -> String {
  let rows: Vec<[String; 10]> = list.iter().enumerate().map(|(i, a)| cells(i, a)).collect();

  let mut widths = HEADERS.map(|h| h.chars().count());
  for row in &rows {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  push_line(&mut out, HEADERS.iter().copied(), &widths);
  let total = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);
  out.push_str(&"-".repeat(total));
  out.push('\n');

  if rows.is_empty() {
    out.push_str(EMPTY_ROW);
    out.push('\n');
    return out;
  }

  for row in &rows {
    push_line(&mut out, row.iter().map(String::as_str), &widths);
  }
  out
}

/// Render one appointment as `label: value` lines, in form order.
pub fn render_detail(appt: &Appointment) -> String {
  let [_, date, time, first, last, national_id, phone, birth, notes, id] = cells(0, appt);
  let pairs = [
    ("id", id),
    ("date", date),
    ("time", time),
    ("first name", first),
    ("last name", last),
    ("national ID", national_id),
    ("phone", phone),
    ("birth date", birth),
    ("notes", notes),
  ];
  let width = pairs.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
  pairs
    .iter()
    .map(|(label, value)| format!("{label:<width$}  {value}\n"))
    .collect()
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
  let line = cells
    .zip(widths)
    .map(|(cell, w)| {
      let pad = w.saturating_sub(cell.chars().count());
      format!("{cell}{}", " ".repeat(pad))
    })
    .collect::<Vec<_>>()
    .join(" | ");
  out.push_str(line.trim_end());
  out.push('\n');
}
