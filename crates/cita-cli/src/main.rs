//! `cita` — command-line front end for the Cita appointment book.
//!
//! # Usage
//!
//! ```
//! cita list
//! cita add --date 2030-05-02 --time 09:30 --first-name Ana --last-name Ruiz \
//!          --national-id 12345678Z --phone 600111222 --birth-date 1990-01-01
//! cita edit <ID> --time 10:00
//! cita delete <ID>
//! ```

mod app;
mod settings;
mod ui;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use app::{App, Notice};
use chrono::Local;
use cita_core::{
  AppointmentId, AppointmentStore,
  storage::KeyValueStorage,
  validate::{AppointmentForm, CLOSING_TIME, Field, OPENING_TIME},
};
use cita_store_sqlite::SqliteStorage;
use clap::{Args, Parser, Subcommand};
use settings::{Settings, expand_tilde};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cita", version, about = "Book, edit and cancel appointments")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "cita.toml")]
  config: PathBuf,

  /// SQLite file to keep appointments in; overrides the config file.
  #[arg(long, value_name = "FILE", env = "CITA_STORE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the appointment table.
  List,
  /// Print a single appointment.
  Show { id: String },
  /// Book a new appointment.
  Add(FieldArgs),
  /// Change an existing appointment; omitted fields keep their values.
  Edit {
    id:     String,
    #[command(flatten)]
    fields: FieldArgs,
  },
  /// Cancel an appointment.
  Delete { id: String },
}

/// Form fields as command-line flags.
#[derive(Args, Debug)]
struct FieldArgs {
  /// Appointment date (YYYY-MM-DD); today or later.
  #[arg(long)]
  date:        Option<String>,
  /// Appointment time (HH:MM), between opening and closing time.
  #[arg(long)]
  time:        Option<String>,
  #[arg(long)]
  first_name:  Option<String>,
  #[arg(long)]
  last_name:   Option<String>,
  /// 8 digits followed by an uppercase letter.
  #[arg(long)]
  national_id: Option<String>,
  /// 9 digits.
  #[arg(long)]
  phone:       Option<String>,
  /// Date of birth (YYYY-MM-DD).
  #[arg(long)]
  birth_date:  Option<String>,
  #[arg(long)]
  notes:       Option<String>,
}

impl FieldArgs {
  /// Overwrite the form fields that were given on the command line.
  fn apply_to(self, form: &mut AppointmentForm) {
    let pairs = [
      (self.date, &mut form.date),
      (self.time, &mut form.time),
      (self.first_name, &mut form.first_name),
      (self.last_name, &mut form.last_name),
      (self.national_id, &mut form.national_id),
      (self.phone, &mut form.phone),
      (self.birth_date, &mut form.birth_date),
      (self.notes, &mut form.notes),
    ];
    for (value, slot) in pairs {
      if let Some(value) = value {
        *slot = value;
      }
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)?;
  if let Some(path) = &cli.store {
    settings.store_path = expand_tilde(path);
  }

  let storage = SqliteStorage::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let store = AppointmentStore::with_key(storage, settings.storage_key.clone());
  let mut app = App::new(store, Local::now().date_naive());

  run(&mut app, cli.command).await
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn run<S: KeyValueStorage>(app: &mut App<S>, command: Command) -> anyhow::Result<ExitCode> {
  match command {
    Command::List => {
      print_table(app).await?;
      Ok(ExitCode::SUCCESS)
    }
    Command::Show { id } => {
      let id = AppointmentId::from(id);
      match app.appointment(&id).await? {
        Some(appt) => {
          print!("{}", ui::table::render_detail(&appt));
          Ok(ExitCode::SUCCESS)
        }
        None => Ok(report(&Notice::NotFound(id))),
      }
    }
    Command::Add(fields) => {
      fields.apply_to(&mut app.form);
      submit(app).await
    }
    Command::Edit { id, fields } => {
      let id = AppointmentId::from(id);
      if !app.begin_edit(&id).await? {
        return Ok(report(&Notice::NotFound(id)));
      }
      fields.apply_to(&mut app.form);
      submit(app).await
    }
    Command::Delete { id } => {
      let notice = app.delete(&AppointmentId::from(id)).await?;
      let code = report(&notice);
      if notice.is_success() {
        print_table(app).await?;
      }
      Ok(code)
    }
  }
}

async fn submit<S: KeyValueStorage>(app: &mut App<S>) -> anyhow::Result<ExitCode> {
  let label = app.mode().submit_label();
  tracing::debug!(mode = label, "submitting form");

  let notice = app
    .submit()
    .await
    .context("the appointment could not be saved")?;

  if !app.errors.is_empty() {
    eprint!("{}", app.errors);
    if app.errors.get(Field::Time).is_some() {
      let (oh, om) = OPENING_TIME;
      let (ch, cm) = CLOSING_TIME;
      eprintln!("  (appointments run from {oh:02}:{om:02} to {ch:02}:{cm:02})");
    }
  }

  let code = report(&notice);
  if notice.is_success() {
    print_table(app).await?;
  }
  Ok(code)
}

async fn print_table<S: KeyValueStorage>(app: &App<S>) -> anyhow::Result<()> {
  let rows = app.appointments().await?;
  print!("{}", ui::table::render(&rows));
  Ok(())
}

/// Print a notice on the right stream and map it to an exit status.
fn report(notice: &Notice) -> ExitCode {
  if notice.is_success() {
    println!("{notice}");
    ExitCode::SUCCESS
  } else {
    eprintln!("{notice}");
    ExitCode::FAILURE
  }
}
