//! Runtime settings: an optional TOML file overlaid by `CITA_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cita_core::store::STORAGE_KEY;
use serde::Deserialize;

/// Where and under which key the appointment list is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite file holding the storage area. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:  PathBuf,
  /// Storage key the list is written under.
  #[serde(default = "default_storage_key")]
  pub storage_key: String,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/cita/citas.sqlite3") }

fn default_storage_key() -> String { STORAGE_KEY.to_owned() }

impl Settings {
  /// Read `config_path` if it exists, then apply `CITA_STORE_PATH` /
  /// `CITA_STORAGE_KEY` from the environment.
  pub fn load(config_path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(config_path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("CITA"))
      .build()
      .with_context(|| format!("failed to read config file {}", config_path.display()))?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let s = Settings::load(Path::new("/nonexistent/cita.toml")).unwrap();
    assert_eq!(s.storage_key, "citas");
    assert!(s.store_path.ends_with("cita/citas.sqlite3"));
  }

  #[test]
  fn file_values_are_used() {
    let dir = std::env::temp_dir().join(format!("cita-settings-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cita.toml");
    std::fs::write(&path, "store_path = \"/tmp/agenda.sqlite3\"\nstorage_key = \"agenda\"\n")
      .unwrap();

    let s = Settings::load(&path).unwrap();
    assert_eq!(s.store_path, PathBuf::from("/tmp/agenda.sqlite3"));
    assert_eq!(s.storage_key, "agenda");

    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn absolute_paths_are_not_expanded() {
    assert_eq!(expand_tilde(Path::new("/var/cita.db")), PathBuf::from("/var/cita.db"));
  }
}
