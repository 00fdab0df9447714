use std::path::{Path, PathBuf};

use anyhow::Context as _;
use gather_core::profile::MediaSettings;
use serde::Deserialize;

/// Settings read from the TOML file and `GATHER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default = "default_static_url")]
  pub static_url: String,
  #[serde(default = "default_media_url")]
  pub media_url:  String,
  /// Usernames granted superuser rights.
  #[serde(default)]
  pub superusers: Vec<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from("gather.db") }

fn default_static_url() -> String { MediaSettings::default().static_url }

fn default_media_url() -> String { MediaSettings::default().media_url }

impl CliConfig {
  /// Layer the optional config file under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("GATHER")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("superusers"),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")
  }

  pub fn media(&self) -> MediaSettings {
    MediaSettings {
      static_url: self.static_url.clone(),
      media_url:  self.media_url.clone(),
    }
  }

  pub fn is_superuser(&self, username: &str) -> bool {
    self.superusers.iter().any(|u| u == username)
  }

  /// `store_path` with a leading `~` expanded to the home directory.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
