// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Read by `timebox-steps` when `--config` is not given, relative to the
/// working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Timebox.toml";

/// Parse a config file without checking it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading config file");

    let raw: RawConfigFile = toml::from_str(&fs::read_to_string(path)?)?;
    Ok(raw)
}

/// Parse and validate. `[supervisor]` keys that are left out keep their
/// built-in values; every `[[step]]` needs a label and a command.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::try_from(load_from_path(path)?)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
