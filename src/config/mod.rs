// src/config/mod.rs

//! Configuration loading and validation for timebox.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate raw values into typed settings (`validate.rs`).
//! - Parse human-friendly durations like `"500ms"` (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{DEFAULT_CONFIG_FILE, default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, RawConfigFile, RawSupervisorSection, StepConfig, SupervisorConfig,
};
