// src/steps/mod.rs

//! Sequential setup-step harness.
//!
//! Runs a named, ordered list of setup actions (mount a share, attach a disk
//! image, ...) and prints per-step status. Every action reports back an
//! explicit [`StepResult`]; nothing here panics or propagates errors for an
//! expected failure such as a missing binary or an already-mounted path.
//!
//! - [`action`] defines the `SetupAction` trait and the command-backed
//!   implementation built from `[[step]]` config entries.
//! - [`probe`] holds the caller-owned `ProbeCache` used by "already
//!   satisfied" checks.
//! - [`runner`] sequences the steps and produces `StepReport`s.

pub mod action;
pub mod probe;
pub mod runner;

pub use action::{CommandStep, SetupAction, steps_from_config};
pub use probe::ProbeCache;
pub use runner::{StepReport, StepStatus, run_steps};

/// Result of running one setup action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub success: bool,
    pub message: String,
}

impl StepResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
