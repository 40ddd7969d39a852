// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::io;

use thiserror::Error;

use crate::types::{AbortSignal, CANNOT_EXECUTE_EXIT_CODE, NOT_FOUND_EXIT_CODE};

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The child could not be started. Fatal: no wait or abort is attempted.
    #[error("failed to launch '{program}': {source}")]
    LaunchError {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Reading the child's status failed. Retried once, then escalated.
    #[error("failed to read child status: {0}")]
    PollError(#[source] io::Error),

    /// The abort signal could not be delivered. Non-fatal: the supervisor
    /// still performs the blocking wait.
    #[error("failed to deliver {signal} to pid {pid}: {reason}")]
    AbortDeliveryError {
        pid: u32,
        signal: AbortSignal,
        reason: String,
    },

    /// Another interrupt arrived while an abort was already in flight.
    #[error("interrupted again while aborting pid {0}; continuing to wait")]
    InterruptDuringAbort(u32),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SupervisorError {
    /// Exit code used when this error ends the supervisor.
    ///
    /// Launch failures follow the shell convention (127 for a missing
    /// executable, 126 for anything else that prevents execution).
    pub fn exit_code(&self) -> i32 {
        match self {
            SupervisorError::LaunchError { source, .. }
                if source.kind() == io::ErrorKind::NotFound =>
            {
                NOT_FOUND_EXIT_CODE
            }
            SupervisorError::LaunchError { .. } => CANNOT_EXECUTE_EXIT_CODE,
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SupervisorError>;
