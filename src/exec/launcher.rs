// src/exec/launcher.rs

use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::errors::{Result, SupervisorError};
use crate::exec::backend::{ChildHandle, TokioChild};
use crate::types::CommandLine;

/// Start the child process.
///
/// Standard streams are inherited unchanged. The executable is looked up on
/// `PATH` the way `execvp` would. A spawn failure is returned as
/// [`SupervisorError::LaunchError`] and nothing else is attempted.
pub fn launch(command: &CommandLine) -> Result<TokioChild> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| SupervisorError::LaunchError {
        program: command.program.clone(),
        source,
    })?;

    let child = TokioChild::new(child);
    info!(
        pid = child.pid(),
        program = %command.program,
        args = ?command.args,
        "launched child process"
    );

    Ok(child)
}
