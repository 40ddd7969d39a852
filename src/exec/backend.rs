// src/exec/backend.rs

//! Child process abstraction.
//!
//! The supervisor runtime talks to a `ChildHandle` instead of a raw
//! `tokio::process::Child`, so tests can script exits, failed polls and
//! failed signal delivery without real processes.

use std::future::Future;
use std::pin::Pin;

use tokio::process::Child;
use tracing::debug;

use crate::errors::{Result, SupervisorError};
use crate::types::{AbortSignal, ChildStatus};

/// The operations the supervisor needs on its one child.
pub trait ChildHandle: Send {
    /// Process id assigned at launch. Stays the same after the child is reaped.
    fn pid(&self) -> u32;

    /// Non-blocking status check. `Ok(None)` means still running.
    fn try_status(&mut self) -> Result<Option<ChildStatus>>;

    /// Block until the child has terminated and been reaped.
    ///
    /// Must be cancel-safe: the runtime races it against timers and
    /// interrupts and may drop the future before it completes.
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ChildStatus>> + Send + '_>>;

    /// Deliver `signal` to the child.
    fn send_signal(&mut self, signal: AbortSignal) -> Result<()>;
}

/// Real child process backed by `tokio::process::Child`.
#[derive(Debug)]
pub struct TokioChild {
    child: Child,
    pid: u32,
}

impl TokioChild {
    pub fn new(child: Child) -> Self {
        // `id()` is only `None` once the child has been polled to completion,
        // which cannot have happened yet for a freshly spawned process.
        let pid = child.id().unwrap_or_default();
        Self { child, pid }
    }
}

impl ChildHandle for TokioChild {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn try_status(&mut self) -> Result<Option<ChildStatus>> {
        self.child
            .try_wait()
            .map(|status| status.map(ChildStatus::from))
            .map_err(SupervisorError::PollError)
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ChildStatus>> + Send + '_>> {
        Box::pin(async move {
            let status = self.child.wait().await.map_err(SupervisorError::PollError)?;
            Ok(ChildStatus::from(status))
        })
    }

    fn send_signal(&mut self, signal: AbortSignal) -> Result<()> {
        // Once reaped the pid may already belong to another process.
        if self.child.id().is_none() {
            return Err(SupervisorError::AbortDeliveryError {
                pid: self.pid,
                signal,
                reason: "child already reaped".to_string(),
            });
        }

        debug!(pid = self.pid, %signal, "delivering signal to child");
        deliver(self.pid, signal, &mut self.child)
    }
}

#[cfg(unix)]
fn deliver(pid: u32, signal: AbortSignal, _child: &mut Child) -> Result<()> {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| SupervisorError::AbortDeliveryError {
        pid,
        signal,
        reason: "pid out of range".to_string(),
    })?;

    kill(Pid::from_raw(raw), signal.as_nix()).map_err(|errno| SupervisorError::AbortDeliveryError {
        pid,
        signal,
        reason: errno.desc().to_string(),
    })
}

#[cfg(not(unix))]
fn deliver(pid: u32, signal: AbortSignal, child: &mut Child) -> Result<()> {
    // Without POSIX signals the only available escalation is a hard kill.
    child
        .start_kill()
        .map_err(|e| SupervisorError::AbortDeliveryError {
            pid,
            signal,
            reason: e.to_string(),
        })
}
