// src/supervisor/runtime.rs

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::config::SupervisorConfig;
use crate::errors::{Result, SupervisorError};
use crate::exec::{ChildHandle, Interrupt};
use crate::types::AbortSignal;

use super::core::WatchdogCore;
use super::{CoreCommand, Outcome, SupervisorEvent};

/// Drives the [`WatchdogCore`] against a live child.
///
/// This is the IO shell: it owns the child handle, sleeps, reads the
/// interrupt channel and feeds what it observes back into the core. All
/// decisions about *what* to do next are made by the core.
pub struct Supervisor<C: ChildHandle> {
    core: WatchdogCore,
    child: C,
    poll_interval: Duration,
    /// End of the interval currently being waited out. Survives a failed
    /// poll so a retry does not restart the interval.
    interval_deadline: Option<Instant>,
    interrupts_open: bool,
}

impl<C: ChildHandle> fmt::Debug for Supervisor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("core", &self.core)
            .field("pid", &self.child.pid())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<C: ChildHandle> Supervisor<C> {
    pub fn new(config: &SupervisorConfig, child: C) -> Self {
        Self {
            core: WatchdogCore::new(config),
            child,
            poll_interval: config.poll_interval,
            interval_deadline: None,
            interrupts_open: true,
        }
    }

    /// Supervise the child until it has been reaped.
    ///
    /// Returns only once the child is gone, whichever of natural exit,
    /// grace-period expiry or interrupt came first. An error is returned
    /// only if the final blocking wait itself fails.
    pub async fn run(mut self, interrupts: &mut mpsc::Receiver<Interrupt>) -> Result<Outcome> {
        let pid = self.child.pid();
        info!(pid, poll_interval = ?self.poll_interval, "supervising child");

        let mut pending: VecDeque<CoreCommand> = VecDeque::new();
        pending.extend(self.core.step(SupervisorEvent::Started).commands);

        while let Some(command) = pending.pop_front() {
            debug!(pid, ?command, phase = ?self.core.phase(), "executing core command");

            let event = match command {
                CoreCommand::WaitInterval => self.wait_interval(interrupts).await,
                CoreCommand::PollNow => self.poll_now(),
                CoreCommand::SendAbort(signal) => self.send_abort(signal),
                CoreCommand::Reap => self.reap(interrupts).await?,
                // The core emits `Finish` together with `keep_running == false`,
                // which is handled below before it could be queued.
                CoreCommand::Finish(outcome) => return Ok(outcome),
            };

            let step = self.core.step(event);
            if !step.keep_running {
                if let Some(outcome) = self.core.outcome() {
                    info!(pid, ?outcome, "supervision finished");
                    return Ok(outcome);
                }
                break;
            }
            pending.extend(step.commands);
        }

        Err(SupervisorError::Other(anyhow!(
            "supervisor for pid {pid} stopped without an outcome"
        )))
    }

    /// One poll: wait until the current interval ends, returning early on
    /// child exit or interrupt. Child exit is checked first so a tie never
    /// escalates.
    async fn wait_interval(&mut self, interrupts: &mut mpsc::Receiver<Interrupt>) -> SupervisorEvent {
        let poll_interval = self.poll_interval;
        let deadline = *self
            .interval_deadline
            .get_or_insert_with(|| Instant::now() + poll_interval);

        // A wait that keeps failing is always ready and would starve the
        // timer in the biased select below.
        if Instant::now() >= deadline {
            self.interval_deadline = None;
            return SupervisorEvent::IntervalElapsed;
        }

        let sleep = sleep_until(deadline);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;

                res = self.child.wait() => {
                    return match res {
                        Ok(status) => SupervisorEvent::ChildExited(status),
                        Err(err) => {
                            warn!(pid = self.child.pid(), error = %err, "waiting for child failed");
                            SupervisorEvent::PollFailed
                        }
                    };
                }

                maybe = interrupts.recv(), if self.interrupts_open => {
                    match maybe {
                        Some(interrupt) => {
                            info!(pid = self.child.pid(), ?interrupt, "interrupted; aborting child");
                            return SupervisorEvent::InterruptReceived(interrupt);
                        }
                        None => {
                            debug!("interrupt channel closed; no longer listening");
                            self.interrupts_open = false;
                        }
                    }
                }

                () = &mut sleep => {
                    self.interval_deadline = None;
                    return SupervisorEvent::IntervalElapsed;
                }
            }
        }
    }

    fn poll_now(&mut self) -> SupervisorEvent {
        match self.child.try_status() {
            Ok(Some(status)) => SupervisorEvent::ChildExited(status),
            Ok(None) => SupervisorEvent::StillRunning,
            Err(err) => {
                warn!(pid = self.child.pid(), error = %err, "polling child status failed");
                SupervisorEvent::PollFailed
            }
        }
    }

    fn send_abort(&mut self, signal: AbortSignal) -> SupervisorEvent {
        let pid = self.child.pid();
        info!(pid, %signal, "killing process");
        match self.child.send_signal(signal) {
            Ok(()) => {
                info!(pid, "killed, waiting");
                SupervisorEvent::AbortDelivered
            }
            Err(err) => {
                warn!(pid, error = %err, "abort not delivered; waiting for child anyway");
                SupervisorEvent::AbortFailed
            }
        }
    }

    /// Block until the child is reaped. Interrupts arriving meanwhile are
    /// reported to the core, which lets the reap run to completion.
    async fn reap(&mut self, interrupts: &mut mpsc::Receiver<Interrupt>) -> Result<SupervisorEvent> {
        loop {
            tokio::select! {
                biased;

                res = self.child.wait() => {
                    let status = res?;
                    debug!(pid = self.child.pid(), %status, "child reaped");
                    return Ok(SupervisorEvent::Reaped(status));
                }

                maybe = interrupts.recv(), if self.interrupts_open => {
                    match maybe {
                        Some(interrupt) => {
                            if self.core.is_aborting() {
                                let err = SupervisorError::InterruptDuringAbort(self.child.pid());
                                warn!(?interrupt, error = %err, "ignoring repeated interrupt");
                            }
                            let step = self.core.step(SupervisorEvent::InterruptReceived(interrupt));
                            debug_assert!(step.commands.is_empty());
                        }
                        None => self.interrupts_open = false,
                    }
                }
            }
        }
    }
}
