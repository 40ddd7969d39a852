// src/supervisor/core.rs

//! Pure Watchdog + Signal Forwarder state machine.
//!
//! `WatchdogCore` consumes [`SupervisorEvent`]s and produces
//! [`CoreCommand`]s. It has no Tokio types, performs no IO and never looks
//! at a clock, so every race outcome can be unit tested by feeding events
//! in a chosen order.
//!
//! ```text
//! Launched -> Polling -> { NaturallyExited | ForciblyAborted | Interrupted } -> Reaped
//! ```
//!
//! Every path ends with a `Reap` command before `Finish`; for a natural exit
//! the reap returns at once because the poll already collected the status.
//!
//! Invariants upheld here:
//! - the abort signal is requested at most once;
//! - `Finish` is emitted exactly once, and nothing follows it;
//! - a natural exit observed at the final poll wins over escalation.

use tracing::{debug, warn};

use crate::config::SupervisorConfig;
use crate::exec::Interrupt;
use crate::types::AbortSignal;

use super::{CoreCommand, Outcome, Phase, SupervisorEvent};

/// Consecutive status-read failures tolerated before escalating to the
/// abort signal. Any successful poll resets the count.
const MAX_POLL_RETRIES: u32 = 1;

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the shell should keep driving the core.
    pub keep_running: bool,
}

impl CoreStep {
    fn run(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn idle() -> Self {
        Self::run(Vec::new())
    }

    fn finish(outcome: Outcome) -> Self {
        Self {
            commands: vec![CoreCommand::Finish(outcome)],
            keep_running: false,
        }
    }
}

#[derive(Debug)]
pub struct WatchdogCore {
    grace_iterations: u32,
    abort_signal: AbortSignal,
    phase: Phase,
    polls_completed: u32,
    poll_failures: u32,
    aborts_requested: u32,
    interrupt: Option<Interrupt>,
    outcome: Option<Outcome>,
}

impl WatchdogCore {
    pub fn new(config: &SupervisorConfig) -> Self {
        Self {
            grace_iterations: config.grace_iterations,
            abort_signal: config.abort_signal,
            phase: Phase::Launched,
            polls_completed: 0,
            poll_failures: 0,
            aborts_requested: 0,
            interrupt: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Poll intervals that have fully elapsed.
    pub fn polls_completed(&self) -> u32 {
        self.polls_completed
    }

    pub fn aborts_requested(&self) -> u32 {
        self.aborts_requested
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// True while an abort has been issued and the reap is outstanding.
    pub fn is_aborting(&self) -> bool {
        matches!(self.phase, Phase::ForciblyAborted | Phase::Interrupted)
    }

    /// Handle a single event, updating state and returning the commands the
    /// shell should run next.
    pub fn step(&mut self, event: SupervisorEvent) -> CoreStep {
        match self.phase {
            Phase::Launched => self.on_launched(event),
            Phase::Polling => self.on_polling(event),
            Phase::NaturallyExited | Phase::ForciblyAborted | Phase::Interrupted => {
                self.on_reaping(event)
            }
            Phase::Reaped => {
                debug!(?event, "event after terminal state ignored");
                CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                }
            }
        }
    }

    fn on_launched(&mut self, event: SupervisorEvent) -> CoreStep {
        match event {
            SupervisorEvent::Started => {
                self.phase = Phase::Polling;
                self.next_poll()
            }
            // Anything else means the shell skipped `Started`; treat the
            // child as being polled already.
            other => {
                self.phase = Phase::Polling;
                self.on_polling(other)
            }
        }
    }

    fn on_polling(&mut self, event: SupervisorEvent) -> CoreStep {
        match event {
            SupervisorEvent::Started => self.next_poll(),
            SupervisorEvent::ChildExited(status) => {
                debug!(%status, polls = self.polls_completed, "child exited on its own");
                self.poll_failures = 0;
                self.phase = Phase::NaturallyExited;
                // The poll that saw the exit already collected the status, so
                // this reap returns immediately.
                CoreStep::run(vec![CoreCommand::Reap])
            }
            SupervisorEvent::IntervalElapsed => {
                self.polls_completed += 1;
                self.poll_failures = 0;
                debug!(
                    polls = self.polls_completed,
                    grace_iterations = self.grace_iterations,
                    "poll interval elapsed; child still running"
                );
                self.next_poll()
            }
            SupervisorEvent::StillRunning => {
                self.poll_failures = 0;
                if self.grace_exhausted() {
                    self.escalate(Phase::ForciblyAborted)
                } else {
                    CoreStep::run(vec![CoreCommand::WaitInterval])
                }
            }
            SupervisorEvent::PollFailed => {
                self.poll_failures += 1;
                if self.poll_failures > MAX_POLL_RETRIES {
                    warn!(
                        failures = self.poll_failures,
                        "child status unreadable twice in a row; escalating to abort"
                    );
                    self.escalate(Phase::ForciblyAborted)
                } else {
                    CoreStep::run(vec![CoreCommand::PollNow])
                }
            }
            SupervisorEvent::InterruptReceived(interrupt) => {
                self.interrupt = Some(interrupt);
                self.escalate(Phase::Interrupted)
            }
            // No abort has been sent yet; these cannot belong to this child.
            SupervisorEvent::AbortDelivered
            | SupervisorEvent::AbortFailed
            | SupervisorEvent::Reaped(_) => {
                debug!(?event, "unexpected event while polling ignored");
                CoreStep::idle()
            }
        }
    }

    fn on_reaping(&mut self, event: SupervisorEvent) -> CoreStep {
        match event {
            SupervisorEvent::Reaped(status) | SupervisorEvent::ChildExited(status) => {
                let outcome = match (self.phase, self.interrupt) {
                    (Phase::NaturallyExited, _) => Outcome::Finished(status),
                    (Phase::Interrupted, Some(interrupt)) => {
                        Outcome::Interrupted { interrupt, status }
                    }
                    _ => Outcome::TimedOut(status),
                };
                self.phase = Phase::Reaped;
                self.outcome = Some(outcome);
                CoreStep::finish(outcome)
            }
            SupervisorEvent::InterruptReceived(interrupt) => {
                debug!(?interrupt, phase = ?self.phase, "interrupt while reaping; reap continues");
                CoreStep::idle()
            }
            // The reap is already queued; a failed delivery does not change
            // it since the child may be exiting anyway.
            _ => CoreStep::idle(),
        }
    }

    fn grace_exhausted(&self) -> bool {
        self.polls_completed >= self.grace_iterations
    }

    /// Wait another interval, or run the final tie-breaking status check
    /// once the grace period is used up.
    fn next_poll(&mut self) -> CoreStep {
        if self.grace_exhausted() {
            CoreStep::run(vec![CoreCommand::PollNow])
        } else {
            CoreStep::run(vec![CoreCommand::WaitInterval])
        }
    }

    fn escalate(&mut self, phase: Phase) -> CoreStep {
        self.phase = phase;
        if self.aborts_requested > 0 {
            return CoreStep::run(vec![CoreCommand::Reap]);
        }
        self.aborts_requested += 1;
        CoreStep::run(vec![
            CoreCommand::SendAbort(self.abort_signal),
            CoreCommand::Reap,
        ])
    }
}
