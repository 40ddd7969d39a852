// src/supervisor/mod.rs

//! Bounded-time supervision of a single child process.
//!
//! This module ties together:
//! - the Watchdog (poll the child for a fixed number of intervals, then
//!   escalate to the abort signal)
//! - the Signal Forwarder (an external interrupt aborts the child at once)
//! - the Exit Propagator (turn the final outcome into an exit code)
//!
//! The pure state machine lives in [`core`]; the async/IO shell that owns
//! the child handle and the clock is implemented in [`runtime`].

use crate::exec::Interrupt;
use crate::types::{AbortSignal, ChildStatus};

/// Lifecycle phase of the supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The child has been spawned; supervision has not started yet.
    Launched,
    /// Waiting out the grace period, one poll interval at a time.
    Polling,
    /// A poll observed the child exiting on its own.
    NaturallyExited,
    /// The grace period ran out and the abort signal was issued.
    ForciblyAborted,
    /// An external interrupt arrived and the abort signal was issued.
    Interrupted,
    /// The child has been reaped. Terminal.
    Reaped,
}

/// How supervision ended. Every variant carries the child's reaped status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The child exited before the grace period ran out.
    Finished(ChildStatus),
    /// The grace period ran out; the child was aborted and reaped.
    TimedOut(ChildStatus),
    /// The supervisor was interrupted; the child was aborted and reaped.
    Interrupted {
        interrupt: Interrupt,
        status: ChildStatus,
    },
}

/// Events flowing into the core from the runtime shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// The child is running; start the grace period.
    Started,
    /// A poll (bounded wait or status check) saw the child terminate.
    ChildExited(ChildStatus),
    /// A non-blocking status check found the child still running.
    StillRunning,
    /// One poll interval passed without the child exiting.
    IntervalElapsed,
    /// Reading the child's status failed.
    PollFailed,
    /// The supervisor received an external interrupt.
    InterruptReceived(Interrupt),
    /// The abort signal reached the child.
    AbortDelivered,
    /// The abort signal could not be delivered.
    AbortFailed,
    /// The blocking wait after an abort returned.
    Reaped(ChildStatus),
}

/// Command produced by the core, to be executed by the runtime shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Wait one poll interval, returning early if the child exits or an
    /// interrupt arrives.
    WaitInterval,
    /// Check the child's status without blocking.
    PollNow,
    /// Deliver the abort signal.
    SendAbort(AbortSignal),
    /// Block until the child is reaped.
    Reap,
    /// Supervision is over.
    Finish(Outcome),
}

pub mod core;
pub mod exit;
pub mod runtime;

pub use self::core::{CoreStep, WatchdogCore};
pub use exit::report;
pub use runtime::Supervisor;
