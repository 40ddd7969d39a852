// src/supervisor/exit.rs

//! Exit Propagator: map an [`Outcome`] to the supervisor's own exit code and
//! a one-line status report.

use crate::types::INTERRUPTED_EXIT_CODE;

use super::Outcome;

impl Outcome {
    /// Exit code the supervisor process should terminate with.
    ///
    /// - natural exit or timeout: the child's own code, or `128 + signo`
    ///   when the child died from a signal;
    /// - interrupted: always [`INTERRUPTED_EXIT_CODE`], whatever the child
    ///   reported.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Finished(status) | Outcome::TimedOut(status) => status.exit_code(),
            Outcome::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
        }
    }

    /// Human-readable status line.
    pub fn status_line(&self, pid: u32) -> String {
        match self {
            Outcome::Finished(status) => format!("child {pid} finished ({status})"),
            Outcome::TimedOut(status) => {
                format!("child {pid} aborted after timeout ({status})")
            }
            Outcome::Interrupted { interrupt, status } => {
                format!("interrupted ({interrupt:?}); child {pid} aborted ({status})")
            }
        }
    }
}

/// Print the status line to stderr, leaving stdout to the child.
pub fn report(outcome: &Outcome, pid: u32) {
    eprintln!("timebox: {}", outcome.status_line(pid));
}
