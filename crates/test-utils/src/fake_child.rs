use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use timebox::errors::{Result, SupervisorError};
use timebox::exec::ChildHandle;
use timebox::types::{AbortSignal, ChildStatus};

/// What the supervisor did to a `FakeChild`, shared with the test.
#[derive(Debug, Default)]
pub struct FakeChildLog {
    /// Every signal the supervisor tried to send, delivered or not.
    pub signals: Vec<AbortSignal>,
    /// Number of `try_status` calls.
    pub status_checks: usize,
    /// Number of `wait` calls that returned a scripted error.
    pub wait_failures: usize,
    /// Set once a `wait()` call has returned a status.
    pub reaped: bool,
}

/// A scripted child process driven by Tokio's clock.
///
/// Designed for `#[tokio::test(start_paused = true)]`: the child "exits"
/// at a fixed instant, or never, and dies `death_delay` after it receives a
/// signal.
pub struct FakeChild {
    pid: u32,
    exit_at: Option<Instant>,
    exit_code: i32,
    death_delay: Duration,
    killed_at: Option<(Instant, AbortSignal)>,
    failing_status_checks: usize,
    failing_waits: usize,
    wait_failure_at: Option<Instant>,
    fail_delivery: bool,
    log: Arc<Mutex<FakeChildLog>>,
}

impl FakeChild {
    /// A child that exits with `code` after `after`.
    pub fn exits_after(after: Duration, code: i32) -> Self {
        Self::build(Some(Instant::now() + after), code)
    }

    /// A child that only ends when signalled.
    pub fn runs_forever() -> Self {
        Self::build(None, 0)
    }

    fn build(exit_at: Option<Instant>, exit_code: i32) -> Self {
        Self {
            pid: 4242,
            exit_at,
            exit_code,
            death_delay: Duration::ZERO,
            killed_at: None,
            failing_status_checks: 0,
            failing_waits: 0,
            wait_failure_at: None,
            fail_delivery: false,
            log: Arc::new(Mutex::new(FakeChildLog::default())),
        }
    }

    /// Take this long to die after a signal is delivered.
    pub fn with_death_delay(mut self, delay: Duration) -> Self {
        self.death_delay = delay;
        self
    }

    /// Make the first `n` calls to `try_status` fail.
    pub fn with_failing_status_checks(mut self, n: usize) -> Self {
        self.failing_status_checks = n;
        self
    }

    /// Make `n` calls to `wait` fail, the first of them once `after` has
    /// passed. Later failing calls error out immediately. A child that has
    /// already ended reports its status instead.
    pub fn with_failing_waits(mut self, after: Duration, n: usize) -> Self {
        self.failing_waits = n;
        self.wait_failure_at = Some(Instant::now() + after);
        self
    }

    /// Make every signal delivery fail.
    pub fn with_failing_delivery(mut self) -> Self {
        self.fail_delivery = true;
        self
    }

    /// Shared log of what the supervisor did.
    pub fn log(&self) -> Arc<Mutex<FakeChildLog>> {
        Arc::clone(&self.log)
    }

    /// When and how the child ends, given what has happened so far.
    fn end(&self) -> Option<(Instant, ChildStatus)> {
        let natural = self
            .exit_at
            .map(|at| (at, ChildStatus::exited(self.exit_code)));
        let killed = self
            .killed_at
            .map(|(at, sig)| (at + self.death_delay, ChildStatus::signaled(sig.number())));

        match (natural, killed) {
            (Some(n), Some(k)) => Some(if n.0 <= k.0 { n } else { k }),
            (n, k) => n.or(k),
        }
    }
}

impl ChildHandle for FakeChild {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn try_status(&mut self) -> Result<Option<ChildStatus>> {
        self.log.lock().unwrap().status_checks += 1;

        if self.failing_status_checks > 0 {
            self.failing_status_checks -= 1;
            return Err(SupervisorError::PollError(io::Error::other("scripted poll failure")));
        }

        Ok(self
            .end()
            .filter(|(at, _)| Instant::now() >= *at)
            .map(|(_, status)| status))
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ChildStatus>> + Send + '_>> {
        Box::pin(async move {
            if self.failing_waits > 0 {
                let fail_at = self.wait_failure_at.unwrap_or_else(Instant::now);
                if self.end().is_none_or(|(at, _)| fail_at < at) {
                    tokio::time::sleep_until(fail_at).await;
                    self.failing_waits -= 1;
                    self.log.lock().unwrap().wait_failures += 1;
                    return Err(SupervisorError::PollError(io::Error::other(
                        "scripted wait failure",
                    )));
                }
            }

            match self.end() {
                Some((at, status)) => {
                    tokio::time::sleep_until(at).await;
                    self.log.lock().unwrap().reaped = true;
                    Ok(status)
                }
                None => std::future::pending().await,
            }
        })
    }

    fn send_signal(&mut self, signal: AbortSignal) -> Result<()> {
        self.log.lock().unwrap().signals.push(signal);

        if self.fail_delivery {
            return Err(SupervisorError::AbortDeliveryError {
                pid: self.pid,
                signal,
                reason: "scripted delivery failure".to_string(),
            });
        }

        if self.killed_at.is_none() {
            self.killed_at = Some((Instant::now(), signal));
        }
        Ok(())
    }
}
