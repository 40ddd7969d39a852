#![allow(dead_code)]

use std::time::Duration;

use tokio::time::Instant;

pub use timebox_test_utils::{init_tracing, with_timeout};

use timebox::types::CommandLine;

/// Build a `CommandLine` from string slices.
pub fn cmd(argv: &[&str]) -> CommandLine {
    CommandLine::try_from(argv.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .expect("test command line must be non-empty")
}

/// Assert that `start.elapsed()` is `expected`, give or take a few ms of
/// timer rounding.
pub fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    let slack = Duration::from_millis(5);
    assert!(
        elapsed + slack >= expected && elapsed <= expected + slack,
        "expected ~{expected:?} elapsed, got {elapsed:?}"
    );
}
