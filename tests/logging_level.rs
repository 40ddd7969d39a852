// tests/logging_level.rs

use timebox::cli::LogLevel;
use timebox::logging::resolve_level;
use tracing::Level;

#[test]
fn cli_flag_wins_over_environment() {
    assert_eq!(resolve_level(Some(LogLevel::Debug), Some("error"), Level::WARN), Level::DEBUG);
    assert_eq!(resolve_level(Some(LogLevel::Trace), None, Level::WARN), Level::TRACE);
}

#[test]
fn environment_is_used_without_a_flag() {
    assert_eq!(resolve_level(None, Some("info"), Level::WARN), Level::INFO);
    assert_eq!(resolve_level(None, Some(" DEBUG "), Level::WARN), Level::DEBUG);
}

#[test]
fn unknown_or_missing_environment_falls_back_to_default() {
    assert_eq!(resolve_level(None, Some("chatty"), Level::WARN), Level::WARN);
    assert_eq!(resolve_level(None, None, Level::ERROR), Level::ERROR);
}
