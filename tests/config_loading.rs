// tests/config_loading.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tempfile::NamedTempFile;

use timebox::cli::CliArgs;
use timebox::config::{SupervisorConfig, load_and_validate, parse_duration};
use timebox::errors::SupervisorError;
use timebox::resolve_config;
use timebox::types::AbortSignal;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn empty_file_yields_reference_policy() -> TestResult {
    init_tracing();
    let file = write_config("");

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.supervisor, SupervisorConfig::default());
    assert_eq!(cfg.supervisor.grace_iterations, 3);
    assert_eq!(cfg.supervisor.poll_interval, Duration::from_secs(1));
    assert_eq!(cfg.supervisor.abort_signal, AbortSignal::Abrt);
    assert_eq!(cfg.supervisor.grace_period(), Duration::from_secs(3));
    assert!(cfg.steps.is_empty());
    Ok(())
}

#[test]
fn supervisor_section_overrides_defaults() -> TestResult {
    init_tracing();
    let file = write_config(
        r#"
[supervisor]
grace_iterations = 5
poll_interval = "250ms"
abort_signal = "sigterm"
"#,
    );

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.supervisor.grace_iterations, 5);
    assert_eq!(cfg.supervisor.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.supervisor.abort_signal, AbortSignal::Term);
    assert_eq!(cfg.supervisor.grace_period(), Duration::from_millis(1250));
    Ok(())
}

#[test]
fn steps_are_parsed_in_order() -> TestResult {
    init_tracing();
    let file = write_config(
        r#"
[[step]]
label = "Mounting kernel source"
cmd = ["mount", "-t", "nfs", "host:/code/freebsd", "/usr/src"]
mounted = "/usr/src"

[[step]]
label = "Loading md device"
cmd = ["mdconfig", "-a", "-t", "vnode", "-f", "/disk.dmg", "-u", "10"]
unless = ["test", "-e", "/dev/md10"]
"#,
    );

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.steps.len(), 2);
    assert_eq!(cfg.steps[0].label, "Mounting kernel source");
    assert_eq!(cfg.steps[0].mounted.as_deref(), Some("/usr/src"));
    assert!(cfg.steps[0].unless.is_none());
    assert_eq!(cfg.steps[1].cmd[0], "mdconfig");
    assert_eq!(
        cfg.steps[1].unless,
        Some(vec!["test".to_string(), "-e".to_string(), "/dev/md10".to_string()])
    );
    Ok(())
}

#[test]
fn zero_grace_iterations_is_rejected() {
    let file = write_config("[supervisor]\ngrace_iterations = 0\n");

    match load_and_validate(file.path()) {
        Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("grace_iterations")),
        Err(e) => panic!("Expected ConfigError, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn bad_poll_interval_is_rejected() {
    for bad in ["\"1\"", "\"fast\"", "\"0s\"", "\"10 parsecs\""] {
        let file = write_config(&format!("[supervisor]\npoll_interval = {bad}\n"));

        match load_and_validate(file.path()) {
            Err(SupervisorError::ConfigError(msg)) => {
                assert!(msg.contains("poll_interval"), "{bad}: {msg}")
            }
            Err(e) => panic!("{bad}: expected ConfigError, got: {e:?}"),
            Ok(_) => panic!("{bad}: expected error, got Ok"),
        }
    }
}

#[test]
fn unknown_abort_signal_is_a_parse_error() {
    let file = write_config("[supervisor]\nabort_signal = \"SIGFOO\"\n");

    match load_and_validate(file.path()) {
        Err(SupervisorError::TomlError(e)) => assert!(e.to_string().contains("invalid abort signal")),
        Err(e) => panic!("Expected TomlError, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn step_without_command_is_rejected() {
    let file = write_config("[[step]]\nlabel = \"Nothing\"\ncmd = []\n");

    match load_and_validate(file.path()) {
        Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("Nothing")),
        Err(e) => panic!("Expected ConfigError, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate(Path::new("/definitely/not/here/Timebox.toml"));
    assert!(matches!(result, Err(SupervisorError::IoError(_))));
}

#[test]
fn duration_strings() {
    assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
    assert_eq!(parse_duration(" 2s "), Ok(Duration::from_secs(2)));
    assert_eq!(parse_duration("3m"), Ok(Duration::from_secs(180)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("5").is_err());
    assert!(parse_duration("s").is_err());
    assert!(parse_duration("5d").is_err());

    // Overflowing values are reported, never wrapped.
    let err = parse_duration("6000000000000000h").unwrap_err();
    assert!(err.contains("too large"), "unexpected error: {err}");
    assert!(parse_duration("18446744073709551615m").is_err());
    assert_eq!(
        parse_duration("18446744073709551615s"),
        Ok(Duration::from_secs(u64::MAX))
    );
}

#[test]
fn abort_signal_spellings() {
    assert_eq!("ABRT".parse::<AbortSignal>(), Ok(AbortSignal::Abrt));
    assert_eq!("sigkill".parse::<AbortSignal>(), Ok(AbortSignal::Kill));
    assert_eq!(" SIGTERM ".parse::<AbortSignal>(), Ok(AbortSignal::Term));
    assert!("SIGSEGV".parse::<AbortSignal>().is_err());

    for sig in AbortSignal::ALL {
        assert_eq!(sig.name().parse::<AbortSignal>(), Ok(sig));
    }
    assert_eq!(AbortSignal::Abrt.number(), 6);
    assert_eq!(AbortSignal::Kill.number(), 9);
    assert_eq!(AbortSignal::Term.number(), 15);
    assert_eq!(AbortSignal::Hup.name(), "SIGHUP");
    assert_eq!(AbortSignal::default(), AbortSignal::Abrt);
}

#[test]
fn cli_flags_override_config_file() -> TestResult {
    let file = write_config("[supervisor]\ngrace_iterations = 5\npoll_interval = \"2s\"\n");
    let path = file.path().to_string_lossy().into_owned();

    let args = CliArgs::try_parse_from([
        "timebox",
        "--config",
        path.as_str(),
        "--poll-interval",
        "250ms",
        "sleep",
        "10",
    ])?;
    let cfg = resolve_config(&args)?;

    assert_eq!(cfg.grace_iterations, 5);
    assert_eq!(cfg.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.abort_signal, AbortSignal::Abrt);
    assert_eq!(args.command, vec!["sleep".to_string(), "10".to_string()]);
    Ok(())
}

#[test]
fn cli_without_flags_uses_reference_policy() -> TestResult {
    let args = CliArgs::try_parse_from(["timebox", "ls", "-la", "--color"])?;

    assert_eq!(resolve_config(&args)?, SupervisorConfig::default());
    assert_eq!(args.command, vec!["ls", "-la", "--color"]);
    Ok(())
}

#[test]
fn cli_rejects_zero_poll_interval_and_missing_command() {
    let args = CliArgs::try_parse_from(["timebox", "--poll-interval", "0ms", "true"]).unwrap();
    assert!(matches!(resolve_config(&args), Err(SupervisorError::ConfigError(_))));

    assert!(CliArgs::try_parse_from(["timebox"]).is_err());
    assert!(CliArgs::try_parse_from(["timebox", "--abort-signal", "NOPE", "true"]).is_err());
    assert!(
        CliArgs::try_parse_from(["timebox", "--poll-interval", "6000000000000000h", "true"]).is_err()
    );
}

#[cfg(unix)]
#[test]
fn abort_signal_numbers_match_the_platform() {
    for sig in AbortSignal::ALL {
        let platform: nix::sys::signal::Signal = sig.name().parse().unwrap();
        assert_eq!(platform as i32, sig.number(), "{sig}");
    }
}
