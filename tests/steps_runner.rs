// tests/steps_runner.rs

#![cfg(unix)]

mod common;
use crate::common::{cmd, init_tracing};

use std::error::Error;
use std::io::Write;

use clap::Parser;
use tempfile::NamedTempFile;

use timebox::cli::StepsArgs;
use timebox::run_setup_steps;
use timebox::steps::probe::mount_points;
use timebox::steps::{CommandStep, ProbeCache, SetupAction, StepStatus, run_steps, steps_from_config};
use timebox_test_utils::builders::StepConfigBuilder;

type TestResult = Result<(), Box<dyn Error>>;

const LINUX_MOUNTS: &str = "\
proc on /proc type proc (rw,nosuid,nodev,noexec,relatime)
192.168.64.1:/home/me/code/freebsd on /usr/src type nfs4 (rw,relatime)
/dev/sda1 on / type ext4 (rw,relatime)
";

const BSD_MOUNTS: &str = "\
/dev/ada0p2 on / (ufs, local, soft-updates)
192.168.64.1:/code/freebsd_hfs on /sharedcode (nfs)
";

#[test]
fn mount_points_are_extracted_from_linux_and_bsd_tables() {
    let linux: Vec<_> = mount_points(LINUX_MOUNTS).collect();
    assert_eq!(linux, vec!["/proc", "/usr/src", "/"]);

    let bsd: Vec<_> = mount_points(BSD_MOUNTS).collect();
    assert_eq!(bsd, vec!["/", "/sharedcode"]);
}

#[tokio::test]
async fn is_mounted_matches_whole_mount_points_only() -> TestResult {
    let mut probes = ProbeCache::with_mount_table(LINUX_MOUNTS);

    assert!(probes.is_mounted("/usr/src").await?);
    assert!(probes.is_mounted("/usr/src/").await?);
    assert!(!probes.is_mounted("/usr").await?);
    assert!(!probes.is_mounted("/sharedcode").await?);
    Ok(())
}

#[tokio::test]
async fn steps_report_done_skipped_and_failed() -> TestResult {
    init_tracing();

    let steps: Vec<Box<dyn SetupAction>> = vec![
        Box::new(CommandStep::new("Succeeds", cmd(&["true"]))),
        // Would fail if run; the mount check must short-circuit it.
        Box::new(CommandStep::new("Mount src", cmd(&["false"])).skip_if_mounted("/usr/src")),
        Box::new(CommandStep::new("Fails", cmd(&["sh", "-c", "echo boom >&2; exit 4"]))),
    ];
    let mut probes = ProbeCache::with_mount_table(LINUX_MOUNTS);

    let reports = run_steps(&steps, &mut probes).await;

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].status, StepStatus::Done);
    assert_eq!(reports[0].index, 1);
    assert_eq!(reports[0].total, 3);

    assert_eq!(
        reports[1].status,
        StepStatus::Skipped("/usr/src already mounted.".to_string())
    );
    assert!(reports[1].succeeded());

    match &reports[2].status {
        StepStatus::Failed(msg) => {
            assert!(msg.starts_with("Fails failed"), "{msg}");
            assert!(msg.contains("boom"), "{msg}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!reports[2].succeeded());
    Ok(())
}

#[tokio::test]
async fn unless_check_skips_the_action() -> TestResult {
    init_tracing();

    let steps: Vec<Box<dyn SetupAction>> = vec![
        Box::new(CommandStep::new("Already done", cmd(&["false"])).unless(cmd(&["true"]))),
        Box::new(CommandStep::new("Needed", cmd(&["true"])).unless(cmd(&["false"]))),
    ];
    let mut probes = ProbeCache::with_mount_table("");

    let reports = run_steps(&steps, &mut probes).await;

    assert!(matches!(reports[0].status, StepStatus::Skipped(_)));
    assert_eq!(reports[1].status, StepStatus::Done);
    Ok(())
}

#[tokio::test]
async fn missing_step_binary_is_reported_not_raised() -> TestResult {
    init_tracing();

    let steps: Vec<Box<dyn SetupAction>> = vec![Box::new(CommandStep::new(
        "Attach disk",
        cmd(&["definitely-not-a-real-binary-xyz"]),
    ))];
    let mut probes = ProbeCache::with_mount_table("");

    let reports = run_steps(&steps, &mut probes).await;

    match &reports[0].status {
        StepStatus::Failed(msg) => assert!(msg.contains("could not start"), "{msg}"),
        other => panic!("expected failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn probe_caches_are_not_shared_between_runs() -> TestResult {
    init_tracing();

    let configs = vec![
        StepConfigBuilder::new("Mount share", &["false"])
            .mounted("/sharedcode")
            .build(),
    ];
    let steps = steps_from_config(&configs)?;

    let mut bsd = ProbeCache::with_mount_table(BSD_MOUNTS);
    let first = run_steps(&steps, &mut bsd).await;
    assert!(matches!(first[0].status, StepStatus::Skipped(_)));

    let mut linux = ProbeCache::with_mount_table(LINUX_MOUNTS);
    let second = run_steps(&steps, &mut linux).await;
    assert!(matches!(second[0].status, StepStatus::Failed(_)));
    Ok(())
}

#[tokio::test]
async fn steps_binary_entry_point_reports_failures_in_exit_code() -> TestResult {
    init_tracing();

    let mut ok = NamedTempFile::new()?;
    write!(ok, "[[step]]\nlabel = \"ok\"\ncmd = [\"true\"]\n")?;
    let ok_path = ok.path().to_string_lossy().into_owned();
    let args = StepsArgs::try_parse_from(["timebox-steps", "--config", ok_path.as_str()])?;
    assert_eq!(run_setup_steps(args).await?, 0);

    let mut bad = NamedTempFile::new()?;
    write!(
        bad,
        "[[step]]\nlabel = \"ok\"\ncmd = [\"true\"]\n\n[[step]]\nlabel = \"bad\"\ncmd = [\"false\"]\n"
    )?;
    let bad_path = bad.path().to_string_lossy().into_owned();
    let args = StepsArgs::try_parse_from(["timebox-steps", "--config", bad_path.as_str()])?;
    assert_eq!(run_setup_steps(args).await?, 1);
    Ok(())
}
