// src/steps/probe.rs

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// Facts gathered by "already satisfied" checks during one harness run.
///
/// Owned by the caller and passed into [`run_steps`](super::run_steps) by
/// `&mut`, so nothing leaks from one run into the next. The mount table is
/// read lazily, at most once per cache.
#[derive(Debug, Default)]
pub struct ProbeCache {
    mount_table: Option<String>,
}

impl ProbeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache with a known mount table instead of asking `mount(8)`.
    pub fn with_mount_table(table: impl Into<String>) -> Self {
        Self {
            mount_table: Some(table.into()),
        }
    }

    /// Current mount table, as printed by `mount` with no arguments.
    pub async fn mount_table(&mut self) -> Result<&str, String> {
        if self.mount_table.is_none() {
            let output = Command::new("mount")
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| format!("can't read mounts: {e}"))?;
            if !output.status.success() {
                return Err(format!("can't read mounts: `mount` exited with {}", output.status));
            }
            let table = String::from_utf8_lossy(&output.stdout).into_owned();
            debug!(lines = table.lines().count(), "read mount table");
            self.mount_table = Some(table);
        }
        Ok(self.mount_table.as_deref().unwrap_or_default())
    }

    /// Whether `path` is a mount point according to the mount table.
    pub async fn is_mounted(&mut self, path: &str) -> Result<bool, String> {
        let wanted = path.trim_end_matches('/');
        let wanted = if wanted.is_empty() { "/" } else { wanted };
        let table = self.mount_table().await?;
        Ok(mount_points(table).any(|point| point == wanted))
    }
}

/// Extract mount points from `mount` output.
///
/// Handles both the Linux layout (`dev on /path type nfs (opts)`) and the
/// BSD/macOS layout (`dev on /path (nfs, opts)`).
pub fn mount_points(table: &str) -> impl Iterator<Item = &str> {
    table.lines().filter_map(|line| {
        let (_, rest) = line.split_once(" on ")?;
        let end = [" type ", " ("]
            .iter()
            .filter_map(|sep| rest.find(sep))
            .min()
            .unwrap_or(rest.len());
        Some(rest[..end].trim())
    })
}
