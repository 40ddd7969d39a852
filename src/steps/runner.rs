// src/steps/runner.rs

use tracing::info;

use super::action::SetupAction;
use super::probe::ProbeCache;

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    /// Already satisfied; the action was not invoked.
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// 1-based position in the step list.
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub status: StepStatus,
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        !matches!(self.status, StepStatus::Failed(_))
    }
}

/// Run every step in order, printing `[i/n]` progress lines to stdout.
///
/// A failing step does not stop the sequence. The returned reports are in
/// step order; `probes` is only read and filled, never reset.
pub async fn run_steps(steps: &[Box<dyn SetupAction>], probes: &mut ProbeCache) -> Vec<StepReport> {
    let total = steps.len();
    let mut reports = Vec::with_capacity(total);

    for (idx, step) in steps.iter().enumerate() {
        let index = idx + 1;
        println!("[{index}/{total}] {} ...", step.label());

        let status = match step.already_satisfied(probes).await {
            Some(message) => StepStatus::Skipped(message),
            None => {
                let result = step.run().await;
                if result.success {
                    StepStatus::Done
                } else {
                    StepStatus::Failed(result.message)
                }
            }
        };

        match &status {
            StepStatus::Done => println!("[{index}/{total}] Done!"),
            StepStatus::Skipped(msg) | StepStatus::Failed(msg) => {
                println!("[{index}/{total}] {msg}")
            }
        }
        info!(step = %step.label(), index, total, ?status, "setup step finished");

        reports.push(StepReport {
            index,
            total,
            label: step.label().to_string(),
            status,
        });
    }

    reports
}
