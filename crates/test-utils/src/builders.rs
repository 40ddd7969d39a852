#![allow(dead_code)]

use std::time::Duration;

use timebox::config::{StepConfig, SupervisorConfig};
use timebox::types::AbortSignal;

/// Builder for `SupervisorConfig`, starting from the built-in defaults.
pub struct SupervisorConfigBuilder {
    config: SupervisorConfig,
}

impl SupervisorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SupervisorConfig::default(),
        }
    }

    pub fn grace_iterations(mut self, n: u32) -> Self {
        self.config.grace_iterations = n;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn poll_interval_ms(self, ms: u64) -> Self {
        self.poll_interval(Duration::from_millis(ms))
    }

    pub fn abort_signal(mut self, signal: AbortSignal) -> Self {
        self.config.abort_signal = signal;
        self
    }

    pub fn build(self) -> SupervisorConfig {
        self.config
    }
}

impl Default for SupervisorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `StepConfig`.
pub struct StepConfigBuilder {
    step: StepConfig,
}

impl StepConfigBuilder {
    pub fn new(label: &str, cmd: &[&str]) -> Self {
        Self {
            step: StepConfig {
                label: label.to_string(),
                cmd: cmd.iter().map(|s| s.to_string()).collect(),
                mounted: None,
                unless: None,
            },
        }
    }

    pub fn mounted(mut self, path: &str) -> Self {
        self.step.mounted = Some(path.to_string());
        self
    }

    pub fn unless(mut self, cmd: &[&str]) -> Self {
        self.step.unless = Some(cmd.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn build(self) -> StepConfig {
        self.step
    }
}
