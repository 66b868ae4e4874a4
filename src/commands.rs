//! Single entry point used by the CLI and the TUI.
//!
//! Every operation catches its failures and reports them in the `error` field
//! of the returned shape; nothing escapes as an `Err` or a panic.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{Config, KillMode};
use crate::error::ProcessError;
use crate::model::{KillResult, PidInput, ProcessListResult, RunningResult};
use crate::platform::Platform;
use crate::strategy::{SourceStrategy, TerminatorStrategy};

#[derive(Debug, Clone)]
pub struct ProcessManager {
    platform: Platform,
    source: SourceStrategy,
    terminator: TerminatorStrategy,
    kill_mode: KillMode,
    command_timeout: Duration,
}

impl ProcessManager {
    /// Resolves the strategies for `platform` from `config`.
    ///
    /// Fails only when the configuration names a strategy that does not exist
    /// on `platform`. An unsupported platform still yields a manager whose
    /// operations report `Operating system is not supported`.
    pub fn new(platform: Platform, config: &Config) -> Result<Self, ProcessError> {
        let source = SourceStrategy::resolve(platform, config)?;
        let terminator = TerminatorStrategy::resolve(platform, config)?;
        Ok(Self::with_strategies(platform, source, terminator, config))
    }

    pub fn with_strategies(
        platform: Platform,
        source: SourceStrategy,
        terminator: TerminatorStrategy,
        config: &Config,
    ) -> Self {
        Self {
            platform,
            source,
            terminator,
            kill_mode: config.kill_mode,
            command_timeout: config.command_timeout,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn kill_mode(&self) -> KillMode {
        self.kill_mode
    }

    pub async fn list_processes(&self) -> ProcessListResult {
        let result = self.source.fetch_processes().await;
        match &result {
            Ok(processes) => debug!(
                source = self.source.name(),
                count = processes.len(),
                "listed processes"
            ),
            Err(e) => warn!(source = self.source.name(), error = %e, "listing processes failed"),
        }
        result.into()
    }

    /// Requests termination with the configured [`KillMode`].
    pub async fn kill_process(&self, pid: impl Into<PidInput>) -> KillResult {
        self.kill_process_with(pid, self.kill_mode).await
    }

    pub async fn kill_process_with(&self, pid: impl Into<PidInput>, mode: KillMode) -> KillResult {
        let input = pid.into();
        let result = match input.parse() {
            Ok(pid) => {
                info!(pid, ?mode, "terminating process");
                self.terminator
                    .kill_process(pid, mode, self.command_timeout)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(?input, error = %e, "termination failed");
        }
        result.into()
    }

    pub async fn is_process_running(&self, pid: impl Into<PidInput>) -> RunningResult {
        let result = pid
            .into()
            .parse()
            .and_then(|pid| self.terminator.is_process_running(pid));
        result.into()
    }
}
