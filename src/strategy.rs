//! Per-platform strategy selection and dispatch.
//!
//! Strategies are resolved once from the detected [`Platform`] and the
//! [`Config`] and then injected into [`crate::ProcessManager`].

use std::time::Duration;

use tracing::debug;

use crate::config::{Config, KillMode, SourceKind, TerminatorKind};
use crate::error::ProcessError;
use crate::helper::HelperSource;
use crate::model::ProcessRecord;
use crate::platform::Platform;
use crate::windows::tasklist;

#[cfg(unix)]
use crate::unix::{ps, signal};

#[cfg(target_os = "linux")]
use crate::unix::ProcFsSource;

#[cfg(target_os = "macos")]
use crate::unix::macos;

#[cfg(target_os = "windows")]
use crate::windows::native;

/// Where a process snapshot comes from.
#[derive(Debug, Clone)]
pub enum SourceStrategy {
    /// Toolhelp32 snapshot.
    #[cfg(target_os = "windows")]
    Toolhelp,
    /// `sysctl(KERN_PROC_ALL)`.
    #[cfg(target_os = "macos")]
    Sysctl,
    #[cfg(target_os = "linux")]
    ProcFs(ProcFsSource),
    #[cfg(unix)]
    Ps { timeout: Duration },
    Tasklist { timeout: Duration },
    Helper(HelperSource),
    Unsupported,
}

impl SourceStrategy {
    pub fn resolve(platform: Platform, config: &Config) -> Result<Self, ProcessError> {
        if !platform.is_supported() {
            return Ok(SourceStrategy::Unsupported);
        }

        let timeout = config.command_timeout;
        let strategy = match (config.source, platform) {
            (SourceKind::Helper, _) => match &config.helper_path {
                Some(path) => SourceStrategy::Helper(HelperSource::new(
                    path,
                    config.helper_args.clone(),
                    timeout,
                )),
                None => return Err(ProcessError::MissingHelper),
            },
            #[cfg(target_os = "windows")]
            (SourceKind::Auto | SourceKind::Native, Platform::Windows) => SourceStrategy::Toolhelp,
            (SourceKind::Command, Platform::Windows) => SourceStrategy::Tasklist { timeout },
            #[cfg(target_os = "macos")]
            (SourceKind::Auto | SourceKind::Native, Platform::MacOs) => SourceStrategy::Sysctl,
            #[cfg(unix)]
            (SourceKind::Command, Platform::MacOs | Platform::Linux) => {
                SourceStrategy::Ps { timeout }
            }
            // The proc filesystem is the kernel's own interface on Linux.
            #[cfg(target_os = "linux")]
            (SourceKind::Auto | SourceKind::Native | SourceKind::Procfs, Platform::Linux) => {
                SourceStrategy::ProcFs(ProcFsSource::new(
                    &config.proc_root,
                    config.max_concurrent_reads,
                ))
            }
            (kind, _) => return Err(ProcessError::StrategyUnavailable(source_name(kind))),
        };

        debug!(%platform, strategy = strategy.name(), "resolved process source");
        Ok(strategy)
    }

    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(target_os = "windows")]
            SourceStrategy::Toolhelp => "toolhelp",
            #[cfg(target_os = "macos")]
            SourceStrategy::Sysctl => "sysctl",
            #[cfg(target_os = "linux")]
            SourceStrategy::ProcFs(_) => "procfs",
            #[cfg(unix)]
            SourceStrategy::Ps { .. } => "ps",
            SourceStrategy::Tasklist { .. } => "tasklist",
            SourceStrategy::Helper(_) => "helper",
            SourceStrategy::Unsupported => "unsupported",
        }
    }

    pub async fn fetch_processes(&self) -> Result<Vec<ProcessRecord>, ProcessError> {
        match self {
            #[cfg(target_os = "windows")]
            SourceStrategy::Toolhelp => native::fetch_processes().await,
            #[cfg(target_os = "macos")]
            SourceStrategy::Sysctl => macos::fetch_processes().await,
            #[cfg(target_os = "linux")]
            SourceStrategy::ProcFs(source) => source.fetch_processes().await,
            #[cfg(unix)]
            SourceStrategy::Ps { timeout } => ps::fetch_processes(*timeout).await,
            SourceStrategy::Tasklist { timeout } => tasklist::fetch_processes(*timeout).await,
            SourceStrategy::Helper(helper) => helper.fetch_processes().await,
            SourceStrategy::Unsupported => Err(ProcessError::UnsupportedPlatform),
        }
    }
}

fn source_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Auto => "auto",
        SourceKind::Native => "native",
        SourceKind::Command => "command",
        SourceKind::Procfs => "procfs",
        SourceKind::Helper => "helper",
    }
}

/// How a termination request is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminatorStrategy {
    /// `kill(2)` from this process.
    #[cfg(unix)]
    Signal,
    /// `TerminateProcess`, or `WM_CLOSE` for a graceful request.
    #[cfg(target_os = "windows")]
    Native,
    /// The `kill` command.
    #[cfg(unix)]
    KillCommand,
    /// The `taskkill` command.
    Taskkill,
    Unsupported,
}

impl TerminatorStrategy {
    pub fn resolve(platform: Platform, config: &Config) -> Result<Self, ProcessError> {
        let strategy = match (config.terminator, platform) {
            (_, Platform::Unsupported) => TerminatorStrategy::Unsupported,
            #[cfg(unix)]
            (TerminatorKind::Auto | TerminatorKind::Signal, Platform::MacOs | Platform::Linux) => {
                TerminatorStrategy::Signal
            }
            #[cfg(unix)]
            (TerminatorKind::Command, Platform::MacOs | Platform::Linux) => {
                TerminatorStrategy::KillCommand
            }
            #[cfg(target_os = "windows")]
            (TerminatorKind::Auto | TerminatorKind::Signal, Platform::Windows) => {
                TerminatorStrategy::Native
            }
            (TerminatorKind::Command, Platform::Windows) => TerminatorStrategy::Taskkill,
            (kind, _) => {
                return Err(ProcessError::StrategyUnavailable(terminator_name(kind)));
            }
        };

        debug!(%platform, ?strategy, "resolved process terminator");
        Ok(strategy)
    }

    pub async fn kill_process(
        &self,
        pid: i64,
        mode: KillMode,
        timeout: Duration,
    ) -> Result<String, ProcessError> {
        match self {
            #[cfg(unix)]
            TerminatorStrategy::Signal => signal::kill_process(pid, mode),
            #[cfg(target_os = "windows")]
            TerminatorStrategy::Native => native::kill_process(pid, mode).await,
            #[cfg(unix)]
            TerminatorStrategy::KillCommand => {
                signal::kill_process_command(pid, mode, timeout).await
            }
            TerminatorStrategy::Taskkill => {
                tasklist::kill_process_command(pid, mode, timeout).await
            }
            TerminatorStrategy::Unsupported => Err(ProcessError::UnsupportedPlatform),
        }
    }

    /// Liveness check. Always answered in-process, whichever way kills are
    /// delivered.
    pub fn is_process_running(&self, pid: i64) -> Result<bool, ProcessError> {
        match self {
            TerminatorStrategy::Unsupported => Err(ProcessError::UnsupportedPlatform),
            #[cfg(unix)]
            _ => signal::is_process_running(pid),
            #[cfg(target_os = "windows")]
            _ => native::is_process_running(pid),
            #[cfg(not(any(unix, target_os = "windows")))]
            _ => Err(ProcessError::UnsupportedPlatform),
        }
    }
}

fn terminator_name(kind: TerminatorKind) -> &'static str {
    match kind {
        TerminatorKind::Auto => "auto",
        TerminatorKind::Signal => "signal",
        TerminatorKind::Command => "command",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_platform_resolves_to_stubs() {
        let config = Config::default();

        let source = SourceStrategy::resolve(Platform::Unsupported, &config).unwrap();
        let terminator = TerminatorStrategy::resolve(Platform::Unsupported, &config).unwrap();

        assert!(matches!(source, SourceStrategy::Unsupported));
        assert_eq!(terminator, TerminatorStrategy::Unsupported);
    }

    #[test]
    fn helper_requires_a_path() {
        let config = Config {
            source: SourceKind::Helper,
            ..Config::default()
        };

        let err = SourceStrategy::resolve(Platform::Linux, &config).unwrap_err();
        assert!(matches!(err, ProcessError::MissingHelper));

        let config = Config {
            helper_path: Some("/opt/ps-helper".into()),
            ..config
        };
        let source = SourceStrategy::resolve(Platform::MacOs, &config).unwrap();
        assert_eq!(source.name(), "helper");
    }

    #[test]
    fn procfs_is_linux_only() {
        let config = Config {
            source: SourceKind::Procfs,
            ..Config::default()
        };

        let err = SourceStrategy::resolve(Platform::Windows, &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The procfs strategy is not available on this operating system"
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_defaults() {
        let config = Config::default();

        let source = SourceStrategy::resolve(Platform::Linux, &config).unwrap();
        assert_eq!(source.name(), "procfs");

        let command = Config {
            source: SourceKind::Command,
            terminator: TerminatorKind::Command,
            ..Config::default()
        };
        let source = SourceStrategy::resolve(Platform::Linux, &command).unwrap();
        assert_eq!(source.name(), "ps");

        assert_eq!(
            TerminatorStrategy::resolve(Platform::Linux, &config).unwrap(),
            TerminatorStrategy::Signal
        );
        assert_eq!(
            TerminatorStrategy::resolve(Platform::Linux, &command).unwrap(),
            TerminatorStrategy::KillCommand
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn helper_receives_configured_arguments() {
        let config = Config {
            source: SourceKind::Helper,
            helper_path: Some("sh".into()),
            helper_args: vec!["-c".into(), "echo '3,cron -f'".into()],
            ..Config::default()
        };

        let source = SourceStrategy::resolve(Platform::Linux, &config).unwrap();
        let processes = source.fetch_processes().await.unwrap();

        assert_eq!(processes, vec![ProcessRecord::new(3, "cron -f")]);
    }

    #[tokio::test]
    async fn unsupported_strategies_refuse_every_call() {
        let err = SourceStrategy::Unsupported.fetch_processes().await.unwrap_err();
        assert!(matches!(err, ProcessError::UnsupportedPlatform));

        let err = TerminatorStrategy::Unsupported
            .kill_process(1, KillMode::Graceful, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::UnsupportedPlatform));

        assert!(TerminatorStrategy::Unsupported.is_process_running(1).is_err());
    }
}
