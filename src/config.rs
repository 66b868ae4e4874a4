use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 64;
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Which process source strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    /// Best strategy for the current platform
    #[default]
    Auto,
    /// Toolhelp snapshot on Windows, sysctl on macOS
    Native,
    /// `tasklist` on Windows, `ps` elsewhere
    Command,
    /// Scan of the proc filesystem (Linux)
    Procfs,
    /// Bundled helper executable printing `pid,executable` rows
    Helper,
}

/// Which termination strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TerminatorKind {
    /// Signals on unix, TerminateProcess on Windows
    #[default]
    Auto,
    /// In-process signal or native call
    Signal,
    /// Shell out to `kill` / `taskkill`
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KillMode {
    /// SIGTERM on unix, WM_CLOSE on Windows
    #[default]
    Graceful,
    /// SIGKILL on unix, TerminateProcess / `taskkill /F` on Windows
    Force,
}

/// Runtime configuration of the process manager.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceKind,
    pub terminator: TerminatorKind,
    pub kill_mode: KillMode,
    pub command_timeout: Duration,
    pub max_concurrent_reads: usize,
    pub proc_root: PathBuf,
    pub helper_path: Option<PathBuf>,
    pub helper_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::Auto,
            terminator: TerminatorKind::Auto,
            kill_mode: KillMode::Graceful,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            helper_path: None,
            helper_args: Vec::new(),
        }
    }
}

/// Command line / environment view of [`Config`].
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Process source strategy
    #[arg(long, value_enum, env = "PID_SWEEP_SOURCE", default_value_t = SourceKind::Auto)]
    pub source: SourceKind,

    /// Termination strategy
    #[arg(long, value_enum, env = "PID_SWEEP_TERMINATOR", default_value_t = TerminatorKind::Auto)]
    pub terminator: TerminatorKind,

    /// Force kill (SIGKILL / TerminateProcess) instead of a graceful request
    #[arg(long, global = true, env = "PID_SWEEP_FORCE")]
    pub force: bool,

    /// Timeout in seconds for shelled-out commands
    #[arg(long, value_name = "SECS", env = "PID_SWEEP_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Maximum number of concurrent reads while scanning the proc filesystem
    #[arg(long, value_name = "N", env = "PID_SWEEP_MAX_READS", default_value_t = DEFAULT_MAX_CONCURRENT_READS)]
    pub max_reads: usize,

    /// Root of the proc filesystem
    #[arg(long, value_name = "PATH", env = "PID_SWEEP_PROC_ROOT", default_value = DEFAULT_PROC_ROOT)]
    pub proc_root: PathBuf,

    /// Helper executable used by the `helper` source
    #[arg(long, value_name = "PATH", env = "PID_SWEEP_HELPER")]
    pub helper: Option<PathBuf>,

    /// Argument passed to the helper executable, repeatable
    #[arg(long = "helper-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub helper_args: Vec<String>,
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Self {
            source: args.source,
            terminator: args.terminator,
            kill_mode: if args.force {
                KillMode::Force
            } else {
                KillMode::Graceful
            },
            command_timeout: Duration::from_secs(args.timeout.max(1)),
            max_concurrent_reads: args.max_reads.max(1),
            proc_root: args.proc_root,
            helper_path: args.helper,
            helper_args: args.helper_args,
        }
    }
}
