//! Cross-platform process listing and termination.
//!
//! [`ProcessManager`] is the single entry point. It picks a process source and
//! a terminator for the detected [`Platform`] and returns uniform
//! `{processes, error}` / `{result, error}` shapes on every operating system.

pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod export;
pub mod helper;
pub mod model;
pub mod platform;
pub mod strategy;
pub mod windows;

#[cfg(unix)]
pub mod unix;

pub use commands::ProcessManager;
pub use config::{Config, KillMode, SourceKind, TerminatorKind};
pub use error::ProcessError;
pub use model::{KillResult, PidInput, ProcessListResult, ProcessRecord, RunningResult};
pub use platform::Platform;
