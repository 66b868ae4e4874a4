//! Error taxonomy shared by every strategy.
//!
//! The facade turns each variant into its `Display` string, so the messages
//! here are the user-visible error contract.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("PID is not a number")]
    InvalidPid,
    #[error("Operating system is not supported")]
    UnsupportedPlatform,
    #[error("The {0} strategy is not available on this operating system")]
    StrategyUnavailable(&'static str),
    #[error("The helper source needs a helper executable (--helper)")]
    MissingHelper,
    #[error("No such process (PID {0})")]
    NoSuchProcess(i64),
    #[error("{0}")]
    Native(String),
    #[error("{message}")]
    Subprocess { program: String, message: String },
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not finish within {after:?}")]
    Timeout { program: String, after: Duration },
    #[error("Failed to parse process list: {0}")]
    Parse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ProcessError {
    fn from(err: csv::Error) -> Self {
        ProcessError::Parse(err.to_string())
    }
}

#[cfg(unix)]
impl From<nix::errno::Errno> for ProcessError {
    fn from(err: nix::errno::Errno) -> Self {
        ProcessError::Native(err.to_string())
    }
}
