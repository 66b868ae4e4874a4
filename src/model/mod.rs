pub mod common;

pub use common::{
    KillResult, OpResult, PidInput, ProcessListResult, ProcessRecord, RunningResult,
};
