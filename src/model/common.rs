use serde::ser::{Serialize, SerializeTuple, Serializer};

use crate::error::ProcessError;

/// A single entry of a process snapshot.
///
/// The label is whatever the source strategy reports (executable name, path or
/// command line) and is not normalized across strategies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessRecord {
    pub pid: u32,
    pub label: String,
}

impl ProcessRecord {
    pub fn new(pid: u32, label: impl Into<String>) -> Self {
        Self {
            pid,
            label: label.into(),
        }
    }

    pub fn ref_array(&self) -> Vec<String> {
        vec![self.pid.to_string(), self.label.clone()]
    }
}

// Serialized as `[pid, label]`.
impl Serialize for ProcessRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.pid)?;
        tuple.serialize_element(&self.label)?;
        tuple.end()
    }
}

/// Result of a process enumeration. Exactly one of the two fields is set.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct ProcessListResult {
    pub processes: Option<Vec<ProcessRecord>>,
    pub error: Option<String>,
}

impl From<Result<Vec<ProcessRecord>, ProcessError>> for ProcessListResult {
    fn from(result: Result<Vec<ProcessRecord>, ProcessError>) -> Self {
        match result {
            Ok(processes) => Self {
                processes: Some(processes),
                error: None,
            },
            Err(e) => Self {
                processes: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// `{ result, error }` response shared by the kill and liveness operations.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct OpResult<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> From<Result<T, ProcessError>> for OpResult<T> {
    fn from(result: Result<T, ProcessError>) -> Self {
        match result {
            Ok(value) => Self {
                result: Some(value),
                error: None,
            },
            Err(e) => Self {
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Strategy dependent success token of a termination request.
pub type KillResult = OpResult<String>;

pub type RunningResult = OpResult<bool>;

/// Kill target exactly as the caller handed it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PidInput {
    Int(i64),
    Text(String),
    Missing,
}

impl PidInput {
    /// Validates the input as a well-formed integer.
    pub fn parse(&self) -> Result<i64, ProcessError> {
        match self {
            PidInput::Int(pid) => Ok(*pid),
            PidInput::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| ProcessError::InvalidPid),
            PidInput::Missing => Err(ProcessError::InvalidPid),
        }
    }
}

impl From<i64> for PidInput {
    fn from(pid: i64) -> Self {
        PidInput::Int(pid)
    }
}

impl From<i32> for PidInput {
    fn from(pid: i32) -> Self {
        PidInput::Int(pid.into())
    }
}

impl From<u32> for PidInput {
    fn from(pid: u32) -> Self {
        PidInput::Int(pid.into())
    }
}

impl From<&str> for PidInput {
    fn from(text: &str) -> Self {
        PidInput::Text(text.to_string())
    }
}

impl From<String> for PidInput {
    fn from(text: String) -> Self {
        PidInput::Text(text)
    }
}

impl<T: Into<PidInput>> From<Option<T>> for PidInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(PidInput::Missing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_result_serializes_records_as_pairs() {
        let result = ProcessListResult::from(Ok(vec![
            ProcessRecord::new(0, "System Idle Process"),
            ProcessRecord::new(4, "System"),
        ]));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "processes": [[0, "System Idle Process"], [4, "System"]],
                "error": null,
            })
        );
    }

    #[test]
    fn failed_list_keeps_both_fields() {
        let result = ProcessListResult::from(Err(ProcessError::UnsupportedPlatform));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "processes": null,
                "error": "Operating system is not supported",
            })
        );
        assert!(result.processes.is_none());
    }

    #[test]
    fn kill_result_shape() {
        let ok = KillResult::from(Ok(String::new()));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "result": "", "error": null })
        );

        let err = KillResult::from(Err(ProcessError::InvalidPid));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({ "result": null, "error": "PID is not a number" })
        );
    }

    #[test]
    fn pid_input_validation() {
        assert_eq!(PidInput::from("5321").parse().unwrap(), 5321);
        assert_eq!(PidInput::from(" 42\n").parse().unwrap(), 42);
        assert_eq!(PidInput::from("-5").parse().unwrap(), -5);
        assert_eq!(PidInput::from(0i64).parse().unwrap(), 0);
        assert_eq!(PidInput::from(Some(7u32)).parse().unwrap(), 7);

        for bad in ["five", "", "  ", "12abc", "1.5", "0x10"] {
            assert!(
                matches!(PidInput::from(bad).parse(), Err(ProcessError::InvalidPid)),
                "{bad:?} should be rejected"
            );
        }
        assert!(matches!(
            PidInput::from(None::<&str>).parse(),
            Err(ProcessError::InvalidPid)
        ));
    }
}
