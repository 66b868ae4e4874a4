//! Process source backed by a bundled helper executable.
//!
//! The helper prints one `pid,executable` row per process on stdout and
//! reports failures on stderr.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::ProcessError;
use crate::exec::run_command;
use crate::model::ProcessRecord;

#[derive(Debug, Clone)]
pub struct HelperSource {
    path: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl HelperSource {
    pub fn new(path: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            args,
            timeout,
        }
    }

    pub async fn fetch_processes(&self) -> Result<Vec<ProcessRecord>, ProcessError> {
        let program = self.path.to_string_lossy();
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let stdout = run_command(&program, &args, self.timeout).await?;
        Ok(parse_helper_output(&stdout))
    }
}

/// Parses newline separated `pid,executable` rows. Only the first comma
/// separates the fields; the executable name is kept exactly as printed.
pub fn parse_helper_output(output: &str) -> Vec<ProcessRecord> {
    let mut processes = Vec::new();
    for line in output.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some((pid, label)) = line.split_once(',') else {
            if !line.trim().is_empty() {
                debug!(line, "skipping helper row without a label");
            }
            continue;
        };

        let Ok(pid) = pid.trim().parse::<u32>() else {
            debug!(line, "skipping helper row without a numeric pid");
            continue;
        };

        processes.push(ProcessRecord::new(pid, label));
    }
    processes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn parses_helper_rows() {
        let output = "0,System Idle Process\n4,System\n1020,svchost.exe\n";

        assert_eq!(
            parse_helper_output(output),
            vec![
                ProcessRecord::new(0, "System Idle Process"),
                ProcessRecord::new(4, "System"),
                ProcessRecord::new(1020, "svchost.exe"),
            ]
        );
    }

    #[test]
    fn keeps_commas_in_executable_names() {
        let output = "77,weird,name.exe\r\n";
        assert_eq!(
            parse_helper_output(output),
            vec![ProcessRecord::new(77, "weird,name.exe")]
        );
    }

    #[test]
    fn labels_are_kept_verbatim() {
        let output = "5,My App, Helper.exe\n6,  padded  \n";
        assert_eq!(
            parse_helper_output(output),
            vec![
                ProcessRecord::new(5, "My App, Helper.exe"),
                ProcessRecord::new(6, "  padded  "),
            ]
        );
    }

    #[test]
    fn skips_garbage_rows() {
        let output = "\nnot-a-pid,foo\n12,\n";
        assert_eq!(parse_helper_output(output), vec![ProcessRecord::new(12, "")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_helper_program() {
        let helper = HelperSource::new(
            "sh",
            sh("echo '1,init'; echo '2,kthreadd'"),
            Duration::from_secs(5),
        );
        let processes = helper.fetch_processes().await.unwrap();

        assert_eq!(
            processes,
            vec![ProcessRecord::new(1, "init"), ProcessRecord::new(2, "kthreadd")]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn helper_stderr_becomes_the_error() {
        let err = HelperSource::new(
            "sh",
            sh("echo 'Error in get processes' >&2; exit 1"),
            Duration::from_secs(5),
        )
        .fetch_processes()
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Error in get processes");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn helper_stderr_wins_over_a_clean_exit() {
        let err = HelperSource::new(
            "sh",
            sh("echo '1,init'; echo 'Error in get processes' >&2"),
            Duration::from_secs(5),
        )
        .fetch_processes()
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Error in get processes");
    }
}
