//! `tasklist` / `taskkill` based strategies.

use std::time::Duration;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::config::KillMode;
use crate::error::ProcessError;
use crate::exec::run_command;
use crate::model::ProcessRecord;

/// Column holding the executable name in `tasklist /FO CSV` output.
const IMAGE_NAME_COLUMN: usize = 0;
/// Column holding the PID in `tasklist /FO CSV` output.
const PID_COLUMN: usize = 1;

pub async fn fetch_processes(timeout: Duration) -> Result<Vec<ProcessRecord>, ProcessError> {
    let stdout = run_command("tasklist", &["/FO", "CSV"], timeout).await?;
    parse_tasklist_output(&stdout)
}

/// Parses `tasklist /FO CSV` output. The header row is dropped, and quoting
/// and padding are handled the way `tasklist` emits them.
pub fn parse_tasklist_output(output: &str) -> Result<Vec<ProcessRecord>, ProcessError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(output.as_bytes());

    let mut processes = Vec::new();
    for row in reader.records() {
        let row = row?;

        let (Some(label), Some(pid_field)) = (row.get(IMAGE_NAME_COLUMN), row.get(PID_COLUMN))
        else {
            debug!(?row, "skipping short tasklist row");
            continue;
        };

        let pid: u32 = match pid_field.parse() {
            Ok(pid) => pid,
            Err(_) => {
                debug!(?row, "skipping tasklist row without a numeric pid");
                continue;
            }
        };

        processes.push(ProcessRecord {
            pid,
            label: label.to_string(),
        });
    }

    Ok(processes)
}

/// Runs `taskkill` and returns its trimmed stdout, e.g.
/// `SUCCESS: The process with PID 2696 has been terminated.`
pub async fn kill_process_command(
    pid: i64,
    mode: KillMode,
    timeout: Duration,
) -> Result<String, ProcessError> {
    let pid = pid.to_string();
    let mut args = vec!["/PID", pid.as_str()];
    if mode == KillMode::Force {
        args.push("/F");
    }

    let stdout = run_command("taskkill", &args, timeout).await?;
    Ok(stdout.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASKLIST: &str = "\"Image Name\",\"PID\",\"Session Name\",\"Session#\",\"Mem Usage\"\r
\"System Idle Process\",\"0\",\"Services\",\"0\",\"8 K\"\r
\"System\",\"4\",\"Services\",\"0\",\"1,236 K\"\r
\"svchost.exe\",\"1020\",\"Services\",\"0\",\"22,340 K\"\r
\"Code - Insiders.exe\",\"13372\",\"Console\",\"1\",\"112,004 K\"\r
";

    #[test]
    fn parses_tasklist_csv() {
        let processes = parse_tasklist_output(TASKLIST).unwrap();

        assert_eq!(
            processes,
            vec![
                ProcessRecord::new(0, "System Idle Process"),
                ProcessRecord::new(4, "System"),
                ProcessRecord::new(1020, "svchost.exe"),
                ProcessRecord::new(13372, "Code - Insiders.exe"),
            ]
        );
    }

    #[test]
    fn tolerates_padding_and_bad_rows() {
        let output = "\"Image Name\",\"PID\"\n\"notepad.exe  \",\" 3124 \"\n\"broken.exe\",\"n/a\"\n\"short\"\n";

        let processes = parse_tasklist_output(output).unwrap();
        assert_eq!(processes, vec![ProcessRecord::new(3124, "notepad.exe")]);
    }

    #[test]
    fn header_only_yields_empty_list() {
        let output = "\"Image Name\",\"PID\",\"Session Name\",\"Session#\",\"Mem Usage\"\r\n";
        assert!(parse_tasklist_output(output).unwrap().is_empty());
    }
}
