use std::time::Duration;

use tracing::debug;

use crate::error::ProcessError;
use crate::exec::run_command;
use crate::model::ProcessRecord;

pub async fn fetch_processes(timeout: Duration) -> Result<Vec<ProcessRecord>, ProcessError> {
    let stdout = run_command("ps", &["-A", "-o", "pid,comm"], timeout).await?;
    Ok(parse_ps_output(&stdout))
}

/// Parses `ps -o pid,comm` output.
///
/// The first line is the column header. Every other line is a PID followed by
/// the command, which may itself contain spaces and is joined back together.
pub fn parse_ps_output(output: &str) -> Vec<ProcessRecord> {
    let mut processes = Vec::new();

    for line in output.lines().skip(1) {
        let mut parts = line.split_whitespace();

        let Some(pid_field) = parts.next() else {
            continue;
        };

        let pid: u32 = match pid_field.parse() {
            Ok(pid) => pid,
            Err(_) => {
                debug!(line, "skipping ps row without a numeric pid");
                continue;
            }
        };

        let label = parts.collect::<Vec<_>>().join(" ");
        processes.push(ProcessRecord { pid, label });
    }

    processes
}

#[cfg(test)]
mod tests {
    use super::*;

    const MACOS_PS: &str = "  PID COMM
    1 /sbin/launchd
   97 /usr/libexec/logd
  412 /Applications/Google Chrome.app/Contents/MacOS/Google Chrome
";

    const LINUX_PS: &str = "    PID COMMAND
      1 systemd
      2 kthreadd
   1843 Web Content
";

    #[test]
    fn parses_macos_output() {
        let processes = parse_ps_output(MACOS_PS);

        assert_eq!(
            processes,
            vec![
                ProcessRecord::new(1, "/sbin/launchd"),
                ProcessRecord::new(97, "/usr/libexec/logd"),
                ProcessRecord::new(
                    412,
                    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"
                ),
            ]
        );
    }

    #[test]
    fn parses_linux_output() {
        let processes = parse_ps_output(LINUX_PS);

        assert_eq!(processes.len(), 3);
        assert_eq!(processes[2], ProcessRecord::new(1843, "Web Content"));
    }

    #[test]
    fn skips_blank_and_malformed_rows() {
        let output = "PID COMMAND\n\n  abc broken\n   7 init\n";
        assert_eq!(parse_ps_output(output), vec![ProcessRecord::new(7, "init")]);
    }

    #[test]
    fn header_only_yields_empty_list() {
        assert!(parse_ps_output("  PID COMM\n").is_empty());
        assert!(parse_ps_output("").is_empty());
    }
}
