use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use crate::config::KillMode;
use crate::error::ProcessError;
use crate::exec::run_command;

/// Converts a validated PID into a unix `pid_t`.
///
/// `kill(2)` treats zero and negative values as process groups, so anything
/// that is not a positive `pid_t` is refused before a signal is sent.
pub fn to_unix_pid(pid: i64) -> Result<Pid, ProcessError> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(ProcessError::NoSuchProcess(pid)),
    }
}

fn signal_for(mode: KillMode) -> Signal {
    match mode {
        KillMode::Graceful => Signal::SIGTERM,
        KillMode::Force => Signal::SIGKILL,
    }
}

pub fn kill_process(pid: i64, mode: KillMode) -> Result<String, ProcessError> {
    let target = to_unix_pid(pid)?;
    let sig = signal_for(mode);

    signal::kill(target, sig)?;

    Ok(format!(
        "SUCCESS: Sent {} to process with PID {}",
        sig.as_str(),
        pid
    ))
}

/// Shells out to `kill`. Its stdout (normally empty) is the success token.
pub async fn kill_process_command(
    pid: i64,
    mode: KillMode,
    timeout: Duration,
) -> Result<String, ProcessError> {
    let target = to_unix_pid(pid)?;
    let sig = match mode {
        KillMode::Graceful => "-TERM",
        KillMode::Force => "-KILL",
    };
    let target = target.to_string();

    let stdout = run_command("kill", &[sig, &target], timeout).await?;
    Ok(stdout.trim().to_string())
}

pub fn is_process_running(pid: i64) -> Result<bool, ProcessError> {
    let target = match to_unix_pid(pid) {
        Ok(target) => target,
        Err(_) => return Ok(false),
    };

    match signal::kill(target, None) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        // Exists, but belongs to someone else.
        Err(Errno::EPERM) => Ok(true),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn refuses_process_group_targets() {
        for pid in [0, -1, -5, i64::from(i32::MAX) + 1] {
            let err = kill_process(pid, KillMode::Graceful).unwrap_err();
            assert!(matches!(err, ProcessError::NoSuchProcess(p) if p == pid));
        }
    }

    #[test]
    fn terminates_child_process() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = i64::from(child.id());

        assert!(is_process_running(pid).unwrap());

        let token = kill_process(pid, KillMode::Graceful).unwrap();
        assert_eq!(
            token,
            format!("SUCCESS: Sent SIGTERM to process with PID {pid}")
        );

        let status = child.wait().unwrap();
        assert!(!status.success());
        assert!(!is_process_running(pid).unwrap());
    }

    #[tokio::test]
    async fn command_kill_of_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = i64::from(child.id());

        let token = kill_process_command(pid, KillMode::Force, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(token, "");
        assert!(!child.wait().unwrap().success());
    }

    #[test]
    fn reaped_process_reports_no_such_process() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = i64::from(child.id());
        child.wait().unwrap();

        let err = kill_process(pid, KillMode::Graceful).unwrap_err();
        assert_eq!(err.to_string(), "ESRCH: No such process");
        assert!(!is_process_running(pid).unwrap());
    }
}
