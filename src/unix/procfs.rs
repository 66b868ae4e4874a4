//! Process enumeration through the proc filesystem.
//!
//! Entries come from [`procfs::process::all_processes_with_root`]. The
//! per-PID `cmdline` reads run concurrently with a fixed upper bound and are
//! all joined before the scan returns. A process may exit between the
//! directory listing and its read; such entries are left out of the result.

use std::path::PathBuf;
use std::sync::Arc;

use ::procfs::ProcError;
use ::procfs::process::{Process, all_processes_with_root};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::model::ProcessRecord;

#[derive(Debug, Clone)]
pub struct ProcFsSource {
    root: PathBuf,
    max_concurrent_reads: usize,
}

/// Outcome of reading a single `<pid>/cmdline`.
#[derive(Debug)]
enum ReadOutcome {
    Record(ProcessRecord),
    /// Empty command line, e.g. kernel threads and zombies.
    Empty,
    /// The process went away before it could be read.
    Exited,
    /// Any other read failure, e.g. permission denied.
    Unreadable,
}

impl ProcFsSource {
    pub fn new(root: impl Into<PathBuf>, max_concurrent_reads: usize) -> Self {
        Self {
            root: root.into(),
            max_concurrent_reads: max_concurrent_reads.max(1),
        }
    }

    pub async fn fetch_processes(&self) -> Result<Vec<ProcessRecord>, ProcessError> {
        let root = self.root.clone();
        let entries = task::spawn_blocking(move || list_entries(root))
            .await
            .map_err(|e| ProcessError::Native(e.to_string()))??;

        let permits = Arc::new(Semaphore::new(self.max_concurrent_reads));
        let mut reads = JoinSet::new();

        for process in entries {
            let permits = Arc::clone(&permits);
            reads.spawn(async move {
                // The semaphore is never closed.
                let _permit = permits.acquire_owned().await;
                read_cmdline(process).await
            });
        }

        let mut processes = Vec::new();
        while let Some(joined) = reads.join_next().await {
            match joined {
                Ok(ReadOutcome::Record(record)) => processes.push(record),
                Ok(ReadOutcome::Empty | ReadOutcome::Exited | ReadOutcome::Unreadable) => {}
                Err(e) => warn!(error = %e, "cmdline read task failed"),
            }
        }

        processes.sort_by_key(|p| p.pid);
        Ok(processes)
    }
}

/// Opens every numeric entry under `root`. Entries that vanish while being
/// opened are skipped.
fn list_entries(root: PathBuf) -> Result<Vec<Process>, ProcessError> {
    let all = all_processes_with_root(&root).map_err(|e| {
        ProcessError::Native(format!("Failed to read {}: {}", root.display(), e))
    })?;

    let mut entries = Vec::new();
    for entry in all {
        match entry {
            Ok(process) => entries.push(process),
            Err(e) => debug!(error = %e, "skipping process entry"),
        }
    }
    Ok(entries)
}

async fn read_cmdline(process: Process) -> ReadOutcome {
    let Ok(pid) = u32::try_from(process.pid) else {
        return ReadOutcome::Unreadable;
    };

    match task::spawn_blocking(move || process.cmdline()).await {
        Ok(Ok(args)) => match cmdline_label(&args) {
            Some(label) => ReadOutcome::Record(ProcessRecord { pid, label }),
            None => ReadOutcome::Empty,
        },
        // procfs reports ESRCH as NotFound too.
        Ok(Err(ProcError::NotFound(_))) => {
            debug!(pid, "process exited during scan");
            ReadOutcome::Exited
        }
        Ok(Err(e)) => {
            debug!(pid, error = %e, "skipping unreadable process entry");
            ReadOutcome::Unreadable
        }
        Err(e) => {
            debug!(pid, error = %e, "cmdline read did not complete");
            ReadOutcome::Unreadable
        }
    }
}

/// Joins the arguments with spaces so argv reads as a command line. A
/// trailing newline left by processes that rewrite their argv is dropped.
fn cmdline_label(args: &[String]) -> Option<String> {
    let label = args.join(" ");
    let label = label.trim_end_matches('\n');
    if label.is_empty() {
        return None;
    }
    Some(label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct FakeProc(PathBuf);

    impl FakeProc {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!(
                "pid-sweep-procfs-{}-{}",
                std::process::id(),
                name
            ));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(&root).unwrap();
            Self(root)
        }

        fn process(&self, pid: &str, cmdline: &[u8]) -> &Self {
            let dir = self.0.join(pid);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("cmdline"), cmdline).unwrap();
            self
        }

        fn vanished(&self, pid: &str) -> &Self {
            fs::create_dir_all(self.0.join(pid)).unwrap();
            self
        }
    }

    impl Drop for FakeProc {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cmdline_labels() {
        assert_eq!(
            cmdline_label(&args(&["/usr/bin/python3", "-m", "http.server"])),
            Some("/usr/bin/python3 -m http.server".to_string())
        );
        assert_eq!(cmdline_label(&args(&["bash\n"])), Some("bash".to_string()));
        assert_eq!(cmdline_label(&args(&["\n"])), None);
        assert_eq!(cmdline_label(&[]), None);
    }

    #[tokio::test]
    async fn scans_numeric_entries_and_skips_races() {
        let fake = FakeProc::new("scan");
        fake.process("1", b"/sbin/init\0splash\0")
            .process("42", b"sshd: root\0")
            .process("7", b"")
            .process("self", b"ignored\0")
            .vanished("99");
        fs::write(fake.0.join("uptime"), "1.0 2.0").unwrap();

        let processes = ProcFsSource::new(&fake.0, 2).fetch_processes().await.unwrap();

        assert_eq!(
            processes,
            vec![
                ProcessRecord::new(1, "/sbin/init splash"),
                ProcessRecord::new(42, "sshd: root"),
            ]
        );
    }

    #[tokio::test]
    async fn every_read_settles_with_single_permit() {
        let fake = FakeProc::new("serial");
        for pid in 100..140 {
            fake.process(&pid.to_string(), format!("worker-{pid}\0").as_bytes());
        }

        let processes = ProcFsSource::new(&fake.0, 1).fetch_processes().await.unwrap();

        assert_eq!(processes.len(), 40);
        assert_eq!(processes[0], ProcessRecord::new(100, "worker-100"));
        assert_eq!(processes[39], ProcessRecord::new(139, "worker-139"));
    }

    #[tokio::test]
    async fn unreadable_entries_are_skipped() {
        let fake = FakeProc::new("unreadable");
        fake.process("5", b"cron\0");
        fs::create_dir_all(fake.0.join("6").join("cmdline")).unwrap();

        let processes = ProcFsSource::new(&fake.0, 4).fetch_processes().await.unwrap();

        assert_eq!(processes, vec![ProcessRecord::new(5, "cron")]);
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let root = std::env::temp_dir().join("pid-sweep-procfs-does-not-exist");
        let err = ProcFsSource::new(root, 4).fetch_processes().await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"), "{err}");
    }
}
