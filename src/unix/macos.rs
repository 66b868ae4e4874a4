//! Native process enumeration on macOS through `sysctl(KERN_PROC_ALL)`.

use std::ffi::CStr;
use std::mem;
use std::ptr;

use tracing::debug;

use crate::error::ProcessError;
use crate::model::ProcessRecord;

/// How many times the size query is repeated when the table grows between
/// the query and the read.
const MAX_ATTEMPTS: usize = 8;

/// Extra entries allocated on top of the queried size.
const SLACK_ENTRIES: usize = 16;

pub async fn fetch_processes() -> Result<Vec<ProcessRecord>, ProcessError> {
    tokio::task::spawn_blocking(list_processes)
        .await
        .map_err(|e| ProcessError::Native(format!("sysctl task failed: {e}")))?
}

fn list_processes() -> Result<Vec<ProcessRecord>, ProcessError> {
    let procs = read_proc_table()?;

    Ok(procs
        .iter()
        .map(|kp| {
            // SAFETY: p_comm is a NUL terminated array filled in by the kernel.
            let comm = unsafe { CStr::from_ptr(kp.kp_proc.p_comm.as_ptr()) };
            ProcessRecord {
                pid: kp.kp_proc.p_pid as u32,
                label: comm.to_string_lossy().into_owned(),
            }
        })
        .collect())
}

/// Queries the table size, allocates a buffer of that size and reads it,
/// starting over when the kernel reports `ENOMEM`.
fn read_proc_table() -> Result<Vec<libc::kinfo_proc>, ProcessError> {
    let mut mib = [libc::CTL_KERN, libc::KERN_PROC, libc::KERN_PROC_ALL, 0];
    let entry_size = mem::size_of::<libc::kinfo_proc>();

    for attempt in 0..MAX_ATTEMPTS {
        let mut length: libc::size_t = 0;
        // SAFETY: a null buffer asks the kernel for the required length only.
        let rc = unsafe {
            libc::sysctl(
                mib.as_mut_ptr(),
                3,
                ptr::null_mut(),
                &mut length,
                ptr::null_mut(),
                0,
            )
        };
        if rc == -1 {
            return Err(sysctl_error());
        }

        let capacity = length / entry_size + SLACK_ENTRIES;
        let mut buffer: Vec<libc::kinfo_proc> = Vec::with_capacity(capacity);
        let mut length = capacity * entry_size;

        // SAFETY: the buffer has room for `capacity` entries and the kernel
        // writes at most `length` bytes.
        let rc = unsafe {
            libc::sysctl(
                mib.as_mut_ptr(),
                3,
                buffer.as_mut_ptr().cast(),
                &mut length,
                ptr::null_mut(),
                0,
            )
        };

        if rc == -1 {
            let errno = std::io::Error::last_os_error();
            if errno.raw_os_error() == Some(libc::ENOMEM) {
                debug!(attempt, "process table grew, retrying sysctl");
                continue;
            }
            return Err(ProcessError::Native(format!("ERROR: Sysctl {errno}")));
        }

        // SAFETY: the kernel initialised `length` bytes of whole entries.
        unsafe { buffer.set_len(length / entry_size) };
        return Ok(buffer);
    }

    Err(ProcessError::Native(format!(
        "ERROR: Sysctl gave up after {MAX_ATTEMPTS} attempts"
    )))
}

fn sysctl_error() -> ProcessError {
    ProcessError::Native(format!(
        "ERROR: Sysctl {}",
        std::io::Error::last_os_error()
    ))
}
