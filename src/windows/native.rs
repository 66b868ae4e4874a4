use windows::Win32::Foundation::{
    BOOL, CloseHandle, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, HANDLE, HWND, LPARAM,
    STILL_ACTIVE, WPARAM,
};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_ACCESS_RIGHTS, PROCESS_QUERY_LIMITED_INFORMATION,
    PROCESS_TERMINATE, TerminateProcess,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowThreadProcessId, PostMessageW, WM_CLOSE, WM_QUIT,
};

use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;

use tracing::debug;

use crate::config::KillMode;
use crate::error::ProcessError;
use crate::model::ProcessRecord;

/// Exit code handed to `TerminateProcess`.
const TERMINATE_EXIT_CODE: u32 = 0xDEAD;

const PROCESS_DOES_NOT_EXIST: &str = "ERROR: Process does not exist";

/// Owned Win32 handle, closed on drop.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn win32_error(error: windows::core::Error) -> ProcessError {
    if error.code() == ERROR_ACCESS_DENIED.into() {
        ProcessError::Native("ERROR: Access denied".to_string())
    } else {
        ProcessError::Native(format!("ERROR: {}", error.message()))
    }
}

fn is_missing_process(error: &windows::core::Error) -> bool {
    error.code() == ERROR_INVALID_PARAMETER.into()
}

pub async fn fetch_processes() -> Result<Vec<ProcessRecord>, ProcessError> {
    tokio::task::spawn_blocking(list_processes)
        .await
        .map_err(|e| ProcessError::Native(format!("toolhelp task failed: {e}")))?
}

/// Walks a Toolhelp32 process snapshot. The list grows with the snapshot, so
/// nothing is truncated.
fn list_processes() -> Result<Vec<ProcessRecord>, ProcessError> {
    unsafe {
        let snapshot =
            OwnedHandle(CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0).map_err(win32_error)?);

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        Process32FirstW(snapshot.0, &mut entry).map_err(win32_error)?;

        let mut processes = Vec::new();
        loop {
            processes.push(ProcessRecord {
                pid: entry.th32ProcessID,
                label: exe_name(&entry.szExeFile),
            });

            if Process32NextW(snapshot.0, &mut entry).is_err() {
                break;
            }
        }

        Ok(processes)
    }
}

fn exe_name(raw: &[u16]) -> String {
    let len = raw.iter().position(|c| *c == 0).unwrap_or(raw.len());
    OsString::from_wide(&raw[..len])
        .to_string_lossy()
        .into_owned()
}

fn open_process(pid: i64, access: PROCESS_ACCESS_RIGHTS) -> Result<OwnedHandle, ProcessError> {
    let Ok(pid) = u32::try_from(pid) else {
        return Err(ProcessError::Native(PROCESS_DOES_NOT_EXIST.to_string()));
    };

    unsafe {
        match OpenProcess(access, false, pid) {
            Ok(handle) => Ok(OwnedHandle(handle)),
            Err(error) if is_missing_process(&error) => {
                Err(ProcessError::Native(PROCESS_DOES_NOT_EXIST.to_string()))
            }
            Err(error) => Err(win32_error(error)),
        }
    }
}

fn terminate(pid: i64) -> Result<String, ProcessError> {
    let handle = open_process(pid, PROCESS_TERMINATE)?;

    unsafe {
        TerminateProcess(handle.0, TERMINATE_EXIT_CODE).map_err(win32_error)?;
    }

    Ok(format!(
        "SUCCESS: The process with PID {} has been terminated",
        pid
    ))
}

struct WindowSearch {
    pid: u32,
    found: bool,
}

unsafe extern "system" fn close_windows_of(hwnd: HWND, lparam: LPARAM) -> BOOL {
    unsafe {
        let search = &mut *(lparam.0 as *mut WindowSearch);

        let mut owner = 0u32;
        GetWindowThreadProcessId(hwnd, Some(&mut owner));
        if owner == search.pid {
            search.found = true;
            let _ = PostMessageW(Some(hwnd), WM_CLOSE, WPARAM(0), LPARAM(0));
            let _ = PostMessageW(Some(hwnd), WM_QUIT, WPARAM(0), LPARAM(0));
        }
    }
    BOOL::from(true)
}

/// Asks every top-level window owned by `pid` to close. Processes without a
/// window are terminated instead.
fn close_or_terminate(pid: i64) -> Result<String, ProcessError> {
    let Ok(raw) = u32::try_from(pid) else {
        return Err(ProcessError::Native(PROCESS_DOES_NOT_EXIST.to_string()));
    };

    let mut search = WindowSearch {
        pid: raw,
        found: false,
    };

    unsafe {
        EnumWindows(
            Some(close_windows_of),
            LPARAM(&mut search as *mut WindowSearch as isize),
        )
        .map_err(win32_error)?;
    }

    if search.found {
        return Ok("SUCCESS: WM_CLOSE, WM_QUIT sent".to_string());
    }

    debug!(pid, "no window owned by process, terminating");
    terminate(pid)
}

pub async fn kill_process(pid: i64, mode: KillMode) -> Result<String, ProcessError> {
    tokio::task::spawn_blocking(move || match mode {
        KillMode::Graceful => close_or_terminate(pid),
        KillMode::Force => terminate(pid),
    })
    .await
    .map_err(|e| ProcessError::Native(format!("terminate task failed: {e}")))?
}

pub fn is_process_running(pid: i64) -> Result<bool, ProcessError> {
    let handle = match open_process(pid, PROCESS_QUERY_LIMITED_INFORMATION) {
        Ok(handle) => handle,
        Err(ProcessError::Native(message)) if message == PROCESS_DOES_NOT_EXIST => {
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let mut exit_code = 0u32;
    unsafe {
        GetExitCodeProcess(handle.0, &mut exit_code).map_err(win32_error)?;
    }

    Ok(exit_code == STILL_ACTIVE.0 as u32)
}
