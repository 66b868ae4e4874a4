pub mod tasklist;

#[cfg(target_os = "windows")]
pub mod native;
