#[cfg(target_os = "linux")]
pub mod procfs;
pub mod ps;
pub mod signal;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub use procfs::ProcFsSource;
