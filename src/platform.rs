/// Operating system family the process strategies are selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Unsupported,
}

impl Platform {
    /// Detects the platform this binary was built for. Meant to be called once
    /// at startup and handed to [`crate::ProcessManager`].
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(name: &str) -> Self {
        match name {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Unsupported,
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, Platform::Unsupported)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Linux => write!(f, "linux"),
            Platform::Unsupported => write!(f, "unsupported"),
        }
    }
}
