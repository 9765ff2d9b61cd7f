use std::fmt;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    Windows,
    Unix,
    Other,
}

impl PlatformFamily {
    /// The family this binary was compiled for
    pub fn current() -> Self {
        if cfg!(windows) {
            PlatformFamily::Windows
        } else if cfg!(unix) {
            PlatformFamily::Unix
        } else {
            PlatformFamily::Other
        }
    }

    pub fn is_windows(self) -> bool {
        self == PlatformFamily::Windows
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlatformFamily::Windows => "windows",
            PlatformFamily::Unix => "unix",
            PlatformFamily::Other => "other",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
