use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Operating system identifiers as they appear in version metadata rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsName {
    Windows,
    Osx,
    Linux,
}

impl OsName {
    pub const ALL: [OsName; 3] = [OsName::Windows, OsName::Osx, OsName::Linux];

    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Osx
        } else {
            Self::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Osx => "osx",
            Self::Linux => "linux",
        }
    }

    /// Classifier keys that may hold the native archive for this platform, most specific first.
    ///
    /// Newer descriptors publish macOS natives as `natives-macos`.
    pub fn natives_classifiers(self) -> &'static [&'static str] {
        match self {
            Self::Windows => &["natives-windows"],
            Self::Osx => &["natives-osx", "natives-macos"],
            Self::Linux => &["natives-linux"],
        }
    }

    /// File suffixes of shared libraries found in native archives.
    pub fn shared_library_suffixes(self) -> &'static [&'static str] {
        match self {
            Self::Osx => &[".dll", ".so", ".dylib", ".jnilib"],
            _ => &[".dll", ".so", ".dylib"],
        }
    }
}

impl Display for OsName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of `os.arch` in metadata rules for the running process.
pub const ARCH: &str = if cfg!(target_pointer_width = "32") { "x86" } else { "x86_64" };

#[cfg(windows)]
pub const CLASSPATH_SEPARATOR: &str = ";";

#[cfg(not(windows))]
pub const CLASSPATH_SEPARATOR: &str = ":";
