use std::path::{Path, PathBuf};

use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of [`Error`] used when failures are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Format,
    NotFound,
    Integrity,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("cannot parse {origin} at `{path}`: {message}")]
    Format {
        origin: String,
        path: String,
        message: String,
    },

    #[error("{0} was not found")]
    NotFound(String),

    #[error("hash mismatch for {}: expected {expected}, got {actual}", path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network { .. } | Error::Status { .. } => ErrorKind::Network,
            Error::Format { .. } => ErrorKind::Format,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Integrity { .. } => ErrorKind::Integrity,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network { url: url.into(), source }
    }

    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Format => "format",
            ErrorKind::NotFound => "not found",
            ErrorKind::Integrity => "integrity",
            ErrorKind::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
