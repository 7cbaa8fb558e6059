use std::path::Path;

use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    calculate_sha1,
    error::{Error, Result},
};

use super::download_file;

/// Result of one [`Fetcher::fetch`] call. Failures are values, never panics.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The local file was already valid and no request was made.
    Cached,
    Downloaded,
    Failed(Error),
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Downloads files into the content stores with optional SHA-1 verification.
///
/// Concurrent calls for different destinations are safe. Two concurrent calls
/// for the same destination are not, and nothing here prevents them.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    verify_after_download: bool,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            verify_after_download: true,
        }
    }

    /// Whether a fresh download is hashed again before it is accepted. On by default.
    #[must_use]
    pub fn verify_after_download(mut self, verify: bool) -> Self {
        self.verify_after_download = verify;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Makes sure `dest` holds the content of `url`.
    ///
    /// With a known `sha1` a local file counts as cached only if its digest
    /// matches. Without one, an existing file is trusted as is, which means a
    /// corrupt unverified file is never replaced.
    pub async fn fetch(&self, url: &str, dest: &Path, sha1: Option<&str>) -> FetchOutcome {
        if is_valid(dest, sha1).await {
            debug!(path = %dest.display(), "Cached");
            return FetchOutcome::Cached;
        }

        if let Err(err) = download_file(&self.client, dest, url).await {
            warn!(url, "Download failed: {err}");
            return FetchOutcome::Failed(err);
        }

        if let (true, Some(expected)) = (self.verify_after_download, sha1) {
            if let Err(err) = verify(dest, expected).await {
                warn!("{err}");
                let _ = tokio::fs::remove_file(dest).await;
                return FetchOutcome::Failed(err);
            }
        }

        FetchOutcome::Downloaded
    }
}

/// Whether `path` can be used without downloading it again.
pub async fn is_valid(path: &Path, sha1: Option<&str>) -> bool {
    match sha1 {
        Some(expected) => verify(path, expected).await.is_ok(),
        None => tokio::fs::try_exists(path).await.unwrap_or(false),
    }
}

pub(crate) async fn verify(path: &Path, expected: &str) -> Result<()> {
    let data = tokio::fs::read(path).await.map_err(|err| Error::io(path, err))?;
    let actual = calculate_sha1(data);

    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(Error::Integrity {
            path: path.to_path_buf(),
            expected: expected.to_owned(),
            actual,
        })
    }
}
