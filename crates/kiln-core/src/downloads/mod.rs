pub use downloaders::*;
pub use fetcher::{FetchOutcome, Fetcher};

use std::path::Path;

use futures_util::stream::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::error::{Error, Result};

pub mod downloaders;
pub mod fetcher;
pub mod progress;
pub mod traits;

/// Streams `url` into `path`, creating parent directories.
///
/// A partially written file is removed when the transfer fails.
pub(crate) async fn download_file(client: &Client, path: &Path, url: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(|err| Error::io(dir, err))?;
    }

    let response = client.get(url).send().await.map_err(|err| Error::network(url, err))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status { url: url.to_owned(), status });
    }

    let mut file = tokio::fs::File::create(path).await.map_err(|err| {
        error!(path = %path.display(), "Error occurred during file creating: {err}");
        Error::io(path, err)
    })?;

    let mut stream = response.bytes_stream();

    let written = async {
        while let Some(item) = stream.next().await {
            let chunk = item.map_err(|err| Error::network(url, err))?;
            file.write_all(&chunk).await.map_err(|err| Error::io(path, err))?;
        }
        file.flush().await.map_err(|err| Error::io(path, err))
    }
    .await;

    if let Err(err) = written {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
        return Err(err);
    }

    debug!("Downloaded successfully {}", path.to_string_lossy());

    Ok(())
}
