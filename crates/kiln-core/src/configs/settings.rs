use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    downloads::{set::DEFAULT_CONCURRENCY, Fetcher},
    fs::{read_toml_config, write_toml_config},
    repository::{java_runner::JavaRunner, username::Username},
    FABRIC_META_URL, MODRINTH_API_URL, RESOURCES_URL, VERSION_MANIFEST_URL,
};

/// `Settings` its a global settings of the launcher
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub username: Username,
    pub java: JavaRunner,
    /// Maximum number of simultaneous downloads.
    pub concurrency: usize,
    /// Limit for connecting and for each read of a response.
    pub request_timeout_secs: u64,
    /// Cap on asset objects downloaded per installation. `None` syncs the whole index.
    pub asset_download_limit: Option<usize>,
    /// Re-hash freshly downloaded files that have a known SHA-1.
    pub verify_downloads: bool,
    pub endpoints: Endpoints,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: Username::default(),
            java: JavaRunner::default(),
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: 30,
            asset_download_limit: None,
            verify_downloads: true,
            endpoints: Endpoints::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub version_manifest: String,
    pub fabric_meta: String,
    pub resources: String,
    pub modrinth: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            version_manifest: VERSION_MANIFEST_URL.to_owned(),
            fabric_meta: FABRIC_META_URL.to_owned(),
            resources: RESOURCES_URL.to_owned(),
            modrinth: MODRINTH_API_URL.to_owned(),
        }
    }
}

impl Settings {
    /// Reads the settings file, falling back to defaults when it does not exist.
    pub async fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await? {
            read_toml_config(path).await
        } else {
            tracing::debug!(path = %path.display(), "No settings file. Using defaults");
            Ok(Self::default())
        }
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        write_toml_config(self, path).await
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Client whose timeout bounds connecting and each read, never a whole body.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.request_timeout())
            .read_timeout(self.request_timeout())
            .user_agent(concat!("kiln/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    pub fn fetcher(&self, client: reqwest::Client) -> Fetcher {
        Fetcher::new(client).verify_after_download(self.verify_downloads)
    }
}
