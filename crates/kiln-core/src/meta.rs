//! Version and loader metadata catalogs.

use std::path::Path;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{
    configs::Endpoints,
    error::{Error, Result},
    fs::{parse_json, read_json, write_to_file},
    game_paths::GamePaths,
    repository::{
        fabric_meta::{select_build, FabricVersions},
        fabric_profile::FabricProfile,
        launcher_manifest::LauncherManifest,
        manifest::Manifest,
    },
};

/// Fetches and parses metadata documents from the remote catalogs.
///
/// With a cache attached, fetched version descriptors and loader profiles
/// are also written under `versions/` so they can be read back offline.
#[derive(Debug, Clone)]
pub struct MetaClient {
    client: Client,
    endpoints: Endpoints,
    cache: Option<GamePaths>,
}

impl MetaClient {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self {
            client,
            endpoints,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, paths: GamePaths) -> Self {
        self.cache = Some(paths);
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "Requesting");

        let response = self.client.get(url).send().await.map_err(|err| Error::network(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { url: url.to_owned(), status });
        }

        let bytes = response.bytes().await.map_err(|err| Error::network(url, err))?;
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<(T, Vec<u8>)> {
        let bytes = self.get_bytes(url).await?;
        let value = parse_json(url, &bytes)?;
        Ok((value, bytes))
    }

    async fn persist(&self, relative: impl FnOnce(&GamePaths) -> std::path::PathBuf, bytes: &[u8]) {
        let Some(paths) = self.cache.as_ref() else {
            return;
        };

        let path = relative(paths);
        match write_to_file(bytes, &path).await {
            Ok(()) => debug!(path = %path.display(), "Metadata cached"),
            Err(err) => warn!(path = %path.display(), "Cannot cache metadata: {err}"),
        }
    }

    /// Global list of game versions. Always fetched fresh.
    #[tracing::instrument(skip_all, err)]
    pub async fn fetch_catalog(&self) -> Result<LauncherManifest> {
        let (catalog, _) = self.get_json::<LauncherManifest>(&self.endpoints.version_manifest).await?;
        info!(versions = catalog.versions.len(), "Version catalog fetched");
        Ok(catalog)
    }

    /// Resolves `version_id` against the catalog and fetches its descriptor.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_version_descriptor(&self, version_id: &str) -> Result<Manifest> {
        let catalog = self.fetch_catalog().await?;
        self.fetch_descriptor_from(&catalog, version_id).await
    }

    pub async fn fetch_descriptor_from(&self, catalog: &LauncherManifest, version_id: &str) -> Result<Manifest> {
        let entry = catalog
            .find_version(version_id)
            .ok_or_else(|| Error::NotFound(format!("game version {version_id}")))?;

        let (manifest, bytes) = self.get_json::<Manifest>(&entry.url).await?;

        self.persist(|paths| paths.manifest_file(version_id), &bytes).await;

        Ok(manifest)
    }

    /// Descriptor written by an earlier [`Self::fetch_version_descriptor`].
    pub async fn read_cached_descriptor(&self, version_id: &str) -> Result<Manifest> {
        let path = self.cached(|paths| paths.manifest_file(version_id))?;
        read_cached(&path, || format!("cached descriptor of {version_id}")).await
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_loader_versions(&self, game_version: &str) -> Result<FabricVersions> {
        let url = format!("{}/versions/loader/{game_version}", self.endpoints.fabric_meta.trim_end_matches('/'));

        match self.get_json::<FabricVersions>(&url).await {
            Ok((versions, _)) => Ok(versions),
            Err(Error::Status { status, .. }) if status.is_client_error() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Profile of the newest stable loader build for `game_version`,
    /// or of `loader_version` when one is requested.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_loader_profile(&self, game_version: &str, loader_version: Option<&str>) -> Result<FabricProfile> {
        let versions = self.fetch_loader_versions(game_version).await?;

        let build = select_build(&versions, loader_version)
            .ok_or_else(|| Error::NotFound(format!("fabric loader build for {game_version}")))?;

        let url = format!(
            "{}/versions/loader/{game_version}/{}/profile/json",
            self.endpoints.fabric_meta.trim_end_matches('/'),
            build.loader.version
        );

        let (profile, bytes) = self.get_json::<FabricProfile>(&url).await?;

        info!(profile = %profile.id, "Loader profile fetched");

        self.persist(|paths| paths.manifest_file(&profile.id), &bytes).await;

        Ok(profile)
    }

    /// Most recently written cached loader profile inheriting from `game_version`.
    pub async fn read_cached_loader_profile(&self, game_version: &str) -> Result<FabricProfile> {
        let versions = self.cached(|paths| paths.versions.clone())?;
        let not_found = || Error::NotFound(format!("cached loader profile for {game_version}"));

        let mut entries = match tokio::fs::read_dir(&versions).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(err) => return Err(Error::io(&versions, err)),
        };

        let suffix = format!("-{game_version}");
        let mut newest = None;

        while let Some(entry) = entries.next_entry().await.map_err(|err| Error::io(&versions, err))? {
            let id = entry.file_name().to_string_lossy().into_owned();
            if !(id.starts_with("fabric-loader-") && id.ends_with(&suffix)) {
                continue;
            }

            let file = entry.path().join(format!("{id}.json"));
            let Ok(modified) = tokio::fs::metadata(&file).await.and_then(|m| m.modified()) else {
                continue;
            };

            if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
                newest = Some((modified, file));
            }
        }

        let (_, file) = newest.ok_or_else(not_found)?;
        read_cached(&file, || format!("cached loader profile for {game_version}")).await
    }

    fn cached(&self, path: impl FnOnce(&GamePaths) -> std::path::PathBuf) -> Result<std::path::PathBuf> {
        self.cache
            .as_ref()
            .map(path)
            .ok_or_else(|| Error::NotFound("metadata cache directory".to_owned()))
    }
}

async fn read_cached<T: DeserializeOwned>(path: &Path, what: impl FnOnce() -> String) -> Result<T> {
    match read_json(path).await {
        Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound(what())),
        other => other,
    }
}
