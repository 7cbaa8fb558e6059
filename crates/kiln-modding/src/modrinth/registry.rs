use std::path::Path;

use kiln_core::{
    configs::Settings,
    downloads::fetcher::{FetchOutcome, Fetcher},
    mods::{ModRegistry, PackageFile, PackageRef, PackageVersion},
    profiles::Loader,
    MODRINTH_API_URL,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{Query, QueryData};

use super::{
    search::{Facets, Hit, Search, SearchData},
    version::{ProjectVersions, ProjectVersionsData, Version, VersionType},
};

const SEARCH_LIMIT: u8 = 20;

/// [`ModRegistry`] backed by the Modrinth API.
#[derive(Debug, Clone)]
pub struct ModrinthRegistry {
    client: Client,
    base_url: String,
    fetcher: Fetcher,
}

impl ModrinthRegistry {
    pub fn new(client: Client) -> Self {
        Self {
            fetcher: Fetcher::new(client.clone()),
            client,
            base_url: MODRINTH_API_URL.to_owned(),
        }
    }

    /// Registry using the endpoint and download settings of the launcher.
    pub fn from_settings(client: Client, settings: &Settings) -> Self {
        Self {
            fetcher: settings.fetcher(client.clone()),
            client,
            base_url: settings.endpoints.modrinth.clone(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn query<D, T>(&self, data: D) -> anyhow::Result<T>
    where
        D: QueryData<T>,
        T: DeserializeOwned,
    {
        Query::new(data).with_base_url(&self.base_url).query(&self.client).await
    }

    pub async fn search_hits(&self, query: &str, game_version: &str, loader: Loader) -> anyhow::Result<Vec<Hit>> {
        let loader = match loader {
            Loader::Vanilla => None,
            other => Some(other.as_str()),
        };

        let data = SearchData::builder()
            .query(query)
            .facets(Facets::mods_for(game_version, loader))
            .limit(SEARCH_LIMIT)
            .build();

        let search: Search = self.query(data).await?;
        debug!(total = search.total_hits, "Search finished");

        Ok(search.hits)
    }

    /// Versions of a project. An unknown project has no versions.
    pub async fn versions(&self, slug: &str, game_version: &str, loader: Loader) -> anyhow::Result<ProjectVersions> {
        let data = ProjectVersionsData::builder()
            .id_or_slug(slug)
            .loaders(vec![loader.as_str().to_owned()])
            .game_versions(vec![game_version.to_owned()])
            .build();

        match self.query(data).await {
            Ok(versions) => Ok(versions),
            Err(err) if is_not_found(&err) => {
                warn!(slug, "Project does not exist");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<reqwest::Error>()
        .and_then(reqwest::Error::status)
        .is_some_and(|status| status == StatusCode::NOT_FOUND)
}

impl From<Hit> for PackageRef {
    fn from(hit: Hit) -> Self {
        Self {
            slug: hit.slug,
            id: hit.project_id,
            title: hit.title,
            description: hit.description,
            downloads: hit.downloads,
        }
    }
}

impl From<&Version> for PackageVersion {
    fn from(version: &Version) -> Self {
        Self {
            id: version.id.clone(),
            name: version.name.clone(),
            version_number: version.version_number.clone(),
            files: version
                .ordered_files()
                .into_iter()
                .map(|file| PackageFile {
                    url: file.url.clone(),
                    filename: file.filename.clone(),
                    sha1: file.hashes.sha1.clone(),
                })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl ModRegistry for ModrinthRegistry {
    async fn search(&self, query: &str, game_version: &str, loader: Loader) -> anyhow::Result<Vec<PackageRef>> {
        let hits = self.search_hits(query, game_version, loader).await?;
        Ok(hits.into_iter().map(PackageRef::from).collect())
    }

    /// Releases first, newest first within each release channel.
    async fn list_versions(&self, slug: &str, game_version: &str, loader: Loader) -> anyhow::Result<Vec<PackageVersion>> {
        let mut versions = self.versions(slug, game_version, loader).await?;
        versions.sort_by_key(|version| version.version_type != VersionType::Release);

        Ok(versions.iter().map(PackageVersion::from).collect())
    }

    async fn download(&self, file: &PackageFile, dest: &Path) -> kiln_core::error::Result<()> {
        match self.fetcher.fetch(&file.url, dest, file.sha1.as_deref()).await {
            FetchOutcome::Failed(err) => Err(err),
            FetchOutcome::Cached | FetchOutcome::Downloaded => Ok(()),
        }
    }
}
