use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::{
    error::Result,
    game_paths::GamePaths,
    launch::rules::is_library_included,
    maven_data::{MavenArtifact, MavenData},
    meta::MetaClient,
    platform::OsName,
    repository::manifest::{Artifact, Library, Manifest},
};

use super::{
    map_libraries,
    plan::{DownloadTask, TaskKind, VanillaPlan},
    LibrariesMapper,
};

/// Fetches the descriptor of `version_id` and lists everything it needs on `os`.
#[tracing::instrument(skip(meta, paths), err)]
pub async fn plan_vanilla(meta: &MetaClient, version_id: &str, paths: &GamePaths, os: OsName) -> Result<VanillaPlan> {
    let manifest = meta.fetch_version_descriptor(version_id).await?;
    let tasks = vanilla_tasks(&manifest, paths, os);

    info!(tasks = tasks.len(), "Vanilla installation planned");

    Ok(VanillaPlan { manifest, tasks })
}

/// Client jar first, then libraries in descriptor order, then the asset index.
pub fn vanilla_tasks(manifest: &Manifest, paths: &GamePaths, os: OsName) -> Vec<DownloadTask> {
    let client = &manifest.downloads.client;
    let mut tasks = vec![DownloadTask {
        kind: TaskKind::ClientJar,
        name: format!("{}.jar", manifest.id),
        url: client.url.clone(),
        path: paths.version_jar_file(&manifest.id),
        sha1: client.sha1.clone(),
    }];

    let mapper = VanillaLibrariesMapper { paths, os };
    tasks.extend(map_libraries(&mapper, &manifest.libraries));

    let index = &manifest.asset_index;
    tasks.push(DownloadTask {
        kind: TaskKind::AssetIndex,
        name: format!("{}.json", index.id),
        url: index.url.clone(),
        path: paths.asset_index_file(&index.id),
        sha1: index.sha1.clone(),
    });

    tasks
}

struct VanillaLibrariesMapper<'a> {
    paths: &'a GamePaths,
    os: OsName,
}

impl VanillaLibrariesMapper<'_> {
    fn artifact_task(&self, library: &Library, artifact: &Artifact, kind: TaskKind, classifier: Option<&str>) -> Option<DownloadTask> {
        let path = match &artifact.path {
            Some(path) => PathBuf::from(path),
            None => {
                let mut coordinate = MavenArtifact::parse(&library.name)?;
                if let Some(classifier) = classifier {
                    classifier.clone_into(&mut coordinate.classifier);
                }
                MavenData::from_artifact_data(&coordinate).path
            }
        };

        Some(DownloadTask {
            kind,
            name: library.name.clone(),
            url: artifact.url.clone(),
            path: self.paths.library(path),
            sha1: artifact.sha1.clone(),
        })
    }

    /// Old descriptors list some libraries with only a Maven repository url.
    fn legacy_task(&self, library: &Library, repository: &str) -> Option<DownloadTask> {
        let maven = library.maven()?;

        Some(DownloadTask {
            kind: TaskKind::Library,
            name: library.name.clone(),
            url: maven.url_in(repository),
            path: self.paths.library(&maven.path),
            sha1: None,
        })
    }
}

impl LibrariesMapper<Library> for VanillaLibrariesMapper<'_> {
    fn proceed(&self, library: &Library) -> Vec<DownloadTask> {
        if !is_library_included(library, self.os) {
            debug!(library = %library.name, os = %self.os, "Library excluded by rules");
            return Vec::new();
        }

        let mut tasks = Vec::with_capacity(2);

        match (library.artifact(), library.url.as_deref()) {
            (Some(artifact), _) => tasks.extend(self.artifact_task(library, artifact, TaskKind::Library, None)),
            (None, Some(repository)) => tasks.extend(self.legacy_task(library, repository)),
            (None, None) => {}
        }

        if let Some((classifier, artifact)) = library.native_artifact(self.os) {
            tasks.extend(self.artifact_task(library, artifact, TaskKind::Native, Some(&classifier)));
        }

        if tasks.is_empty() && (library.artifact().is_some() || library.url.is_some()) {
            warn!(library = %library.name, "Library name is not a maven coordinate. Skipping");
        }

        tasks
    }
}
