use tracing::{info, warn};

use crate::{
    error::Result,
    game_paths::GamePaths,
    meta::MetaClient,
    repository::fabric_profile::{FabricLibrary, FabricProfile},
};

use super::{
    map_libraries,
    plan::{DownloadTask, LoaderPlan, TaskKind},
    LibrariesMapper,
};

/// Fetches the Fabric loader profile for `version_id` and lists its libraries.
#[tracing::instrument(skip(meta, paths), err)]
pub async fn plan_loader(
    meta: &MetaClient,
    version_id: &str,
    loader_version: Option<&str>,
    paths: &GamePaths,
) -> Result<LoaderPlan> {
    let profile = meta.fetch_loader_profile(version_id, loader_version).await?;
    let tasks = loader_tasks(&profile, paths);

    info!(profile = %profile.id, tasks = tasks.len(), "Loader installation planned");

    Ok(LoaderPlan { profile, tasks })
}

pub fn loader_tasks(profile: &FabricProfile, paths: &GamePaths) -> Vec<DownloadTask> {
    map_libraries(&FabricLibrariesMapper { paths }, &profile.libraries)
}

struct FabricLibrariesMapper<'a> {
    paths: &'a GamePaths,
}

impl LibrariesMapper<FabricLibrary> for FabricLibrariesMapper<'_> {
    fn proceed(&self, library: &FabricLibrary) -> Vec<DownloadTask> {
        let Some(repository) = library.url.as_deref().filter(|url| !url.is_empty()) else {
            warn!(library = %library.name, "Loader library has no repository url. Skipping");
            return Vec::new();
        };

        let Some(data) = library.maven() else {
            warn!(library = %library.name, "Loader library name is not a maven coordinate. Skipping");
            return Vec::new();
        };

        vec![DownloadTask {
            kind: TaskKind::LoaderLibrary,
            name: library.name.clone(),
            url: data.url_in(repository),
            path: self.paths.library(&data.path),
            sha1: library.sha1.clone(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn library(name: &str, url: Option<&str>) -> FabricLibrary {
        FabricLibrary {
            name: name.to_owned(),
            url: url.map(ToOwned::to_owned),
            ..FabricLibrary::default()
        }
    }

    #[test]
    fn maven_layout_test() {
        let profile = FabricProfile {
            id: "fabric-loader-0.15.6-1.20.4".to_owned(),
            inherits_from: Some("1.20.4".to_owned()),
            main_class: crate::FABRIC_MAIN_CLASS.to_owned(),
            arguments: crate::repository::fabric_profile::Arguments::default(),
            libraries: vec![
                library("net.fabricmc:fabric-loader:0.15.6", Some("https://maven.fabricmc.net/")),
                library("org.ow2.asm:asm:9.6", None),
                library("broken", Some("https://maven.fabricmc.net/")),
                library("net.fabricmc:intermediary:1.20.4", Some("https://maven.fabricmc.net")),
            ],
        };

        let tasks = loader_tasks(&profile, &GamePaths::new("/mc"));

        assert_eq!(tasks.len(), 2);
        assert_eq!(
            tasks[0].url,
            "https://maven.fabricmc.net/net/fabricmc/fabric-loader/0.15.6/fabric-loader-0.15.6.jar"
        );
        assert_eq!(
            tasks[0].path,
            PathBuf::from("/mc/libraries/net/fabricmc/fabric-loader/0.15.6/fabric-loader-0.15.6.jar")
        );
        assert_eq!(
            tasks[1].url,
            "https://maven.fabricmc.net/net/fabricmc/intermediary/1.20.4/intermediary-1.20.4.jar"
        );
        assert!(tasks.iter().all(|t| t.kind == TaskKind::LoaderLibrary));
    }
}
