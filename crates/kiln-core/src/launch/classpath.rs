use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::debug;

use crate::{
    game_paths::GamePaths,
    loaders::{fabric::loader_tasks, plan::TaskKind, vanilla::vanilla_tasks},
    platform::{OsName, CLASSPATH_SEPARATOR},
    repository::{fabric_profile::FabricProfile, manifest::Manifest},
};

/// Ordered classpath together with the class the game is started with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClasspathSpec {
    pub entries: Vec<PathBuf>,
    pub main_class: String,
}

impl ClasspathSpec {
    pub fn joined(&self) -> String {
        self.entries.iter().map(|p| p.display().to_string()).join(CLASSPATH_SEPARATOR)
    }
}

/// Loader libraries, then vanilla libraries, then the client jar.
///
/// Only files that exist on disk are listed. A missing library is not an
/// error here and only shows up when the game fails to load a class.
pub fn assemble(manifest: &Manifest, loader: Option<&FabricProfile>, paths: &GamePaths, os: OsName) -> ClasspathSpec {
    let loader_libraries = loader
        .map(|profile| loader_tasks(profile, paths))
        .unwrap_or_default()
        .into_iter()
        .map(|task| task.path);

    let vanilla_libraries = vanilla_tasks(manifest, paths, os)
        .into_iter()
        .filter(|task| task.kind == TaskKind::Library)
        .map(|task| task.path);

    let client = paths.version_jar_file(&manifest.id);

    let entries = loader_libraries
        .chain(vanilla_libraries)
        .chain(std::iter::once(client))
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                debug!(path = %path.display(), "Classpath entry is missing. Omitting");
            }
            exists
        })
        .map(|path| absolute(&path))
        .unique()
        .collect_vec();

    let main_class = loader.map_or_else(|| manifest.main_class.clone(), |profile| profile.main_class.clone());

    ClasspathSpec { entries, main_class }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
