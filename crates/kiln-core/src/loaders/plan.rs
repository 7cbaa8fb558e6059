use std::path::PathBuf;

use crate::{
    launch::classpath::ClasspathSpec,
    repository::{fabric_profile::FabricProfile, manifest::Manifest},
};

/// What a [`DownloadTask`] fetches. Decides how the installer treats its failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    ClientJar,
    Library,
    /// Archive whose shared libraries are extracted after download.
    Native,
    AssetIndex,
    LoaderLibrary,
    Asset,
}

impl TaskKind {
    /// Failure of a fatal task aborts the whole installation.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::ClientJar)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientJar => "client jar",
            Self::Library => "library",
            Self::Native => "native",
            Self::AssetIndex => "asset index",
            Self::LoaderLibrary => "loader library",
            Self::Asset => "asset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub kind: TaskKind,
    pub name: String,
    pub url: String,
    pub path: PathBuf,
    pub sha1: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VanillaPlan {
    pub manifest: Manifest,
    pub tasks: Vec<DownloadTask>,
}

impl VanillaPlan {
    pub fn natives(&self) -> impl Iterator<Item = &DownloadTask> {
        self.tasks.iter().filter(|task| task.kind == TaskKind::Native)
    }
}

#[derive(Debug, Clone)]
pub struct LoaderPlan {
    pub profile: FabricProfile,
    pub tasks: Vec<DownloadTask>,
}

/// Everything needed to launch one profile. Recomputed on every launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationPlan {
    pub version_id: String,
    pub classpath: ClasspathSpec,
    pub natives_dir: PathBuf,
    pub asset_index_id: String,
}
