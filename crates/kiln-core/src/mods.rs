//! Seam towards a mod package registry.

use std::path::Path;

use crate::{error::Result, profiles::Loader};

/// Search hit of a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    pub slug: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub downloads: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub id: String,
    pub name: String,
    pub version_number: String,
    pub files: Vec<PackageFile>,
}

impl PackageVersion {
    /// File to install. Registries list the primary file first.
    pub fn primary_file(&self) -> Option<&PackageFile> {
        self.files.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub url: String,
    pub filename: String,
    pub sha1: Option<String>,
}

#[async_trait::async_trait]
pub trait ModRegistry: Send + Sync {
    async fn search(&self, query: &str, game_version: &str, loader: Loader) -> anyhow::Result<Vec<PackageRef>>;

    /// Versions of `slug` compatible with the game version and loader, newest first.
    async fn list_versions(&self, slug: &str, game_version: &str, loader: Loader) -> anyhow::Result<Vec<PackageVersion>>;

    /// Downloads `file` into `dest`, checking its SHA-1 when one is published.
    async fn download(&self, file: &PackageFile, dest: &Path) -> Result<()>;
}
