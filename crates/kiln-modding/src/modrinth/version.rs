//! Version

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{format_list, Builder, QueryData};

pub type ProjectVersions = Vec<Version>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub version_number: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    pub version_type: VersionType,
    #[serde(default)]
    pub featured: bool,
    pub date_published: String,
    pub files: Vec<File>,
}

impl Version {
    /// Primary file first, the rest in listed order.
    pub fn ordered_files(&self) -> Vec<&File> {
        let mut files = self.files.iter().collect::<Vec<_>>();
        files.sort_by_key(|file| !file.primary);
        files
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Release,
    Beta,
    Alpha,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub hashes: Hashes,
    pub url: String,
    pub filename: String,
    pub primary: bool,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hashes {
    pub sha1: Option<String>,
    pub sha512: Option<String>,
}

#[derive(Debug, TypedBuilder)]
pub struct ProjectVersionsData {
    #[builder(setter(into))]
    id_or_slug: String,
    #[builder(default, setter(strip_option))]
    loaders: Option<Vec<String>>,
    #[builder(default, setter(strip_option))]
    game_versions: Option<Vec<String>>,
}

impl QueryData<ProjectVersions> for ProjectVersionsData {
    fn builder(&self, base_url: &str) -> Builder {
        Builder::new(format!("{base_url}/project/{}/version", self.id_or_slug))
            .add_optional_parameter("loaders", self.loaders.as_ref().map(|s| format_list(s.iter())))
            .add_optional_parameter("game_versions", self.game_versions.as_ref().map(|s| format_list(s.iter())))
    }
}
