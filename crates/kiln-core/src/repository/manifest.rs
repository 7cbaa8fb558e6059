use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{maven_data::MavenData, platform::OsName};

/// Descriptor of one concrete game version.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub main_class: String,
    pub downloads: Downloads,
    pub libraries: Vec<Library>,
    pub asset_index: AssetIndexRef,
    #[serde(rename = "type", default)]
    pub version_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Downloads {
    pub client: Artifact,
}

/// A downloadable file.
///
/// When `sha1` is present a local copy is valid only if its digest matches,
/// otherwise mere existence is taken as valid.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
    /// Legacy `os -> classifier` mapping.
    #[serde(default)]
    pub natives: Option<HashMap<String, String>>,
    /// Maven repository for libraries published without a `downloads` block.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<Artifact>,
    #[serde(default)]
    pub classifiers: Option<HashMap<String, Artifact>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub action: Action,
    #[serde(default)]
    pub os: Option<OsRule>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Allow,
    Disallow,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}

impl Library {
    pub fn artifact(&self) -> Option<&Artifact> {
        self.downloads.as_ref().and_then(|d| d.artifact.as_ref())
    }

    /// Native archive of this library for `os`, with the classifier key it was found under.
    pub fn native_artifact(&self, os: OsName) -> Option<(String, &Artifact)> {
        let classifiers = self.downloads.as_ref()?.classifiers.as_ref()?;

        let legacy = self
            .natives
            .as_ref()
            .and_then(|natives| natives.get(os.as_str()))
            .map(|classifier| classifier.replace("${arch}", "64"));

        legacy
            .into_iter()
            .chain(os.natives_classifiers().iter().map(|c| (*c).to_owned()))
            .find_map(|key| classifiers.get(&key).map(|artifact| (key, artifact)))
    }

    /// Maven location for libraries that only carry a repository `url`.
    pub fn maven(&self) -> Option<MavenData> {
        MavenData::new(&self.name)
    }
}
