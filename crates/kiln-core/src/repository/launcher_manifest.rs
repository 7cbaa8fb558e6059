use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct LauncherManifest {
    #[serde(default)]
    pub latest: Latest,
    pub versions: Vec<Version>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Latest {
    pub release: String,
    pub snapshot: String,
}

/// Catalog entry pointing at the descriptor of one version.
#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone)]
pub struct Version {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl LauncherManifest {
    pub fn find_version(&self, version: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == version)
    }

    pub fn releases(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter().filter(|v| v.version_type == "release")
    }
}
