use serde::{Deserialize, Serialize};

/// Loader builds compatible with one game version, newest first.
pub type FabricVersions = Vec<LoaderBuild>;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoaderBuild {
    pub loader: LoaderVersion,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoaderVersion {
    pub version: String,
    #[serde(default)]
    pub stable: bool,
    #[serde(default)]
    pub build: Option<i64>,
    #[serde(default)]
    pub maven: Option<String>,
}

/// Picks the build to install: the requested one, else the newest stable one, else the newest.
pub fn select_build<'a>(versions: &'a [LoaderBuild], requested: Option<&str>) -> Option<&'a LoaderBuild> {
    if let Some(requested) = requested {
        return versions.iter().find(|b| b.loader.version == requested);
    }

    versions.iter().find(|b| b.loader.stable).or_else(|| {
        let newest = versions.first();
        if let Some(build) = newest {
            tracing::warn!(version = %build.loader.version, "No stable loader build. Using the newest one");
        }
        newest
    })
}
