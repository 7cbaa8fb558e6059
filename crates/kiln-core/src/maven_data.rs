use std::{fmt::Display, path::PathBuf, sync::LazyLock};

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Repository-relative location of a Maven artifact.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MavenData {
    /// Relative url, every segment percent-encoded.
    pub url: String,
    pub path: PathBuf,
    pub file_name: String,
}

impl MavenData {
    pub fn new(artifact: &str) -> Option<Self> {
        MavenArtifact::parse(artifact).map(|artifact| Self::from_artifact_data(&artifact))
    }

    #[must_use]
    pub fn from_artifact_data(artifact: &MavenArtifact) -> Self {
        let classifier = if artifact.classifier.is_empty() {
            String::new()
        } else {
            format!("-{}", artifact.classifier)
        };

        let file_name = format!("{}-{}{classifier}.{}", &artifact.artifact, &artifact.version, &artifact.extension);

        let segments = artifact
            .group
            .split('.')
            .chain([artifact.artifact.as_str(), artifact.version.as_str(), file_name.as_str()])
            .collect_vec();

        let url = segments.iter().map(|s| urlencoding::encode(s)).join("/");

        Self {
            url,
            path: segments.iter().collect(),
            file_name,
        }
    }

    /// Joins the relative url onto a repository base url.
    pub fn url_in(&self, repository: &str) -> String {
        format!("{}/{}", repository.trim_end_matches('/'), self.url)
    }
}

/// Parsed `group:artifact:version[:classifier][@extension]` coordinate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: String,
    pub extension: String,
}

impl MavenArtifact {
    /// Returns `None` when the coordinate is not at least a `group:artifact:version` triple.
    pub fn parse(artifact: &str) -> Option<Self> {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            // PANICS: This will never panic because the pattern is valid.
            Regex::new(r"^(?P<group>[^:@]+):(?P<artifact>[^:@]+):(?P<version>[^:@]+)(?::(?P<classifier>[^@]+))?(?:@(?P<extension>.+))?$").unwrap()
        });

        let captures = REGEX.captures(artifact)?;
        let get_group = |name, default| captures.name(name).map_or(String::from(default), |v| String::from(v.as_str()));

        Some(MavenArtifact {
            group: get_group("group", ""),
            artifact: get_group("artifact", ""),
            version: get_group("version", ""),
            classifier: get_group("classifier", ""),
            extension: get_group("extension", "jar"),
        })
    }
}

impl Display for MavenArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}:{}:{}", self.group, self.artifact, self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_test() {
        let maven = MavenData::new("net.fabricmc:fabric-loader:0.14.22").unwrap();
        assert_eq!(maven.path, PathBuf::from("net/fabricmc/fabric-loader/0.14.22/fabric-loader-0.14.22.jar"));
        assert_eq!(maven.url, "net/fabricmc/fabric-loader/0.14.22/fabric-loader-0.14.22.jar");

        let maven = MavenData::new("de.oceanlabs.mcp:mcp_config:1.20.1-20230612.114412@zip").unwrap();
        assert_eq!(
            maven.path,
            PathBuf::from("de/oceanlabs/mcp/mcp_config/1.20.1-20230612.114412/mcp_config-1.20.1-20230612.114412.zip")
        );
    }

    #[test]
    fn classifier_test() {
        let artifact = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.1:natives-linux").unwrap();
        assert_eq!(artifact.classifier, "natives-linux");
        assert_eq!(MavenData::from_artifact_data(&artifact).file_name, "lwjgl-3.3.1-natives-linux.jar");
    }

    #[test]
    fn rejects_incomplete_coordinates() {
        assert!(MavenArtifact::parse("net.fabricmc:fabric-loader").is_none());
        assert!(MavenArtifact::parse("").is_none());
    }

    #[test]
    fn url_in_repository() {
        let maven = MavenData::new("net.fabricmc:intermediary:1.20.4").unwrap();
        assert_eq!(
            maven.url_in("https://maven.fabricmc.net/"),
            "https://maven.fabricmc.net/net/fabricmc/intermediary/1.20.4/intermediary-1.20.4.jar"
        );
    }
}
