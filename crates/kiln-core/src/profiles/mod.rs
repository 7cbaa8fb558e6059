use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_GAME_VERSION, DEFAULT_MEMORY_GB, DEFAULT_PROFILE};

pub mod store;

pub use store::{ProfileError, ProfileStore};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    Vanilla,
    Fabric,
    /// Accepted in profiles but installed as vanilla.
    Forge,
}

impl Loader {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::Fabric => "fabric",
            Self::Forge => "forge",
        }
    }
}

impl Display for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Loader {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vanilla" => Ok(Self::Vanilla),
            "fabric" => Ok(Self::Fabric),
            "forge" => Ok(Self::Forge),
            other => Err(format!("unknown loader `{other}`")),
        }
    }
}

/// Mod installed into a profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModRef {
    pub name: String,
    pub slug: String,
    #[serde(rename = "sourceId", default)]
    pub source_id: String,
    /// File in `mods/` once the mod has been downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub version: String,
    pub loader: Loader,
    #[serde(default)]
    pub mods: Vec<ModRef>,
    #[serde(rename = "memoryGB", alias = "ram", default = "default_memory")]
    pub memory_gb: u32,
    /// Install the Fabric API mod together with the loader.
    #[serde(rename = "fabricApi", default = "default_true")]
    pub fabric_api: bool,
}

fn default_memory() -> u32 {
    DEFAULT_MEMORY_GB
}

fn default_true() -> bool {
    true
}

impl Profile {
    pub fn new(name: impl Into<String>, version: impl Into<String>, loader: Loader) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            loader,
            mods: Vec::new(),
            memory_gb: DEFAULT_MEMORY_GB,
            fabric_api: true,
        }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_PROFILE
    }

    pub fn find_mod(&self, name: &str) -> Option<&ModRef> {
        self.mods.iter().find(|m| m.name == name)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE, DEFAULT_GAME_VERSION, Loader::Fabric)
    }
}
