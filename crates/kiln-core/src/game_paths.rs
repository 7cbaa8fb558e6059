use std::path::{Path, PathBuf};

use crate::{PROFILES_FILE, SETTINGS_CONFIG};

/// On-disk layout of a game directory.
///
/// Every location is a pure function of the artifact identity (version id,
/// library path or asset hash), so the stores can be shared between profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePaths {
    pub game: PathBuf,
    pub versions: PathBuf,
    pub libraries: PathBuf,
    pub assets: PathBuf,
    pub natives: PathBuf,
    pub mods: PathBuf,
}

impl GamePaths {
    pub fn new(game_dir: impl Into<PathBuf>) -> Self {
        let game: PathBuf = game_dir.into();

        Self {
            versions: game.join("versions"),
            libraries: game.join("libraries"),
            assets: game.join("assets"),
            natives: game.join("natives"),
            mods: game.join("mods"),
            game,
        }
    }

    pub fn make_absolute(self) -> anyhow::Result<Self> {
        let current_dir = std::env::current_dir()?;

        let make_path_absolute = |path: PathBuf| if path.is_absolute() { path } else { current_dir.join(path) };

        Ok(Self {
            game: make_path_absolute(self.game),
            versions: make_path_absolute(self.versions),
            libraries: make_path_absolute(self.libraries),
            assets: make_path_absolute(self.assets),
            natives: make_path_absolute(self.natives),
            mods: make_path_absolute(self.mods),
        })
    }

    pub fn version_dir(&self, version_id: &str) -> PathBuf {
        self.versions.join(version_id)
    }

    pub fn manifest_file(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id).join(format!("{version_id}.json"))
    }

    pub fn version_jar_file(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id).join(format!("{version_id}.jar"))
    }

    pub fn library(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.libraries.join(relative)
    }

    pub fn indexes_dir(&self) -> PathBuf {
        self.assets.join("indexes")
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.assets.join("objects")
    }

    pub fn asset_index_file(&self, asset_index_id: &str) -> PathBuf {
        self.indexes_dir().join(format!("{asset_index_id}.json"))
    }

    pub fn asset_object(&self, hash: &str) -> PathBuf {
        self.objects_dir().join(hash_prefix(hash)).join(hash)
    }

    pub fn natives_dir(&self, version_id: &str) -> PathBuf {
        self.natives.join(version_id)
    }

    pub fn mod_file(&self, file_name: &str) -> PathBuf {
        self.mods.join(file_name)
    }

    pub fn profiles_file(&self) -> PathBuf {
        self.game.join(PROFILES_FILE)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.game.join(SETTINGS_CONFIG)
    }
}

/// First two characters of an asset hash, used as the object's directory.
pub fn hash_prefix(hash: &str) -> &str {
    hash.get(..2).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_test() {
        let paths = GamePaths::new("/games/mc");

        assert_eq!(paths.manifest_file("1.20.4"), PathBuf::from("/games/mc/versions/1.20.4/1.20.4.json"));
        assert_eq!(paths.version_jar_file("1.20.4"), PathBuf::from("/games/mc/versions/1.20.4/1.20.4.jar"));
        assert_eq!(paths.asset_index_file("12"), PathBuf::from("/games/mc/assets/indexes/12.json"));
        assert_eq!(
            paths.asset_object("bdf48ef6b5d0d23bbb02e17d04865216179f510a"),
            PathBuf::from("/games/mc/assets/objects/bd/bdf48ef6b5d0d23bbb02e17d04865216179f510a")
        );
        assert_eq!(paths.natives_dir("1.20.4"), PathBuf::from("/games/mc/natives/1.20.4"));
    }

    #[test]
    fn short_hash_prefix() {
        assert_eq!(hash_prefix("a"), "a");
    }
}
