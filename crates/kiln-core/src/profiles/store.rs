use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::fs::write_json_config;

use super::{Loader, ModRef, Profile};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile `{0}` already exists")]
    AlreadyExists(String),

    #[error("profile `{0}` does not exist")]
    NotFound(String),

    #[error("profile `{0}` cannot be deleted")]
    Protected(String),

    #[error("profile `{profile}` has no mod `{name}`")]
    ModNotFound { profile: String, name: String },

    #[error("cannot save profiles: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// Profiles keyed by name, stored as one JSON document.
///
/// Every mutation is written to disk before it returns.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

impl ProfileStore {
    /// Reads the store at `path`. A missing, unreadable or empty store
    /// starts over with the default profile.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, ProfileError> {
        let path = path.into();

        let profiles = match tokio::fs::read(&path).await {
            Ok(bytes) => match crate::fs::parse_json::<BTreeMap<String, Profile>>(&path.display().to_string(), &bytes) {
                Ok(profiles) => profiles,
                Err(err) => {
                    warn!("Profiles are unreadable, starting over: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path.display(), "Cannot read profiles, starting over: {err}");
                BTreeMap::new()
            }
        };

        let mut store = Self { path, profiles };

        if store.profiles.is_empty() {
            debug!("Creating the default profile");
            let profile = Profile::default();
            store.profiles.insert(profile.name.clone(), profile);
            store.save().await?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self) -> Result<(), ProfileError> {
        write_json_config(&self.profiles, &self.path).await?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    pub async fn create(&mut self, name: &str, version: &str, loader: Loader) -> Result<&Profile, ProfileError> {
        if self.profiles.contains_key(name) {
            return Err(ProfileError::AlreadyExists(name.to_owned()));
        }

        self.profiles.insert(name.to_owned(), Profile::new(name, version, loader));
        self.save().await?;

        self.get(name).ok_or_else(|| ProfileError::NotFound(name.to_owned()))
    }

    pub async fn delete(&mut self, name: &str) -> Result<Profile, ProfileError> {
        if self.get(name).is_some_and(Profile::is_default) {
            return Err(ProfileError::Protected(name.to_owned()));
        }

        let profile = self
            .profiles
            .remove(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_owned()))?;
        self.save().await?;

        Ok(profile)
    }

    /// Adds `entry` unless the profile already has a mod with that name.
    /// Returns whether the mod was added.
    pub async fn add_mod(&mut self, profile: &str, entry: ModRef) -> Result<bool, ProfileError> {
        let target = self.get_mut(profile)?;
        if target.find_mod(&entry.name).is_some() {
            return Ok(false);
        }

        target.mods.push(entry);
        self.save().await?;

        Ok(true)
    }

    /// Returns whether a mod was removed.
    pub async fn remove_mod(&mut self, profile: &str, name: &str) -> Result<bool, ProfileError> {
        let target = self.get_mut(profile)?;
        let before = target.mods.len();
        target.mods.retain(|m| m.name != name);

        if target.mods.len() == before {
            return Ok(false);
        }

        self.save().await?;
        Ok(true)
    }

    /// Applies `edit` to the profile. The name cannot be changed this way.
    pub async fn update(&mut self, name: &str, edit: impl FnOnce(&mut Profile)) -> Result<&Profile, ProfileError> {
        let target = self.get_mut(name)?;
        edit(target);
        name.clone_into(&mut target.name);

        self.save().await?;
        self.get(name).ok_or_else(|| ProfileError::NotFound(name.to_owned()))
    }

    pub async fn set_mod_filename(&mut self, profile: &str, name: &str, filename: &str) -> Result<(), ProfileError> {
        let target = self.get_mut(profile)?;
        let entry = target
            .mods
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| ProfileError::ModNotFound {
                profile: profile.to_owned(),
                name: name.to_owned(),
            })?;

        entry.filename = Some(filename.to_owned());
        self.save().await
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Profile, ProfileError> {
        self.profiles
            .get_mut(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_owned()))
    }
}
