use std::{path::Path, sync::Arc};

use kiln_core::{
    configs::Settings,
    game_paths::GamePaths,
    installer::Installer,
    profiles::{Profile, ProfileStore},
};
use kiln_modding::ModrinthRegistry;
use tracing::warn;

use crate::{
    args::{Cli, Command},
    error::Error,
};

mod catalog;
mod install;
mod profiles;

pub async fn process_args(args: &Cli) -> anyhow::Result<()> {
    let env = Env::load(&args.game_dir).await?;

    match &args.command {
        Command::Install { profile } => install::install(&env, profile).await,
        Command::Launch { profile, offline } => install::launch(&env, profile, *offline).await,
        Command::Versions { snapshots } => catalog::versions(&env, *snapshots).await,
        Command::Search {
            query,
            game_version,
            loader,
        } => catalog::search(&env, query, game_version, *loader).await,
        Command::Profiles(command) => profiles::process(&env, command).await,
    }
}

/// Game directory and launcher settings shared by all commands.
pub(crate) struct Env {
    pub paths: GamePaths,
    pub settings: Settings,
}

impl Env {
    async fn load(game_dir: &Path) -> anyhow::Result<Self> {
        if !game_dir.is_absolute() {
            warn!("`GAME_DIR` is not absolute. Adding to the current dir");
        }

        let paths = GamePaths::new(game_dir).make_absolute()?;
        let settings = Settings::load_or_default(paths.settings_file()).await?;

        Ok(Self { paths, settings })
    }

    pub fn installer(&self) -> anyhow::Result<Installer> {
        let client = self.settings.http_client()?;
        let registry = ModrinthRegistry::from_settings(client.clone(), &self.settings);

        Ok(Installer::new(client, self.settings.clone()).with_registry(Arc::new(registry)))
    }

    pub fn registry(&self) -> anyhow::Result<ModrinthRegistry> {
        Ok(ModrinthRegistry::from_settings(self.settings.http_client()?, &self.settings))
    }

    pub async fn profiles(&self) -> anyhow::Result<ProfileStore> {
        Ok(ProfileStore::load(self.paths.profiles_file()).await?)
    }
}

pub(crate) fn find_profile(store: &ProfileStore, name: &str) -> anyhow::Result<Profile> {
    store
        .get(name)
        .cloned()
        .ok_or_else(|| Error::NoSuchProfile(name.to_owned()).into())
}
