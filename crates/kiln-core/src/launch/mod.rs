use std::{marker::PhantomData, path::PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    game_paths::GamePaths,
    repository::{fabric_profile::FabricProfile, java_runner::JavaRunner, manifest::Manifest, username::Username},
    DEFAULT_MEMORY_GB, KILN_NAME, KILN_VERSION, OFFLINE_ACCESS_TOKEN,
};

use self::classpath::ClasspathSpec;

pub mod classpath;
pub mod rules;

pub enum Undefined {}
pub enum WithClasspath {}

/// Process invocation that starts the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub classpath: ClasspathSpec,
}

impl CommandSpec {
    pub fn main_class(&self) -> &str {
        &self.classpath.main_class
    }

    pub fn command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.executable);
        command.args(&self.args).current_dir(&self.working_dir);
        command
    }

    /// Starts the game in its directory. The child is not supervised.
    pub fn spawn(&self) -> Result<tokio::process::Child> {
        std::fs::create_dir_all(&self.working_dir).map_err(|err| Error::io(&self.working_dir, err))?;

        let child = self.command().spawn().map_err(|err| Error::io(&self.executable, err))?;

        info!(pid = child.id(), main_class = self.main_class(), "Game started");

        Ok(child)
    }
}

/// Heap flags for `memory_gb`. The minimum heap is half of it, rounded down,
/// and is left out when that would be zero.
pub fn heap_flags(memory_gb: u32) -> Vec<String> {
    let mut flags = vec![format!("-Xmx{memory_gb}G")];

    let min = memory_gb / 2;
    if min > 0 {
        flags.push(format!("-Xms{min}G"));
    }

    flags
}

/// Builds the [`CommandSpec`] of one launch. Performs no I/O.
pub struct LaunchCommandBuilder<'a, S = Undefined> {
    manifest: &'a Manifest,
    loader: Option<&'a FabricProfile>,
    paths: &'a GamePaths,
    username: Username,
    memory_gb: u32,
    java: JavaRunner,
    uuid: Option<Uuid>,
    classpath: ClasspathSpec,

    _classpath_marker: PhantomData<S>,
}

impl<'a> LaunchCommandBuilder<'a, Undefined> {
    pub fn new(manifest: &'a Manifest, paths: &'a GamePaths) -> Self {
        Self {
            manifest,
            loader: None,
            paths,
            username: Username::default(),
            memory_gb: DEFAULT_MEMORY_GB,
            java: JavaRunner::default(),
            uuid: None,
            classpath: ClasspathSpec::default(),
            _classpath_marker: PhantomData,
        }
    }

    pub fn with_classpath(self, classpath: ClasspathSpec) -> LaunchCommandBuilder<'a, WithClasspath> {
        LaunchCommandBuilder {
            manifest: self.manifest,
            loader: self.loader,
            paths: self.paths,
            username: self.username,
            memory_gb: self.memory_gb,
            java: self.java,
            uuid: self.uuid,
            classpath,
            _classpath_marker: PhantomData,
        }
    }
}

impl<'a, S> LaunchCommandBuilder<'a, S> {
    #[must_use]
    pub fn loader(mut self, loader: Option<&'a FabricProfile>) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn username(mut self, username: Username) -> Self {
        self.username = username;
        self
    }

    #[must_use]
    pub fn memory_gb(mut self, memory_gb: u32) -> Self {
        self.memory_gb = memory_gb;
        self
    }

    #[must_use]
    pub fn java(mut self, java: JavaRunner) -> Self {
        self.java = java;
        self
    }

    /// Session id. A random one is generated when unset.
    #[must_use]
    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }
}

impl LaunchCommandBuilder<'_, WithClasspath> {
    pub fn build(self) -> CommandSpec {
        let natives = self.paths.natives_dir(&self.manifest.id);
        let uuid = self.uuid.unwrap_or_else(Uuid::new_v4);
        let (loader_jvm, loader_game) = self
            .loader
            .map(|profile| (profile.arguments.jvm.as_slice(), profile.arguments.game.as_slice()))
            .unwrap_or_default();
        let version = self.loader.map_or(self.manifest.id.as_str(), |profile| profile.id.as_str());

        let mut args = heap_flags(self.memory_gb);
        args.extend(loader_jvm.iter().cloned());
        args.extend([
            format!("-Djava.library.path={}", natives.display()),
            format!("-Dminecraft.launcher.brand={KILN_NAME}"),
            format!("-Dminecraft.launcher.version={KILN_VERSION}"),
            "-cp".to_owned(),
            self.classpath.joined(),
            self.classpath.main_class.clone(),
        ]);

        args.extend(
            [
                ("--username", self.username.get().to_owned()),
                ("--version", version.to_owned()),
                ("--gameDir", self.paths.game.display().to_string()),
                ("--assetsDir", self.paths.assets.display().to_string()),
                ("--assetIndex", self.manifest.asset_index.id.clone()),
                ("--uuid", uuid.simple().to_string()),
                ("--accessToken", OFFLINE_ACCESS_TOKEN.to_owned()),
                ("--userType", "legacy".to_owned()),
            ]
            .into_iter()
            .flat_map(|(name, value)| [name.to_owned(), value]),
        );
        args.extend(loader_game.iter().cloned());

        CommandSpec {
            executable: PathBuf::from(self.java.get()),
            args,
            working_dir: self.paths.game.clone(),
            classpath: self.classpath,
        }
    }
}
