//! Drives one installation from metadata to a ready launch command.
//!
//! The run is a fixed sequence of [`InstallState`]s. Failures of single
//! libraries, natives, assets or mods are recorded as [`Degradation`]s and
//! the run continues. Only metadata fetches and the client jar are fatal.

use std::{
    fmt::Display,
    path::{Component, Path},
    sync::Arc,
};

use futures_util::FutureExt;
use reqwest::Client;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    configs::Settings,
    downloads::{
        downloaders::{assets::SyncReport, AssetSynchronizer, DownloadSet},
        fetcher::{is_valid, verify, FetchOutcome, Fetcher},
        traits::{DownloadResult, Downloader},
    },
    error::{Error, ErrorKind, Result},
    game_paths::GamePaths,
    launch::{
        classpath::{self, ClasspathSpec},
        CommandSpec, LaunchCommandBuilder,
    },
    loaders::{
        plan::{DownloadTask, InstallationPlan, TaskKind},
        plan_loader, plan_vanilla,
    },
    meta::MetaClient,
    mods::{ModRegistry, PackageVersion},
    natives,
    platform::OsName,
    profiles::{Loader, Profile},
    repository::{assets::AssetIndex, fabric_profile::FabricProfile, manifest::Manifest},
    FABRIC_API_SLUG,
};

use self::{
    guard::{ActiveSet, FlightGuard},
    progress::{StageProgress, TaskProgress},
};

pub mod context;
pub mod guard;
pub mod progress;

pub use context::InstallationContext;
pub use progress::ProgressEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallState {
    Idle,
    PlanningVanilla,
    DownloadingVanilla,
    ExtractingNatives,
    SyncingAssets,
    InstallingLoader,
    InstallingLoaderMods,
    AssemblingClasspath,
    Ready,
    Failed,
}

impl InstallState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PlanningVanilla => "planning",
            Self::DownloadingVanilla => "downloading game files",
            Self::ExtractingNatives => "extracting natives",
            Self::SyncingAssets => "syncing assets",
            Self::InstallingLoader => "installing loader",
            Self::InstallingLoaderMods => "installing mods",
            Self::AssemblingClasspath => "assembling classpath",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl Display for InstallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("an installation of `{0}` is already running")]
    AlreadyRunning(String),

    #[error("{state} failed: {source}")]
    Stage {
        state: InstallState,
        #[source]
        source: Error,
    },
}

impl InstallError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::AlreadyRunning(_) => None,
            Self::Stage { source, .. } => Some(source.kind()),
        }
    }
}

/// A non-fatal failure that left the installation incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degradation {
    pub stage: InstallState,
    pub name: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Successful result of [`Installer::install`].
#[derive(Debug)]
pub struct Installation {
    pub command: CommandSpec,
    pub plan: InstallationPlan,
    pub degraded: Vec<Degradation>,
    pub assets: SyncReport,
}

impl Installation {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty() || !self.assets.is_complete()
    }
}

/// Installs profiles into a game directory and builds their launch commands.
///
/// Clones share the single-flight state: at most one run per profile name is
/// active across all of them.
#[derive(Clone)]
pub struct Installer {
    client: Client,
    settings: Settings,
    os: OsName,
    registry: Option<Arc<dyn ModRegistry>>,
    active: ActiveSet,
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("settings", &self.settings)
            .field("os", &self.os)
            .field("registry", &self.registry.is_some())
            .finish_non_exhaustive()
    }
}

impl Installer {
    pub fn new(client: Client, settings: Settings) -> Self {
        Self {
            client,
            settings,
            os: OsName::current(),
            registry: None,
            active: ActiveSet::default(),
        }
    }

    /// Installer with an HTTP client configured from `settings`.
    pub fn from_settings(settings: Settings) -> reqwest::Result<Self> {
        let client = settings.http_client()?;
        Ok(Self::new(client, settings))
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn ModRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Plans for another platform than the running one.
    #[must_use]
    pub fn with_os(mut self, os: OsName) -> Self {
        self.os = os;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn meta(&self, paths: &GamePaths) -> MetaClient {
        MetaClient::new(self.client.clone(), self.settings.endpoints.clone()).with_cache(paths.clone())
    }

    fn fetcher(&self) -> Fetcher {
        self.settings.fetcher(self.client.clone())
    }

    #[tracing::instrument(skip_all, fields(profile = %profile.name, version = %profile.version), err)]
    pub async fn install(&self, profile: &Profile, ctx: &InstallationContext) -> Result<Installation, InstallError> {
        let Some(_guard) = FlightGuard::acquire(&self.active, &profile.name) else {
            warn!("Installation is already running");
            return Err(InstallError::AlreadyRunning(profile.name.clone()));
        };

        let mut run = Run {
            installer: self,
            profile,
            ctx,
            meta: self.meta(&ctx.paths),
            fetcher: self.fetcher(),
            progress: StageProgress::new(ctx.progress.clone()),
            degraded: Vec::new(),
        };

        let result = run.execute().boxed().await;
        let progress = run.progress;

        match &result {
            Ok(installation) => {
                info!(degraded = installation.degraded.len(), "Installation finished");
                progress.report(InstallState::Ready, "Ready", Some(1.0)).await;
            }
            Err(err) => {
                error!("Installation failed: {err}");
                progress.report(InstallState::Failed, format!("Failed: {err}"), None).await;
            }
        }

        result
    }

    /// Runs [`Self::install`] as a background task.
    pub fn spawn(&self, profile: Profile, ctx: InstallationContext) -> JoinHandle<Result<Installation, InstallError>> {
        tokio::spawn(self.clone().install_owned(profile, ctx))
    }

    async fn install_owned(self, profile: Profile, ctx: InstallationContext) -> Result<Installation, InstallError> {
        self.install(&profile, &ctx).await
    }

    /// Like [`Self::spawn`] with a fresh progress channel.
    pub fn spawn_with_channel(
        &self,
        profile: Profile,
        paths: GamePaths,
    ) -> (JoinHandle<Result<Installation, InstallError>>, UnboundedReceiver<ProgressEvent>) {
        let (ctx, receiver) = InstallationContext::channel(paths);
        (self.spawn(profile, ctx), receiver)
    }

    /// Rebuilds the launch command from cached metadata without any network access.
    #[tracing::instrument(skip_all, fields(profile = %profile.name), err)]
    pub async fn prepare_offline(&self, profile: &Profile, paths: &GamePaths) -> Result<Installation> {
        let meta = self.meta(paths);

        let manifest = meta.read_cached_descriptor(&profile.version).await?;
        let loader = match profile.loader {
            Loader::Fabric => Some(meta.read_cached_loader_profile(&profile.version).await?),
            Loader::Vanilla | Loader::Forge => None,
        };

        let (plan, command) = self.assemble(profile, &manifest, loader.as_ref(), paths);
        info!(entries = plan.classpath.entries.len(), "Offline launch prepared");

        Ok(Installation {
            command,
            plan,
            degraded: Vec::new(),
            assets: SyncReport::default(),
        })
    }

    fn assemble(
        &self,
        profile: &Profile,
        manifest: &Manifest,
        loader: Option<&FabricProfile>,
        paths: &GamePaths,
    ) -> (InstallationPlan, CommandSpec) {
        let classpath: ClasspathSpec = classpath::assemble(manifest, loader, paths, self.os);

        let command = LaunchCommandBuilder::new(manifest, paths)
            .loader(loader)
            .username(self.settings.username.clone())
            .memory_gb(profile.memory_gb)
            .java(self.settings.java.clone())
            .with_classpath(classpath.clone())
            .build();

        let plan = InstallationPlan {
            version_id: manifest.id.clone(),
            classpath,
            natives_dir: paths.natives_dir(&manifest.id),
            asset_index_id: manifest.asset_index.id.clone(),
        };

        (plan, command)
    }
}

/// State of one [`Installer::install`] call.
struct Run<'a> {
    installer: &'a Installer,
    profile: &'a Profile,
    ctx: &'a InstallationContext,
    meta: MetaClient,
    fetcher: Fetcher,
    progress: StageProgress,
    degraded: Vec<Degradation>,
}

fn stage(state: InstallState) -> impl FnOnce(Error) -> InstallError {
    move |source| InstallError::Stage { state, source }
}

impl Run<'_> {
    fn paths(&self) -> &GamePaths {
        &self.ctx.paths
    }

    async fn enter(&self, state: InstallState, message: impl Into<String>, fraction: f32) {
        let message = message.into();
        info!(state = %state, "{message}");
        self.progress.report(state, message, Some(fraction)).await;
    }

    fn degrade(&mut self, stage: InstallState, name: impl Into<String>, kind: ErrorKind, message: impl Into<String>) {
        let degradation = Degradation {
            stage,
            name: name.into(),
            kind,
            message: message.into(),
        };
        warn!(stage = %stage, name = %degradation.name, kind = %kind, "{}", degradation.message);
        self.degraded.push(degradation);
    }

    async fn execute(&mut self) -> Result<Installation, InstallError> {
        let os = self.installer.os;
        let profile = self.profile;
        let version = profile.version.as_str();

        self.enter(InstallState::PlanningVanilla, format!("Resolving {version}"), 0.0).await;
        let plan = plan_vanilla(&self.meta, version, self.paths(), os)
            .await
            .map_err(stage(InstallState::PlanningVanilla))?;
        let manifest = plan.manifest;

        self.enter(InstallState::DownloadingVanilla, "Downloading game files", 0.05).await;
        let results = self.download(InstallState::DownloadingVanilla, plan.tasks, (0.05, 0.5)).await;
        let succeeded = self.check(InstallState::DownloadingVanilla, results)?;

        self.enter(InstallState::ExtractingNatives, "Extracting natives", 0.5).await;
        self.extract_natives(&manifest, &succeeded).await;

        self.enter(InstallState::SyncingAssets, "Downloading assets", 0.55).await;
        let index_ready = succeeded.iter().any(|result| result.kind == TaskKind::AssetIndex);
        let assets = self.sync_assets(&manifest, index_ready).await;

        let loader = match profile.loader {
            Loader::Vanilla => None,
            Loader::Forge => {
                warn!("Forge is not supported. Launching as vanilla");
                None
            }
            Loader::Fabric => {
                let profile = self.install_loader(version).await?;
                self.install_mods().await;
                Some(profile)
            }
        };

        self.enter(InstallState::AssemblingClasspath, "Assembling classpath", 0.97).await;
        let (plan, command) = self.installer.assemble(profile, &manifest, loader.as_ref(), self.paths());

        Ok(Installation {
            command,
            plan,
            degraded: std::mem::take(&mut self.degraded),
            assets,
        })
    }

    async fn download(&self, state: InstallState, tasks: Vec<DownloadTask>, range: (f32, f32)) -> Vec<DownloadResult> {
        let tracker = TaskProgress::new(&self.progress, state, range, tasks.len());

        let set = DownloadSet::from_tasks(tasks, &self.fetcher).with_concurrency(self.installer.settings.concurrency);
        Box::new(set).download(&tracker).await;

        tracker.into_results()
    }

    /// Splits off failures. A failed fatal task ends the run.
    fn check(&mut self, state: InstallState, results: Vec<DownloadResult>) -> Result<Vec<DownloadResult>, InstallError> {
        let mut succeeded = Vec::with_capacity(results.len());

        for result in results {
            match result.outcome {
                FetchOutcome::Failed(err) if result.kind.is_fatal() => {
                    return Err(InstallError::Stage { state, source: err });
                }
                FetchOutcome::Failed(err) => {
                    self.degrade(state, format!("{} {}", result.kind.as_str(), result.name), err.kind(), err.to_string());
                }
                FetchOutcome::Cached | FetchOutcome::Downloaded => succeeded.push(result),
            }
        }

        Ok(succeeded)
    }

    async fn extract_natives(&mut self, manifest: &Manifest, downloaded: &[DownloadResult]) {
        let target = self.paths().natives_dir(&manifest.id);
        if let Err(err) = tokio::fs::create_dir_all(&target).await {
            let err = Error::io(&target, err);
            self.degrade(InstallState::ExtractingNatives, target.display().to_string(), err.kind(), err.to_string());
            return;
        }

        let archives = downloaded
            .iter()
            .filter(|result| result.kind == TaskKind::Native)
            .map(|result| result.path.clone())
            .collect::<Vec<_>>();

        let mut extracted = 0;
        for archive in archives {
            extracted += natives::extract(&archive, &target, self.installer.os).await;
        }

        debug!(extracted, "Natives ready");
    }

    async fn sync_assets(&mut self, manifest: &Manifest, index_ready: bool) -> SyncReport {
        if !index_ready {
            warn!("Asset index is missing. Skipping assets");
            return SyncReport::default();
        }

        let index_path = self.paths().asset_index_file(&manifest.asset_index.id);
        let index = match AssetIndex::read(&index_path).await {
            Ok(index) => index,
            Err(err) => {
                self.degrade(InstallState::SyncingAssets, index_path.display().to_string(), err.kind(), err.to_string());
                return SyncReport::default();
            }
        };

        let settings = &self.installer.settings;
        let synchronizer = AssetSynchronizer::new(self.fetcher.clone(), self.paths().objects_dir())
            .with_resources_url(settings.endpoints.resources.clone())
            .with_concurrency(settings.concurrency);

        let pending = synchronizer.pending(&index, settings.asset_download_limit).await;
        let tracker = TaskProgress::new(&self.progress, InstallState::SyncingAssets, (0.55, 0.8), pending.len()).counting_only();
        let mut report = pending.download(&tracker).await;

        if report.deferred > 0 {
            info!(deferred = report.deferred, "Some assets are left for the next run");
        }

        for failure in std::mem::take(&mut report.failures) {
            self.degrade(InstallState::SyncingAssets, failure.name.clone(), failure.kind, failure.message.clone());
            report.failures.push(failure);
        }

        report
    }

    async fn install_loader(&mut self, version: &str) -> Result<FabricProfile, InstallError> {
        self.enter(InstallState::InstallingLoader, "Installing Fabric", 0.8).await;

        let plan = plan_loader(&self.meta, version, None, self.paths())
            .await
            .map_err(stage(InstallState::InstallingLoader))?;

        let results = self.download(InstallState::InstallingLoader, plan.tasks, (0.8, 0.9)).await;
        self.check(InstallState::InstallingLoader, results)?;

        Ok(plan.profile)
    }

    async fn install_mods(&mut self) {
        let profile = self.profile;

        let mut wanted = Vec::new();
        if profile.fabric_api && !profile.mods.iter().any(|m| m.slug == FABRIC_API_SLUG) {
            wanted.push((None, FABRIC_API_SLUG.to_owned()));
        }
        for entry in &profile.mods {
            let installed = entry.filename.as_deref().is_some_and(|file| self.paths().mod_file(file).exists());
            if installed {
                debug!(name = %entry.name, "Mod is already installed");
            } else {
                wanted.push((Some(entry.name.clone()), entry.slug.clone()));
            }
        }

        if wanted.is_empty() {
            return;
        }

        let Some(registry) = self.installer.registry.clone() else {
            warn!(mods = wanted.len(), "No mod registry configured. Skipping mods");
            return;
        };

        let total = wanted.len();
        for (i, (name, slug)) in wanted.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let fraction = 0.9 + 0.07 * (i as f32 / total as f32);
            self.enter(InstallState::InstallingLoaderMods, format!("Installing mod {slug}"), fraction)
                .await;

            match install_mod(registry.as_ref(), &slug, &profile.version, &self.ctx.paths.mods).await {
                Ok(filename) => {
                    info!(slug = %slug, filename = %filename, "Mod installed");
                    if let Some(name) = name {
                        self.record_filename(&name, &filename).await;
                    }
                }
                Err(err) => {
                    let kind = err.downcast_ref::<Error>().map_or(ErrorKind::Network, Error::kind);
                    self.degrade(InstallState::InstallingLoaderMods, slug, kind, format!("{err:#}"));
                }
            }
        }
    }

    async fn record_filename(&self, name: &str, filename: &str) {
        let Some(store) = &self.ctx.profiles else {
            return;
        };

        if let Err(err) = store.lock().await.set_mod_filename(&self.profile.name, name, filename).await {
            warn!("Cannot record mod file: {err}");
        }
    }
}

async fn install_mod(registry: &dyn ModRegistry, slug: &str, game_version: &str, mods_dir: &Path) -> anyhow::Result<String> {
    let versions = registry.list_versions(slug, game_version, Loader::Fabric).await?;

    let file = versions
        .first()
        .and_then(PackageVersion::primary_file)
        .ok_or_else(|| Error::NotFound(format!("{slug} for {game_version}")))?;

    let dest = mods_dir.join(mod_file_name(&file.filename)?);
    let sha1 = file.sha1.as_deref();
    if is_valid(&dest, sha1).await {
        return Ok(file.filename.clone());
    }

    registry.download(file, &dest).await?;

    if let Some(expected) = sha1 {
        if let Err(err) = verify(&dest, expected).await {
            let _ = tokio::fs::remove_file(&dest).await;
            return Err(err.into());
        }
    }

    Ok(file.filename.clone())
}

/// Accepts a registry file name only if it stays inside the mods directory.
fn mod_file_name(filename: &str) -> Result<&Path> {
    let path = Path::new(filename);
    let mut components = path.components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(path),
        _ => Err(Error::Format {
            origin: "mod registry".to_owned(),
            path: filename.to_owned(),
            message: "file name is not a single path component".to_owned(),
        }),
    }
}
