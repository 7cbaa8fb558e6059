use std::{
    fmt::Debug,
    sync::{atomic::AtomicBool, Arc},
};

use tokio::sync::{mpsc::UnboundedReceiver, Mutex};
use typed_builder::TypedBuilder;

use crate::{
    downloads::progress::{NoProgress, ProgressSender},
    game_paths::GamePaths,
    profiles::ProfileStore,
};

use super::progress::ProgressEvent;

/// State handed to one installation run.
#[derive(TypedBuilder)]
pub struct InstallationContext {
    #[builder(default = Arc::new(NoProgress) as Arc<dyn ProgressSender<ProgressEvent>>)]
    pub progress: Arc<dyn ProgressSender<ProgressEvent>>,

    pub paths: GamePaths,

    /// Receives the file names of mods downloaded during the run.
    #[builder(default, setter(strip_option))]
    pub profiles: Option<Arc<Mutex<ProfileStore>>>,

    /// Reserved. Runs are not cancellable yet and never read it.
    #[builder(default)]
    pub cancel: Arc<AtomicBool>,
}

impl InstallationContext {
    /// Context whose progress events can be drained from the returned receiver.
    pub fn channel(paths: GamePaths) -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();

        let context = Self::builder().progress(Arc::new(sender)).paths(paths).build();

        (context, receiver)
    }
}

impl Debug for InstallationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationContext")
            .field("paths", &self.paths)
            .field("profiles", &self.profiles.is_some())
            .finish_non_exhaustive()
    }
}
