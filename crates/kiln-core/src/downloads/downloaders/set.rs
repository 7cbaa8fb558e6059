use std::{fmt::Debug, path::PathBuf, sync::Arc};

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::error;

use crate::{
    downloads::{
        fetcher::{FetchOutcome, Fetcher},
        progress::ProgressSender,
        traits::{DownloadResult, Downloadable, Downloader, Target},
    },
    error::Error,
    loaders::plan::{DownloadTask, TaskKind},
};

use super::file::FileDownloader;

pub const DEFAULT_CONCURRENCY: usize = 16;

/// Downloader that starts downloading all provided [`Downloadable`] elements
/// when [`Downloader::download`] is called, at most `concurrency` at a time.
///
/// Every element is reported exactly once. One whose task panics or is
/// cancelled is reported as failed.
pub struct DownloadSet {
    set: Vec<(Label, Box<dyn Downloadable<Out = DownloadResult>>)>,
    concurrency: usize,
}

struct Label {
    kind: TaskKind,
    name: String,
    path: PathBuf,
}

impl Label {
    fn lost(self) -> DownloadResult {
        let source = std::io::Error::other("download task did not finish");
        DownloadResult {
            outcome: FetchOutcome::Failed(Error::io(&self.path, source)),
            kind: self.kind,
            name: self.name,
            path: self.path,
        }
    }
}

impl Default for DownloadSet {
    fn default() -> Self {
        Self {
            set: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Debug for DownloadSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadSet")
            .field("len", &self.set.len())
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl DownloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = DownloadTask>, fetcher: &Fetcher) -> Self {
        let mut set = Self::new();
        for task in tasks {
            set.add(Box::new(FileDownloader::from_task(task, fetcher)));
        }
        set
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn add<D>(&mut self, downloader: Box<D>) -> &mut Self
    where
        D: Downloadable<Out = DownloadResult> + Target + 'static,
    {
        let label = Label {
            kind: downloader.kind(),
            name: downloader.name().to_owned(),
            path: downloader.path().to_path_buf(),
        };
        self.set.push((label, downloader));
        self
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

#[async_trait::async_trait]
impl Downloader for DownloadSet {
    type Data = DownloadResult;

    fn total(&self) -> u32 {
        self.set.len() as u32
    }

    async fn download(self: Box<Self>, sender: &dyn ProgressSender<Self::Data>) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();
        let mut labels = Vec::with_capacity(self.set.len());

        for (index, (label, downloader)) in self.set.into_iter().enumerate() {
            labels.push(Some(label));
            let semaphore = semaphore.clone();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, downloader.download().await)
            });
        }

        while let Some(result) = set.join_next().await {
            match result {
                Ok((index, download_result)) => {
                    labels[index] = None;
                    sender.update(download_result).await;
                }
                Err(join_error) => error!("Download task did not finish: {join_error}"),
            }
        }

        let lost = labels.into_iter().flatten().collect::<Vec<_>>();
        for label in lost {
            sender.update(label.lost()).await;
        }
    }
}
