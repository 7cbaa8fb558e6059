use std::path::{Path, PathBuf};

use crate::loaders::plan::TaskKind;

use super::{fetcher::FetchOutcome, progress::ProgressSender};

/// Outcome of one file download, tagged with what was being downloaded.
#[derive(Debug)]
pub struct DownloadResult {
    pub kind: TaskKind,
    pub name: String,
    pub path: PathBuf,
    pub outcome: FetchOutcome,
}

#[async_trait::async_trait]
pub trait Downloadable: Send + Sync {
    type Out: Send;

    async fn download(self: Box<Self>) -> Self::Out;
}

const _: Option<Box<dyn Downloadable<Out = DownloadResult>>> = None;

/// What a download writes. Lets a set report tasks that never returned.
pub trait Target {
    fn kind(&self) -> TaskKind;
    fn name(&self) -> &str;
    fn path(&self) -> &Path;
}

#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    type Data: Send;

    /// Returns the number of items to download
    fn total(&self) -> u32;
    async fn download(self: Box<Self>, sender: &dyn ProgressSender<Self::Data>);
}

const _: Option<Box<dyn Downloader<Data = DownloadResult>>> = None;

#[async_trait::async_trait]
impl<T> Downloader for T
where
    T: Downloadable,
{
    type Data = T::Out;

    fn total(&self) -> u32 {
        1
    }

    async fn download(self: Box<Self>, sender: &dyn ProgressSender<Self::Data>) {
        let result = Downloadable::download(self).await;
        sender.update(result).await;
    }
}
