use std::path::{Path, PathBuf};

use crate::{
    downloads::{
        fetcher::Fetcher,
        traits::{DownloadResult, Downloadable, Target},
    },
    loaders::plan::{DownloadTask, TaskKind},
};

#[derive(Debug)]
pub struct FileDownloader {
    kind: TaskKind,
    name: String,
    url: String,
    path: PathBuf,
    sha1: Option<String>,
    fetcher: Fetcher,
}

impl FileDownloader {
    pub fn new(fetcher: Fetcher, kind: TaskKind, name: String, url: String, path: PathBuf) -> Self {
        Self {
            kind,
            name,
            url,
            path,
            sha1: None,
            fetcher,
        }
    }

    #[must_use]
    pub fn with_sha1(mut self, sha1: Option<String>) -> Self {
        self.sha1 = sha1;
        self
    }

    pub fn from_task(task: DownloadTask, fetcher: &Fetcher) -> Self {
        Self::new(fetcher.clone(), task.kind, task.name, task.url, task.path).with_sha1(task.sha1)
    }
}

#[async_trait::async_trait]
impl Downloadable for FileDownloader {
    type Out = DownloadResult;

    async fn download(self: Box<Self>) -> Self::Out {
        let Self {
            kind,
            name,
            url,
            path,
            sha1,
            fetcher,
        } = *self;

        let outcome = fetcher.fetch(&url, &path, sha1.as_deref()).await;

        DownloadResult { kind, name, path, outcome }
    }
}

impl Target for FileDownloader {
    fn kind(&self) -> TaskKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
