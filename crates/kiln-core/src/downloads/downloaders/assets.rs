use std::path::PathBuf;

use futures_util::{stream, StreamExt};
use itertools::Itertools;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{
    downloads::{
        fetcher::{is_valid, Fetcher, FetchOutcome},
        progress::{NoProgress, ProgressSender},
        downloaders::set::{DownloadSet, DEFAULT_CONCURRENCY},
        traits::{DownloadResult, Downloader},
    },
    error::ErrorKind,
    game_paths::hash_prefix,
    loaders::plan::TaskKind,
    repository::assets::{AssetIndex, AssetObject},
    RESOURCES_URL,
};

use super::file::FileDownloader;

/// Counts of one [`AssetSynchronizer::sync`] run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Objects that were already valid on disk.
    pub skipped: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// Objects left for a later run because of the download limit.
    pub deferred: usize,
    pub failures: Vec<AssetFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    pub name: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl SyncReport {
    pub fn total(&self) -> usize {
        self.skipped + self.downloaded + self.failed + self.deferred
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.deferred == 0
    }
}

/// Expands an asset index into content-addressed object downloads.
///
/// Objects already valid on disk are never downloaded again, so running a
/// sync again after an interrupted one only fetches what is still missing.
#[derive(Debug, Clone)]
pub struct AssetSynchronizer {
    fetcher: Fetcher,
    objects: PathBuf,
    resources_url: String,
    concurrency: usize,
}

impl AssetSynchronizer {
    pub fn new(fetcher: Fetcher, objects: PathBuf) -> Self {
        Self {
            fetcher,
            objects,
            resources_url: RESOURCES_URL.to_owned(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_resources_url(mut self, url: impl Into<String>) -> Self {
        self.resources_url = url.into();
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn object_path(&self, hash: &str) -> PathBuf {
        self.objects.join(hash_prefix(hash)).join(hash)
    }

    pub fn object_url(&self, hash: &str) -> String {
        format!("{}/{}/{hash}", self.resources_url.trim_end_matches('/'), hash_prefix(hash))
    }

    pub async fn sync(&self, index: &AssetIndex, limit: Option<usize>) -> SyncReport {
        self.sync_with_progress(index, limit, &NoProgress).await
    }

    /// Downloads every missing object of `index`.
    ///
    /// `limit` caps how many objects are downloaded in this run. Objects that
    /// are already valid never count against it.
    pub async fn sync_with_progress(
        &self,
        index: &AssetIndex,
        limit: Option<usize>,
        sender: &dyn ProgressSender<DownloadResult>,
    ) -> SyncReport {
        self.pending(index, limit).await.download(sender).await
    }

    /// Checks which objects of `index` are missing and prepares their downloads.
    #[tracing::instrument(skip_all, fields(objects = index.len()))]
    pub async fn pending(&self, index: &AssetIndex, limit: Option<usize>) -> PendingAssets {
        // Several names may point at the same object.
        let unique = index
            .objects
            .iter()
            .unique_by(|(_, object)| object.hash.clone())
            .map(|(name, object)| (name.clone(), object.clone(), self.object_path(&object.hash)))
            .collect_vec();

        let checked = stream::iter(unique)
            .map(|(name, object, path)| async move {
                let valid = is_valid(&path, Some(object.hash.as_str())).await;
                (name, object, valid)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let mut report = SyncReport::default();

        let missing = checked
            .into_iter()
            .filter_map(|(name, object, valid)| {
                if valid {
                    report.skipped += 1;
                    None
                } else {
                    Some((name, object))
                }
            })
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .collect_vec();

        let take = limit.map_or(missing.len(), |limit| limit.min(missing.len()));
        report.deferred = missing.len() - take;

        let mut set = DownloadSet::new().with_concurrency(self.concurrency);
        for (name, object) in missing.into_iter().take(take) {
            set.add(Box::new(self.downloader(&name, &object)));
        }

        PendingAssets { set, report }
    }

    fn downloader(&self, name: &str, object: &AssetObject) -> FileDownloader {
        FileDownloader::new(
            self.fetcher.clone(),
            TaskKind::Asset,
            name.to_owned(),
            self.object_url(&object.hash),
            self.object_path(&object.hash),
        )
        .with_sha1(Some(object.hash.clone()))
    }
}

/// Objects of one sync that still have to be downloaded.
#[derive(Debug)]
pub struct PendingAssets {
    set: DownloadSet,
    report: SyncReport,
}

impl PendingAssets {
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub async fn download(self, sender: &dyn ProgressSender<DownloadResult>) -> SyncReport {
        let collector = Collector {
            inner: sender,
            report: Mutex::new(self.report),
        };
        Box::new(self.set).download(&collector).await;
        let report = collector.report.into_inner();

        info!(
            skipped = report.skipped,
            downloaded = report.downloaded,
            failed = report.failed,
            deferred = report.deferred,
            "Assets synchronized"
        );

        report
    }
}

struct Collector<'a> {
    inner: &'a dyn ProgressSender<DownloadResult>,
    report: Mutex<SyncReport>,
}

#[async_trait::async_trait]
impl ProgressSender<DownloadResult> for Collector<'_> {
    async fn update(&self, data: DownloadResult) {
        {
            let mut report = self.report.lock();
            match &data.outcome {
                FetchOutcome::Cached => report.skipped += 1,
                FetchOutcome::Downloaded => report.downloaded += 1,
                FetchOutcome::Failed(err) => {
                    warn!(asset = %data.name, "Asset download failed: {err}");
                    report.failed += 1;
                    report.failures.push(AssetFailure {
                        name: data.name.clone(),
                        kind: err.kind(),
                        message: err.to_string(),
                    });
                }
            }
        }

        self.inner.update(data).await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::calculate_sha1;

    use super::*;

    fn index(bodies: &[&str]) -> AssetIndex {
        let objects = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                (
                    format!("minecraft/sounds/{i}.ogg"),
                    AssetObject {
                        hash: calculate_sha1(body),
                        size: body.len() as u64,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        AssetIndex { objects }
    }

    async fn mock_objects(server: &mut mockito::Server, bodies: &[&str]) -> Vec<mockito::Mock> {
        let mut mocks = Vec::new();
        for body in bodies {
            let hash = calculate_sha1(body);
            let mock = server
                .mock("GET", format!("/{}/{hash}", &hash[..2]).as_str())
                .with_body(*body)
                .expect(1)
                .create_async()
                .await;
            mocks.push(mock);
        }
        mocks
    }

    #[tokio::test]
    async fn resumes_after_partial_sync() {
        let bodies = ["one", "two", "three", "four", "five"];
        let mut server = mockito::Server::new_async().await;
        let mocks = mock_objects(&mut server, &bodies).await;

        let dir = tempfile::tempdir().unwrap();
        let synchronizer = AssetSynchronizer::new(Fetcher::default(), dir.path().join("objects")).with_resources_url(server.url());
        let index = index(&bodies);

        let first = synchronizer.sync(&index, Some(2)).await;
        assert_eq!((first.skipped, first.downloaded, first.failed, first.deferred), (0, 2, 0, 3));

        let second = synchronizer.sync(&index, None).await;
        assert_eq!((second.skipped, second.downloaded, second.failed, second.deferred), (2, 3, 0, 0));
        assert_eq!(second.skipped + second.downloaded, index.len());

        let third = synchronizer.sync(&index, None).await;
        assert_eq!(third.skipped, index.len());
        assert!(third.is_complete());

        // Every object was requested exactly once across the three runs.
        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_sync() {
        let mut server = mockito::Server::new_async().await;
        mock_objects(&mut server, &["present"]).await;
        let missing = calculate_sha1("missing");
        server.mock("GET", format!("/{}/{missing}", &missing[..2]).as_str()).with_status(500).create_async().await;

        let dir = tempfile::tempdir().unwrap();
        let synchronizer = AssetSynchronizer::new(Fetcher::default(), dir.path().to_path_buf()).with_resources_url(server.url());

        let report = synchronizer.sync(&index(&["present", "missing"]), None).await;

        assert_eq!((report.downloaded, report.failed), (1, 1));
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn pending_leaves_out_present_objects() {
        let bodies = ["one", "two", "three"];
        let mut server = mockito::Server::new_async().await;
        mock_objects(&mut server, &bodies).await;

        let dir = tempfile::tempdir().unwrap();
        let synchronizer = AssetSynchronizer::new(Fetcher::default(), dir.path().to_path_buf()).with_resources_url(server.url());
        synchronizer.sync(&index(&bodies[..2]), None).await;

        let pending = synchronizer.pending(&index(&bodies), None).await;
        assert_eq!(pending.len(), 1);

        let limited = synchronizer.pending(&index(&bodies), Some(0)).await;
        assert!(limited.is_empty());
    }

    #[tokio::test]
    async fn shared_objects_are_fetched_once() {
        let mut server = mockito::Server::new_async().await;
        let mocks = mock_objects(&mut server, &["same"]).await;

        let mut index = index(&["same"]);
        let object = index.objects.values().next().unwrap().clone();
        index.objects.insert("alias".to_owned(), object);

        let dir = tempfile::tempdir().unwrap();
        let synchronizer = AssetSynchronizer::new(Fetcher::default(), dir.path().to_path_buf()).with_resources_url(server.url());

        let report = synchronizer.sync(&index, None).await;
        assert_eq!(report.downloaded, 1);
        mocks[0].assert_async().await;
    }
}
