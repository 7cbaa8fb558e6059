pub mod assets;
pub mod file;
pub mod set;

pub use assets::{AssetSynchronizer, PendingAssets, SyncReport};
pub use file::FileDownloader;
pub use set::DownloadSet;
