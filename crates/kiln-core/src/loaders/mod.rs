pub mod fabric;
pub mod plan;
pub mod vanilla;

pub use fabric::plan_loader;
pub use plan::{DownloadTask, InstallationPlan, LoaderPlan, TaskKind, VanillaPlan};
pub use vanilla::plan_vanilla;

/// Turns one library entry of some metadata format into download tasks.
pub trait LibrariesMapper<L> {
    fn proceed(&self, library: &L) -> Vec<DownloadTask>;
}

pub(crate) fn map_libraries<M, L>(mapper: &M, libraries: &[L]) -> Vec<DownloadTask>
where
    M: LibrariesMapper<L>,
{
    libraries.iter().flat_map(|lib| mapper.proceed(lib)).collect()
}
