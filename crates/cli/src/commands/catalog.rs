use kiln_core::{meta::MetaClient, mods::ModRegistry, profiles::Loader};

use super::Env;

pub async fn versions(env: &Env, snapshots: bool) -> anyhow::Result<()> {
    let meta = MetaClient::new(env.settings.http_client()?, env.settings.endpoints.clone());
    let catalog = meta.fetch_catalog().await?;

    let versions = if snapshots {
        catalog.versions.iter().collect::<Vec<_>>()
    } else {
        catalog.releases().collect()
    };

    for version in versions {
        println!("{}", version.id);
    }

    println!("Latest release: {}", catalog.latest.release);

    Ok(())
}

pub async fn search(env: &Env, query: &str, game_version: &str, loader: Loader) -> anyhow::Result<()> {
    let packages = env.registry()?.search(query, game_version, loader).await?;

    if packages.is_empty() {
        println!("Nothing found for `{query}`");
    }

    for package in packages {
        println!("{:<28} {} ({} downloads)", package.slug, package.title, package.downloads);
    }

    Ok(())
}
