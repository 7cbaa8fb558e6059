use std::sync::Arc;

use kiln_core::installer::{Installation, InstallationContext, ProgressEvent};
use tokio::sync::{mpsc::UnboundedReceiver, Mutex};
use tracing::{info, warn};

use crate::error::Error;

use super::{find_profile, Env};

pub async fn install(env: &Env, name: &str) -> anyhow::Result<()> {
    let installation = run(env, name).await?;

    println!(
        "Installed {} ({} classpath entries)",
        installation.plan.version_id,
        installation.plan.classpath.entries.len()
    );

    Ok(())
}

pub async fn launch(env: &Env, name: &str, offline: bool) -> anyhow::Result<()> {
    let installation = if offline {
        let store = env.profiles().await?;
        let profile = find_profile(&store, name)?;
        env.installer()?.prepare_offline(&profile, &env.paths).await?
    } else {
        run(env, name).await?
    };

    let command = &installation.command;
    info!(main_class = command.main_class(), "Launching {name}");

    let status = command.spawn()?.wait().await?;
    if !status.success() {
        return Err(Error::GameExited(status).into());
    }

    Ok(())
}

/// Installs a profile while printing its progress.
async fn run(env: &Env, name: &str) -> anyhow::Result<Installation> {
    let store = env.profiles().await?;
    let profile = find_profile(&store, name)?;
    let store = Arc::new(Mutex::new(store));

    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    let ctx = InstallationContext::builder()
        .progress(Arc::new(sender))
        .paths(env.paths.clone())
        .profiles(store)
        .build();

    let handle = env.installer()?.spawn(profile, ctx);
    print_progress(receiver).await;

    let installation = handle.await??;

    for degradation in &installation.degraded {
        warn!("{} {}: {}", degradation.stage, degradation.name, degradation.message);
    }
    if installation.assets.deferred > 0 {
        println!("{} assets are left for the next run", installation.assets.deferred);
    }
    if installation.is_degraded() {
        println!("Installation is incomplete, see the warnings above");
    }

    Ok(installation)
}

/// Prints events until the run drops its sender.
async fn print_progress(mut receiver: UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = receiver.recv().await {
        match event.fraction {
            Some(fraction) => println!("[{:>3}%] {}", (fraction * 100.0).round() as u32, event.message),
            None => println!("[    ] {}", event.message),
        }
    }
}
