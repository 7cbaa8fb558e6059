use kiln_core::profiles::ModRef;

use crate::{args::ProfilesCommand, error::Error};

use super::Env;

pub async fn process(env: &Env, command: &ProfilesCommand) -> anyhow::Result<()> {
    let mut store = env.profiles().await?;

    match command {
        ProfilesCommand::List => {
            for profile in store.all() {
                println!(
                    "{}: {} {}, {} GB, {} mods",
                    profile.name,
                    profile.version,
                    profile.loader,
                    profile.memory_gb,
                    profile.mods.len()
                );
                for entry in &profile.mods {
                    let file = entry.filename.as_deref().unwrap_or("not installed");
                    println!("  {} ({}) {file}", entry.name, entry.slug);
                }
            }
        }
        ProfilesCommand::Create { name, version, loader } => {
            store.create(name, version, *loader).await?;
            println!("Created profile {name}");
        }
        ProfilesCommand::Delete { name } => {
            store.delete(name).await?;
            println!("Deleted profile {name}");
        }
        ProfilesCommand::AddMod { profile, slug, name } => {
            let entry = ModRef {
                name: name.clone().unwrap_or_else(|| slug.clone()),
                slug: slug.clone(),
                source_id: String::new(),
                filename: None,
            };

            if store.add_mod(profile, entry).await? {
                println!("Added {slug} to {profile}. Run `kiln install {profile}` to download it");
            } else {
                println!("{profile} already has this mod");
            }
        }
        ProfilesCommand::RemoveMod { profile, name } => {
            if !store.remove_mod(profile, name).await? {
                return Err(Error::NoSuchMod {
                    profile: profile.clone(),
                    name: name.clone(),
                }
                .into());
            }
            println!("Removed {name} from {profile}");
        }
        ProfilesCommand::Edit {
            name,
            version,
            loader,
            memory,
            fabric_api,
        } => {
            let profile = store
                .update(name, |profile| {
                    if let Some(version) = version {
                        profile.version.clone_from(version);
                    }
                    if let Some(loader) = loader {
                        profile.loader = *loader;
                    }
                    if let Some(memory) = memory {
                        profile.memory_gb = *memory;
                    }
                    if let Some(fabric_api) = fabric_api {
                        profile.fabric_api = *fabric_api;
                    }
                })
                .await?;
            println!("{}: {} {}, {} GB", profile.name, profile.version, profile.loader, profile.memory_gb);
        }
    }

    Ok(())
}
