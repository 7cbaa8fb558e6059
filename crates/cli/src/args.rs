use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kiln_core::profiles::Loader;

#[derive(Parser)]
#[command(verbatim_doc_comment, version)]
///     __   _ __
///    / /__(_) /___
///   / //_/ / / __ \
///  / ,< / / / / / /
/// /_/|_/_/_/_/ /_/
/// Minecraft installer and launcher
pub struct Cli {
    /// Game directory holding versions, libraries, assets and profiles
    #[arg(long, short = 'g', global = true, default_value = "./minecraft")]
    pub game_dir: PathBuf,
    /// Log debug output
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download everything a profile needs
    Install { profile: String },
    /// Install and start a profile
    Launch {
        profile: String,
        /// Use cached metadata only
        #[arg(long)]
        offline: bool,
    },
    /// List game versions
    Versions {
        /// Include snapshots and old betas
        #[arg(long)]
        snapshots: bool,
    },
    /// Search for mods
    Search {
        query: String,
        #[arg(long)]
        game_version: String,
        #[arg(long, default_value = "fabric")]
        loader: Loader,
    },
    /// Manage profiles
    #[command(subcommand)]
    Profiles(ProfilesCommand),
}

#[derive(Subcommand)]
pub enum ProfilesCommand {
    /// Show existing profiles
    List,
    Create {
        name: String,
        #[arg(long)]
        version: String,
        #[arg(long, default_value = "fabric")]
        loader: Loader,
    },
    Delete { name: String },
    /// Add a mod by its registry slug
    AddMod {
        profile: String,
        slug: String,
        /// Display name, the slug when omitted
        #[arg(long)]
        name: Option<String>,
    },
    RemoveMod { profile: String, name: String },
    Edit {
        name: String,
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        loader: Option<Loader>,
        /// Maximum heap in gigabytes
        #[arg(long)]
        memory: Option<u32>,
        #[arg(long)]
        fabric_api: Option<bool>,
    },
}
