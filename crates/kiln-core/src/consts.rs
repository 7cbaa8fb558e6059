pub const VERSION_MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest_v2.json";
pub const FABRIC_META_URL: &str = "https://meta.fabricmc.net/v2";
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";
pub const MODRINTH_API_URL: &str = "https://api.modrinth.com/v2";

/// Modrinth slug of the Fabric API mod.
pub const FABRIC_API_SLUG: &str = "fabric-api";

pub const FABRIC_MAIN_CLASS: &str = "net.fabricmc.loader.impl.launch.knot.KnotClient";
pub const VANILLA_MAIN_CLASS: &str = "net.minecraft.client.main.Main";

/// Access token passed to the game in offline mode.
pub const OFFLINE_ACCESS_TOKEN: &str = "0";

pub const DOT_KILN_DIR: &str = ".kiln";
/// Path to the settings file with respect to the game directory.
pub const SETTINGS_CONFIG: &str = ".kiln/Settings.toml";
pub const PROFILES_FILE: &str = "profiles.json";

pub const DEFAULT_PROFILE: &str = "Default";
pub const DEFAULT_GAME_VERSION: &str = "1.20.4";
pub const DEFAULT_MEMORY_GB: u32 = 4;

pub const KILN_VERSION: &str = "0.1.0";
pub const KILN_NAME: &str = "Kiln";
