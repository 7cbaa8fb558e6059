use std::{path::Path, sync::Arc};

use kiln_core::{
    calculate_sha1,
    configs::{Endpoints, Settings},
    game_paths::GamePaths,
    installer::{InstallError, InstallState, InstallationContext, Installer, ProgressEvent},
    mods::{ModRegistry, PackageFile, PackageRef, PackageVersion},
    platform::OsName,
    profiles::{Loader, ModRef, Profile, ProfileStore},
    ErrorKind, FABRIC_API_SLUG, FABRIC_MAIN_CLASS, VANILLA_MAIN_CLASS,
};
use mockito::{Mock, Server, ServerGuard};
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;

const CLIENT: &str = "client jar";
const LOGGING: &str = "logging jar";
const LOADER: &str = "fabric loader jar";
const INTERMEDIARY: &str = "intermediary jar";
const SOUND: &str = "sound";
const TEXTURE: &str = "texture";

struct Fixture {
    server: ServerGuard,
    client: Mock,
    logging: Mock,
    loader: Mock,
}

async fn body_mock(server: &mut Server, path: &str, body: &str) -> Mock {
    server.mock("GET", path).with_body(body).create_async().await
}

async fn fixture() -> Fixture {
    fixture_with(true).await
}

async fn fixture_with(assets_available: bool) -> Fixture {
    let mut server = Server::new_async().await;
    let url = server.url();

    let catalog = json!({
        "latest": {"release": "1.20.4", "snapshot": "24w03a"},
        "versions": [
            {"id": "24w03a", "type": "snapshot", "url": format!("{url}/v1/24w03a.json")},
            {"id": "1.20.4", "type": "release", "url": format!("{url}/v1/1.20.4.json")}
        ]
    });

    let index = json!({
        "objects": {
            "minecraft/sounds/ambient/cave1.ogg": {"hash": calculate_sha1(SOUND), "size": SOUND.len()},
            "minecraft/textures/block/stone.png": {"hash": calculate_sha1(TEXTURE), "size": TEXTURE.len()}
        }
    })
    .to_string();

    let descriptor = json!({
        "id": "1.20.4",
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "downloads": {"client": {"url": format!("{url}/client.jar"), "sha1": calculate_sha1(CLIENT)}},
        "assetIndex": {"id": "12", "url": format!("{url}/indexes/12.json"), "sha1": calculate_sha1(&index)},
        "libraries": [
            {
                "name": "com.mojang:logging:1.1.1",
                "downloads": {"artifact": {
                    "path": "com/mojang/logging/1.1.1/logging-1.1.1.jar",
                    "url": format!("{url}/libraries/logging-1.1.1.jar"),
                    "sha1": calculate_sha1(LOGGING)
                }}
            },
            {
                "name": "ca.weblite:java-objc-bridge:1.1",
                "downloads": {"artifact": {
                    "path": "ca/weblite/java-objc-bridge/1.1/java-objc-bridge-1.1.jar",
                    "url": format!("{url}/libraries/java-objc-bridge-1.1.jar")
                }},
                "rules": [{"action": "allow", "os": {"name": "osx"}}]
            }
        ]
    });

    let builds = json!([
        {"loader": {"version": "0.16.0-beta.1", "stable": false}},
        {"loader": {"version": "0.15.6", "stable": true}}
    ]);

    let loader_profile = json!({
        "id": "fabric-loader-0.15.6-1.20.4",
        "inheritsFrom": "1.20.4",
        "mainClass": FABRIC_MAIN_CLASS,
        "arguments": {"game": [], "jvm": ["-DFabricMcEmu= net.minecraft.client.main.Main "]},
        "libraries": [
            {"name": "net.fabricmc:fabric-loader:0.15.6", "url": format!("{url}/maven/")},
            {"name": "net.fabricmc:intermediary:1.20.4", "url": format!("{url}/maven/"), "sha1": calculate_sha1(INTERMEDIARY)}
        ]
    });

    body_mock(&mut server, "/manifest.json", &catalog.to_string()).await;
    body_mock(&mut server, "/v1/1.20.4.json", &descriptor.to_string()).await;
    body_mock(&mut server, "/indexes/12.json", &index).await;
    body_mock(&mut server, "/fabric/v2/versions/loader/1.20.4", &builds.to_string()).await;
    body_mock(
        &mut server,
        "/fabric/v2/versions/loader/1.20.4/0.15.6/profile/json",
        &loader_profile.to_string(),
    )
    .await;
    body_mock(
        &mut server,
        "/maven/net/fabricmc/intermediary/1.20.4/intermediary-1.20.4.jar",
        INTERMEDIARY,
    )
    .await;

    for body in [SOUND, TEXTURE] {
        let hash = calculate_sha1(body);
        let path = format!("/resources/{}/{hash}", &hash[..2]);
        if assets_available {
            body_mock(&mut server, &path, body).await;
        } else {
            server.mock("GET", path.as_str()).with_status(503).create_async().await;
        }
    }

    let client = server
        .mock("GET", "/client.jar")
        .with_body(CLIENT)
        .expect(1)
        .create_async()
        .await;
    let logging = server
        .mock("GET", "/libraries/logging-1.1.1.jar")
        .with_body(LOGGING)
        .expect(1)
        .create_async()
        .await;
    // Published without a hash, so only its existence is checked on later runs.
    let loader = server
        .mock("GET", "/maven/net/fabricmc/fabric-loader/0.15.6/fabric-loader-0.15.6.jar")
        .with_body(LOADER)
        .expect(1)
        .create_async()
        .await;

    Fixture {
        server,
        client,
        logging,
        loader,
    }
}

fn settings(server: &Server) -> Settings {
    let url = server.url();

    Settings {
        endpoints: Endpoints {
            version_manifest: format!("{url}/manifest.json"),
            fabric_meta: format!("{url}/fabric/v2"),
            resources: format!("{url}/resources"),
            modrinth: format!("{url}/modrinth"),
        },
        ..Settings::default()
    }
}

/// Registry serving a single version of every requested mod.
///
/// Downloads write the file's url as its content. `tampered` publishes a hash
/// that does not match and `escaping` a file name outside the mods directory.
struct FakeRegistry;

#[async_trait::async_trait]
impl ModRegistry for FakeRegistry {
    async fn search(&self, _query: &str, _game_version: &str, _loader: Loader) -> anyhow::Result<Vec<PackageRef>> {
        Ok(Vec::new())
    }

    async fn list_versions(&self, slug: &str, game_version: &str, _loader: Loader) -> anyhow::Result<Vec<PackageVersion>> {
        if slug == "missing" {
            return Ok(Vec::new());
        }

        let url = format!("https://cdn.example.com/{slug}.jar");
        let sha1 = match slug {
            "tampered" => Some(calculate_sha1("original")),
            _ => Some(calculate_sha1(&url)),
        };
        let filename = match slug {
            "escaping" => "../escaping.jar".to_owned(),
            _ => format!("{slug}-1.0.0+{game_version}.jar"),
        };

        Ok(vec![PackageVersion {
            id: format!("{slug}-id"),
            name: format!("{slug} for {game_version}"),
            version_number: "1.0.0".to_owned(),
            files: vec![PackageFile { url, filename, sha1 }],
        }])
    }

    async fn download(&self, file: &PackageFile, dest: &Path) -> kiln_core::error::Result<()> {
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(dest, &file.url).unwrap();
        Ok(())
    }
}

fn installer(server: &Server) -> Installer {
    Installer::new(reqwest::Client::new(), settings(server))
        .with_os(OsName::Linux)
        .with_registry(Arc::new(FakeRegistry))
}

fn drain(mut receiver: UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn trace() -> tracing::subscriber::DefaultGuard {
    tracing::subscriber::set_default(tracing_subscriber::fmt().with_test_writer().finish())
}

#[tokio::test]
async fn fabric_profile_on_clean_directory() {
    let _trace = trace();
    let fixture = fixture().await;
    let dir = tempfile::tempdir().unwrap();
    let paths = GamePaths::new(dir.path());
    let installer = installer(&fixture.server);
    let profile = Profile::new("Fabric", "1.20.4", Loader::Fabric);

    let (ctx, receiver) = InstallationContext::channel(paths.clone());
    let installation = installer.install(&profile, &ctx).await.unwrap();

    let command = &installation.command;
    assert_eq!(command.main_class(), FABRIC_MAIN_CLASS);

    let clients = command
        .classpath
        .entries
        .iter()
        .filter(|entry| entry.file_name().is_some_and(|name| name == "1.20.4.jar"))
        .count();
    assert_eq!(clients, 1);
    assert!(command.classpath.entries.last().unwrap().ends_with("versions/1.20.4/1.20.4.jar"));
    assert!(command.classpath.entries[0].ends_with("fabric-loader-0.15.6.jar"));
    assert!(!command.classpath.joined().contains("java-objc-bridge"));

    assert!(command.args.contains(&"-Xmx4G".to_owned()));
    assert!(command.args.contains(&"-Xms2G".to_owned()));

    assert!(installation.degraded.is_empty(), "{:?}", installation.degraded);
    assert_eq!(installation.assets.downloaded, 2);
    assert!(!installation.is_degraded());
    assert_eq!(installation.plan.asset_index_id, "12");

    assert!(paths.manifest_file("1.20.4").exists());
    assert!(paths.manifest_file("fabric-loader-0.15.6-1.20.4").exists());
    assert!(paths.mod_file(&format!("{FABRIC_API_SLUG}-1.0.0+1.20.4.jar")).exists());

    let events = drain(receiver);
    let fractions = events.iter().filter_map(|event| event.fraction).collect::<Vec<_>>();
    assert!(fractions.windows(2).all(|pair| pair[0] <= pair[1]), "{fractions:?}");
    assert!(fractions.iter().all(|fraction| (0.0..=1.0).contains(fraction)));

    let last = events.last().unwrap();
    assert_eq!(last.state, InstallState::Ready);
    assert_eq!(last.fraction, Some(1.0));
    assert!(events.iter().any(|event| event.state == InstallState::InstallingLoaderMods));
}

#[tokio::test]
async fn vanilla_profile_in_the_background() {
    let fixture = fixture().await;
    let dir = tempfile::tempdir().unwrap();
    let profile = Profile::new("Plain", "1.20.4", Loader::Vanilla);

    let (handle, mut receiver) = installer(&fixture.server).spawn_with_channel(profile, GamePaths::new(dir.path()));

    let mut states = Vec::new();
    while let Some(event) = receiver.recv().await {
        states.push(event.state);
    }
    let installation = handle.await.unwrap().unwrap();

    assert_eq!(installation.command.main_class(), VANILLA_MAIN_CLASS);
    assert!(!states.contains(&InstallState::InstallingLoader));
    assert!(states.last().unwrap().is_terminal());
    assert_eq!(installation.command.classpath.entries.len(), 2);
}

#[tokio::test]
async fn second_run_uses_the_cache() {
    let fixture = fixture().await;
    let dir = tempfile::tempdir().unwrap();
    let paths = GamePaths::new(dir.path());
    let installer = installer(&fixture.server);
    let profile = Profile::new("Fabric", "1.20.4", Loader::Fabric);
    let ctx = InstallationContext::builder().paths(paths.clone()).build();

    let first = installer.install(&profile, &ctx).await.unwrap();
    let second = installer.install(&profile, &ctx).await.unwrap();

    assert_eq!(first.command.classpath, second.command.classpath);
    assert_eq!(second.assets.skipped, 2);
    assert_eq!(second.assets.downloaded, 0);

    fixture.client.assert_async().await;
    fixture.logging.assert_async().await;
    fixture.loader.assert_async().await;

    let offline = installer.prepare_offline(&profile, &paths).await.unwrap();
    assert_eq!(offline.command.classpath, second.command.classpath);
}

#[tokio::test]
async fn offline_launch_without_cache_is_not_found() {
    let fixture = fixture().await;
    let dir = tempfile::tempdir().unwrap();
    let profile = Profile::new("Vanilla", "1.20.4", Loader::Vanilla);

    let err = installer(&fixture.server)
        .prepare_offline(&profile, &GamePaths::new(dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn second_concurrent_run_is_rejected() {
    let fixture = fixture().await;
    let dir = tempfile::tempdir().unwrap();
    let installer = installer(&fixture.server);
    let profile = Profile::new("Fabric", "1.20.4", Loader::Fabric);
    let first_ctx = InstallationContext::builder().paths(GamePaths::new(dir.path())).build();
    let second_ctx = InstallationContext::builder().paths(GamePaths::new(dir.path())).build();

    let other = installer.clone();

    let (first, second) = tokio::join!(
        installer.install(&profile, &first_ctx),
        other.install(&profile, &second_ctx)
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(InstallError::AlreadyRunning(name)) if name == "Fabric"));

    // The guard is released once the run is over.
    assert!(installer.install(&profile, &first_ctx).await.is_ok());
}

#[tokio::test]
async fn missing_client_jar_fails_the_run() {
    let mut server = Server::new_async().await;
    let url = server.url();
    let catalog = json!({"versions": [{"id": "1.20.4", "url": format!("{url}/v1/1.20.4.json")}]});
    let descriptor = json!({
        "id": "1.20.4",
        "mainClass": "net.minecraft.client.main.Main",
        "downloads": {"client": {"url": format!("{url}/client.jar")}},
        "assetIndex": {"id": "12", "url": format!("{url}/indexes/12.json")},
        "libraries": []
    });
    body_mock(&mut server, "/manifest.json", &catalog.to_string()).await;
    body_mock(&mut server, "/v1/1.20.4.json", &descriptor.to_string()).await;
    body_mock(&mut server, "/indexes/12.json", r#"{"objects": {}}"#).await;
    server.mock("GET", "/client.jar").with_status(404).create_async().await;

    let dir = tempfile::tempdir().unwrap();
    let (ctx, receiver) = InstallationContext::channel(GamePaths::new(dir.path()));
    let profile = Profile::new("Vanilla", "1.20.4", Loader::Vanilla);

    let err = installer(&server).install(&profile, &ctx).await.unwrap_err();

    assert!(matches!(
        err,
        InstallError::Stage {
            state: InstallState::DownloadingVanilla,
            ..
        }
    ));
    assert_eq!(err.kind(), Some(ErrorKind::Network));
    assert_eq!(drain(receiver).last().unwrap().state, InstallState::Failed);
}

#[tokio::test]
async fn unknown_version_fails_planning() {
    let fixture = fixture().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = InstallationContext::builder().paths(GamePaths::new(dir.path())).build();
    let profile = Profile::new("Old", "1.2.5", Loader::Vanilla);

    let err = installer(&fixture.server).install(&profile, &ctx).await.unwrap_err();

    assert!(matches!(
        err,
        InstallError::Stage {
            state: InstallState::PlanningVanilla,
            ..
        }
    ));
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn broken_artifacts_degrade_the_installation() {
    let fixture = fixture_with(false).await;

    let dir = tempfile::tempdir().unwrap();
    let paths = GamePaths::new(dir.path());
    let store = ProfileStore::load(paths.profiles_file()).await.unwrap();
    let store = Arc::new(tokio::sync::Mutex::new(store));

    {
        let mut store = store.lock().await;
        store.create("Modded", "1.20.4", Loader::Fabric).await.unwrap();
        for slug in ["sodium", "missing"] {
            let entry = ModRef {
                name: slug.to_owned(),
                slug: slug.to_owned(),
                source_id: String::new(),
                filename: None,
            };
            store.add_mod("Modded", entry).await.unwrap();
        }
    }

    let profile = store.lock().await.get("Modded").cloned().unwrap();
    let ctx = InstallationContext::builder()
        .paths(paths.clone())
        .profiles(store.clone())
        .build();

    let installation = installer(&fixture.server).install(&profile, &ctx).await.unwrap();

    assert_eq!(installation.assets.failed, 2);
    assert!(installation.is_degraded());

    let failed_mods = installation
        .degraded
        .iter()
        .filter(|d| d.stage == InstallState::InstallingLoaderMods)
        .collect::<Vec<_>>();
    assert_eq!(failed_mods.len(), 1);
    assert_eq!(failed_mods[0].name, "missing");
    assert_eq!(failed_mods[0].kind, ErrorKind::NotFound);

    let store = store.lock().await;
    let modded = store.get("Modded").unwrap();
    assert_eq!(modded.find_mod("sodium").unwrap().filename.as_deref(), Some("sodium-1.0.0+1.20.4.jar"));
    assert_eq!(modded.find_mod("missing").unwrap().filename, None);
}

#[tokio::test]
async fn untrusted_mod_files_are_rejected() {
    let fixture = fixture().await;
    let dir = tempfile::tempdir().unwrap();
    let paths = GamePaths::new(dir.path().join("game"));

    let mut profile = Profile::new("Modded", "1.20.4", Loader::Fabric);
    profile.fabric_api = false;
    for slug in ["tampered", "escaping"] {
        profile.mods.push(ModRef {
            name: slug.to_owned(),
            slug: slug.to_owned(),
            source_id: String::new(),
            filename: None,
        });
    }

    let ctx = InstallationContext::builder().paths(paths.clone()).build();
    let installation = installer(&fixture.server).install(&profile, &ctx).await.unwrap();

    let kinds = installation
        .degraded
        .iter()
        .filter(|d| d.stage == InstallState::InstallingLoaderMods)
        .map(|d| (d.name.as_str(), d.kind))
        .collect::<Vec<_>>();
    assert_eq!(kinds, [("tampered", ErrorKind::Integrity), ("escaping", ErrorKind::Format)]);

    assert!(!paths.mod_file("tampered-1.0.0+1.20.4.jar").exists());
    assert!(!dir.path().join("game").join("escaping.jar").exists());
}
