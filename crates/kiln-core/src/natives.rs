use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::platform::OsName;

/// Unpacks the shared libraries of `archive` into `target_dir` and returns how many were written.
///
/// A corrupt or unreadable archive is logged and counts as zero extracted files.
pub async fn extract(archive: impl Into<PathBuf>, target_dir: impl Into<PathBuf>, os: OsName) -> usize {
    let archive = archive.into();
    let target_dir = target_dir.into();

    let task = {
        let archive = archive.clone();
        tokio::task::spawn_blocking(move || extract_blocking(&archive, &target_dir, os))
    };

    match task.await {
        Ok(Ok(count)) => {
            debug!(archive = %archive.display(), count, "Natives extracted");
            count
        }
        Ok(Err(err)) => {
            warn!(archive = %archive.display(), "Cannot extract natives: {err:#}");
            0
        }
        Err(err) => {
            warn!(archive = %archive.display(), "Natives extraction task failed: {err}");
            0
        }
    }
}

fn extract_blocking(archive: &Path, target_dir: &Path, os: OsName) -> anyhow::Result<usize> {
    let reader = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(reader)?;

    let suffixes = os.shared_library_suffixes();
    let mut count = 0;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!(entry = entry.name(), "Skipping native entry outside the target directory");
            continue;
        };

        let is_shared_library = relative
            .to_str()
            .is_some_and(|name| suffixes.iter().any(|suffix| name.ends_with(suffix)));
        if !is_shared_library {
            continue;
        }

        let out_path = target_dir.join(&relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::FileOptions;

    use super::*;

    fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, body) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(body).unwrap();
        }
        zip.finish().unwrap();
    }

    #[tokio::test]
    async fn extracts_only_shared_libraries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("lwjgl-natives-linux.jar");
        write_archive(
            &archive,
            &[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
                ("liblwjgl.so", b"so"),
                ("linux/x64/org/lwjgl/liblwjgl_opengl.so", b"so"),
                ("lwjgl.dll", b"dll"),
                ("org/lwjgl/Version.class", b"class"),
            ],
        );

        let target = dir.path().join("natives/1.20.4");
        let count = extract(&archive, &target, OsName::Linux).await;

        assert_eq!(count, 3);
        assert!(target.join("liblwjgl.so").exists());
        assert!(target.join("linux/x64/org/lwjgl/liblwjgl_opengl.so").exists());
        assert!(!target.join("META-INF/MANIFEST.MF").exists());
    }

    #[tokio::test]
    async fn corrupt_archive_yields_zero() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.jar");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        assert_eq!(extract(&archive, dir.path().join("natives"), OsName::Linux).await, 0);
        assert_eq!(extract(dir.path().join("missing.jar"), dir.path().join("natives"), OsName::Linux).await, 0);
    }

    #[tokio::test]
    async fn jnilib_only_on_osx() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("natives-osx.jar");
        write_archive(&archive, &[("liblwjgl.jnilib", b"jni")]);

        assert_eq!(extract(&archive, dir.path().join("linux"), OsName::Linux).await, 0);
        assert_eq!(extract(&archive, dir.path().join("osx"), OsName::Osx).await, 1);
    }
}
