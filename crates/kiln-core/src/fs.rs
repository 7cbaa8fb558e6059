use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::Error;

pub async fn write_toml_config<T>(data: &T, path: impl AsRef<Path>) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let body = toml::to_string_pretty(data)?;
    write_to_file(body.as_bytes(), path).await?;

    tracing::info!("Config {} has been created successfully", path.to_string_lossy());

    Ok(())
}

pub async fn read_toml_config<T>(path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: DeserializeOwned + ?Sized,
{
    let path = path.as_ref();

    let string = tokio::fs::read_to_string(&path).await?;
    let body: T = toml::from_str(&string)?;

    tracing::info!("Config {} has been read successfully", path.to_string_lossy());

    Ok(body)
}

pub async fn write_json_config<T>(data: &T, path: impl AsRef<Path>) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let body = serde_json::to_string_pretty(data)?;

    write_to_file(body.as_bytes(), path).await?;

    tracing::debug!("Config {} created successfully", path.to_string_lossy());

    Ok(())
}

pub async fn write_to_file(data: &[u8], path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let mut file = tokio::fs::File::create(&path).await?;

    file.write_all(data).await?;

    Ok(())
}

/// Strictly parses a JSON document. The error carries the path of the field that failed.
pub fn parse_json<T>(origin: &str, bytes: &[u8]) -> crate::error::Result<T>
where
    T: DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| Error::Format {
        origin: origin.to_owned(),
        path: e.path().to_string(),
        message: e.into_inner().to_string(),
    })
}

pub async fn read_json<T>(path: impl AsRef<Path>) -> crate::error::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
    parse_json(&path.to_string_lossy(), &bytes)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::ErrorKind;

    #[derive(Deserialize, Debug)]
    struct Outer {
        #[allow(dead_code)]
        inner: Inner,
    }

    #[derive(Deserialize, Debug)]
    struct Inner {
        #[allow(dead_code)]
        size: u32,
    }

    #[test]
    fn format_error_has_path() {
        let err = parse_json::<Outer>("test", br#"{"inner": {"size": "big"}}"#).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Format);
        let Error::Format { path, .. } = err else { unreachable!() };
        assert_eq!(path, "inner.size");
    }

    #[tokio::test]
    async fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.json");

        write_json_config(&vec![1, 2, 3], &path).await.unwrap();
        let back: Vec<u32> = read_json(&path).await.unwrap();

        assert_eq!(back, vec![1, 2, 3]);
    }
}
