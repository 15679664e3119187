use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::StoreError;

/// Flat key/value object storage. Keys are `/`-separated relative paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// The stored bytes, or `None` when nothing lives at `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces whatever lives at `key`.
    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

pub(crate) fn check_key(key: &str) -> Result<&str, StoreError> {
    let invalid = key.is_empty()
        || key.contains('\\')
        || Path::new(key)
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));

    if invalid {
        return Err(StoreError::InvalidKey(key.to_owned()));
    }
    Ok(key)
}

/// Blobs as plain files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalBlobs {
    root: PathBuf,
}

impl LocalBlobs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(check_key(key)?))
    }
}

#[async_trait]
impl BlobStore for LocalBlobs {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path(key)?;
        match fs::read(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, key: &str, content: Vec<u8>, _content_type: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // readers only ever see the old or the new file
        let tmp = path.with_file_name(format!(
            ".{}.{}.tmp",
            path.file_name().and_then(|name| name.to_str()).unwrap_or("blob"),
            Uuid::now_v7().simple()
        ));
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "wrote blob");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)?).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Blobs behind an HTTP object store that speaks `GET`/`PUT {base}/{key}` with a bearer token.
#[derive(Debug, Clone)]
pub struct RemoteBlobs {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RemoteBlobs {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        }
    }

    fn url(&self, key: &str) -> Result<String, StoreError> {
        Ok(format!("{}/{}", self.base_url, check_key(key)?))
    }
}

#[async_trait]
impl BlobStore for RemoteBlobs {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let response = self.client
            .get(self.url(key)?)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.bytes().await?.to_vec())),
            status => Err(StoreError::Remote { key: key.to_owned(), status: status.as_u16() }),
        }
    }

    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        let response = self.client
            .put(self.url(key)?)
            .bearer_auth(&self.token)
            .header(header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Remote { key: key.to_owned(), status: status.as_u16() });
        }

        debug!(key, "uploaded blob");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let response = self.client
            .delete(self.url(key)?)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() || status == StatusCode::NOT_FOUND => Ok(()),
            status => Err(StoreError::Remote { key: key.to_owned(), status: status.as_u16() }),
        }
    }
}
