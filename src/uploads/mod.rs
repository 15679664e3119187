use std::sync::Arc;

use axum::{
    debug_handler, extract::{Path, State}, http::header, response::{IntoResponse, Response}, routing::get, Router,
};
use uuid::Uuid;

use crate::{store::{check_key, BlobStore, StoreError}, AppError, AppResult, AppState};

/// Prefix of every stored file reference handed to clients.
pub const URL_PREFIX: &str = "/api/uploads/";

pub fn router() -> Router<AppState> {
    Router::new().route("/uploads/{*path}", get(serve))
}

/// User-uploaded files: a directory locally, the `uploads/` namespace of the blob store in production.
#[derive(Clone)]
pub struct Uploads {
    blobs: Arc<dyn BlobStore>,
    prefix: &'static str,
}

impl Uploads {
    pub fn new(blobs: Arc<dyn BlobStore>, prefix: &'static str) -> Self {
        Self { blobs, prefix }
    }

    /// Stores `content` under a generated filename and returns its public reference.
    pub async fn save(&self, original_name: Option<&str>, content_type: &str, content: Vec<u8>) -> Result<String, StoreError> {
        let file = format!("{}.{}", Uuid::now_v7().simple(), extension(original_name, content_type));
        self.blobs.put(&format!("{}{file}", self.prefix), content, content_type).await?;

        tracing::debug!(file = %file, "stored upload");
        Ok(format!("{URL_PREFIX}{file}"))
    }

    /// Removes previously saved files, given their public references. Failures are only logged.
    pub async fn discard(&self, references: &[String]) {
        for reference in references {
            let Some(file) = reference.strip_prefix(URL_PREFIX) else {
                continue;
            };
            match self.blobs.delete(&format!("{}{file}", self.prefix)).await {
                Ok(()) => tracing::debug!(file = %file, "discarded upload"),
                Err(err) => tracing::warn!(error = %err, file = %file, "could not remove orphaned upload"),
            }
        }
    }

    pub async fn open(&self, file: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let file = check_key(file)?;
        self.blobs.get(&format!("{}{file}", self.prefix)).await
    }
}

/// Extension for a stored file. The checked content type wins. The client's
/// filename is only consulted for image types without a fixed mapping.
fn extension(original_name: Option<&str>, content_type: &str) -> String {
    let from_type = match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    };
    if let Some(ext) = from_type {
        return ext.to_owned();
    }

    original_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "gif" | "webp" | "avif"))
        .unwrap_or_else(|| "bin".to_owned())
}

fn content_type(file: &str) -> &'static str {
    let ext = file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn serve(
    State(uploads): State<Uploads>,
    Path(path): Path<String>,
) -> AppResult<Response> {
    let content = match uploads.open(&path).await {
        Ok(Some(content)) => content,
        Ok(None) => return Err(AppError::NotFound("File".to_owned())),
        Err(StoreError::InvalidKey(_)) => return Err(AppError::validation("Invalid upload path")),
        Err(err) => return Err(err.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&path)),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        content,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::store::LocalBlobs;

    use super::*;

    #[rstest]
    #[case(Some("me.JPG"), "image/jpeg", "jpg")]
    #[case(Some("photo"), "image/png", "png")]
    #[case(Some("x.html"), "image/png", "png")]
    #[case(Some("weird.tar.gz!"), "image/webp", "webp")]
    #[case(Some("scan.JPEG"), "image/pjpeg", "jpeg")]
    #[case(Some("page.html"), "image/x-icon", "bin")]
    #[case(None, "application/pdf", "bin")]
    fn picks_extension(#[case] name: Option<&str>, #[case] content_type: &str, #[case] expected: &str) {
        assert_eq!(extension(name, content_type), expected);
    }

    #[tokio::test]
    async fn saved_files_are_served_back() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(Arc::new(LocalBlobs::new(dir.path())), "");

        let reference = uploads.save(Some("cat.png"), "image/png", b"png-bytes".to_vec()).await.unwrap();
        let file = reference.strip_prefix(URL_PREFIX).unwrap();
        assert!(file.ends_with(".png"));
        assert_eq!(uploads.open(file).await.unwrap(), Some(b"png-bytes".to_vec()));
    }

    #[tokio::test]
    async fn discarded_files_are_gone() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(Arc::new(LocalBlobs::new(dir.path())), "");

        let kept = uploads.save(Some("a.png"), "image/png", b"a".to_vec()).await.unwrap();
        let dropped = uploads.save(Some("b.png"), "image/png", b"b".to_vec()).await.unwrap();
        uploads.discard(&[dropped.clone(), "/elsewhere/c.png".to_owned()]).await;

        assert_eq!(uploads.open(dropped.strip_prefix(URL_PREFIX).unwrap()).await.unwrap(), None);
        assert!(uploads.open(kept.strip_prefix(URL_PREFIX).unwrap()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn prefix_namespaces_keys() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(Arc::new(LocalBlobs::new(dir.path())), "uploads/");

        let reference = uploads.save(None, "image/gif", b"gif".to_vec()).await.unwrap();
        let file = reference.strip_prefix(URL_PREFIX).unwrap();
        assert!(dir.path().join("uploads").join(file).exists());
    }
}
