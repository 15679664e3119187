//! Whole-document persistence.
//!
//! Everything the service knows lives in one JSON [`Document`]. It is read and
//! written whole through a [`BlobStore`]: a directory on disk in development, a
//! remote object store in production. There is no merging. The last writer wins.

mod blob;

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::{auth::password, models::{Document, ADMIN_PASSWORD}};

pub use blob::{BlobStore, LocalBlobs, RemoteBlobs};
pub(crate) use blob::check_key;

pub const DOCUMENT_KEY: &str = "db.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("blob store answered {status} for {key}")]
    Remote { key: String, status: u16 },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("could not encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("could not hash seed credentials: {0}")]
    Seed(#[from] password::PasswordError),
}

#[derive(Clone)]
pub struct DataStore {
    blobs: Arc<dyn BlobStore>,
    bcrypt_cost: u32,
    writer: Arc<Mutex<()>>,
}

impl DataStore {
    pub fn new(blobs: Arc<dyn BlobStore>, bcrypt_cost: u32) -> Self {
        Self {
            blobs,
            bcrypt_cost,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Reads the full document, seeding the default admin when there is none or
    /// when the stored document holds no users.
    ///
    /// An unreadable document is copied aside under a `.corrupt-<timestamp>` key
    /// and replaced by a fresh seed. Backend failures are returned as errors.
    pub async fn read_data(&self) -> Result<Document, StoreError> {
        let Some(raw) = self.blobs.get(DOCUMENT_KEY).await? else {
            info!("no document found, seeding");
            return self.seed().await;
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            info!("document is empty, seeding");
            return self.seed().await;
        }

        match serde_json::from_slice::<Document>(&raw) {
            Ok(mut doc) => {
                let mut changed = doc.backfill_profile_ids();
                if doc.users.is_empty() {
                    info!("document has no users, seeding admin");
                    doc.seed_admin(self.admin_hash().await?);
                    changed = true;
                }
                if changed {
                    self.write_data(&doc).await?;
                }
                Ok(doc)
            }
            Err(err) => {
                let backup = format!("{DOCUMENT_KEY}.corrupt-{}", OffsetDateTime::now_utc().unix_timestamp());
                error!(error = %err, backup = %backup, "document is corrupt, moving it aside and reseeding");
                self.blobs.put(&backup, raw, "application/json").await?;
                self.seed().await
            }
        }
    }

    /// Persists the full document, replacing whatever was stored.
    pub async fn write_data(&self, doc: &Document) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(doc)?;
        self.blobs.put(DOCUMENT_KEY, content, "application/json").await
    }

    /// Read-modify-write. The document is only written back when `f` succeeds.
    ///
    /// Updates from this process are serialized. Other processes sharing the
    /// backend can still overwrite each other.
    pub async fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.writer.lock().await;

        let mut doc = self.read_data().await?;
        let out = f(&mut doc)?;
        self.write_data(&doc).await?;

        Ok(out)
    }

    async fn seed(&self) -> Result<Document, StoreError> {
        let doc = Document::seeded(self.admin_hash().await?);
        self.write_data(&doc).await?;
        Ok(doc)
    }

    async fn admin_hash(&self) -> Result<String, StoreError> {
        Ok(password::hash(ADMIN_PASSWORD.to_owned(), self.bcrypt_cost).await?)
    }
}
