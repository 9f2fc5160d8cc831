/// Blob storage abstraction for signature images and contract attachments.
///
/// The workflow only assumes one capability: store a blob, get back a
/// retrievable URL. The hosted store's media endpoint provides that in
/// production; tests use the recording implementation or a `mockall` mock.
///
/// # Examples
///
/// ```rust,no_run
/// use dugout::media::{MediaStore, RecordingMediaStore};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), dugout::store::StoreError> {
/// let media: Arc<dyn MediaStore> = Arc::new(RecordingMediaStore::new());
/// let url = media
///     .store_blob("signature.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
///     .await?;
/// println!("stored at {url}");
/// # Ok(())
/// # }
/// ```
use std::sync::Mutex;

use tracing::debug;

#[cfg(test)]
use mockall::{automock, predicate::*};

use crate::store::StoreError;

/// Store blob -> URL. No further contract is assumed about the backend.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `name` and return a retrievable URL
    async fn store_blob(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError>;
}

/// Production implementation backed by the record store's media endpoint.
#[derive(Debug)]
pub struct HttpMediaStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
    workspace: String,
}

#[derive(Debug, serde::Deserialize)]
struct StoredBlob {
    url: String,
}

impl HttpMediaStore {
    pub fn new(base_url: &str, token: &str, workspace: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            workspace: workspace.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MediaStore for HttpMediaStore {
    async fn store_blob(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        let url = format!(
            "{}/api/v1/workspaces/{}/media/{}",
            self.base_url, self.workspace, name
        );
        let size = bytes.len();
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let stored: StoredBlob = response.json().await?;
        debug!(name = %name, size, url = %stored.url, "stored media blob");
        Ok(stored.url)
    }
}

/// Collects uploads and hands back deterministic URLs - no side effects
#[derive(Debug, Default)]
pub struct RecordingMediaStore {
    uploads: Mutex<Vec<(String, String, usize)>>,
}

impl RecordingMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// (name, content type, byte length) per upload, in order.
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MediaStore for RecordingMediaStore {
    async fn store_blob(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        self.uploads
            .lock()
            .unwrap()
            .push((name.to_string(), content_type.to_string(), bytes.len()));
        Ok(format!("memory://media/{name}"))
    }
}
