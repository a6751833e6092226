//! Media host adapters (issue flyers).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use fixit_core::StoreError;

/// A file received from a client, ready to hand to the media host.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    /// Extension to keep on the stored object, taken from the client file
    /// name when it is a short alphanumeric suffix.
    fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .then(|| ext.to_ascii_lowercase())
    }

    fn object_name(&self) -> String {
        let stem = uuid::Uuid::now_v7();
        match self.extension() {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem.to_string(),
        }
    }
}

/// External object storage, addressed by the public URL `upload` returns.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, upload: MediaUpload) -> Result<String, StoreError>;

    /// Remove a stored object. Unknown URLs are not an error.
    async fn delete(&self, url: &str) -> Result<(), StoreError>;
}

/// Keeps uploads in memory; URLs use the `memory://` scheme.
#[derive(Debug, Default)]
pub struct InMemoryMediaStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let key = url.strip_prefix("memory://")?;
        self.objects.read().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(&self, upload: MediaUpload) -> Result<String, StoreError> {
        let name = upload.object_name();
        self.objects
            .write()
            .map_err(|_| StoreError::unavailable("media store lock poisoned"))?
            .insert(name.clone(), upload.bytes);
        Ok(format!("memory://{name}"))
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        if let Some(key) = url.strip_prefix("memory://") {
            self.objects
                .write()
                .map_err(|_| StoreError::unavailable("media store lock poisoned"))?
                .remove(key);
        }
        Ok(())
    }
}

/// Writes uploads under a local directory that is served at `base_url`.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
    base_url: String,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MediaStore for FsMediaStore {
    async fn upload(&self, upload: MediaUpload) -> Result<String, StoreError> {
        let name = upload.object_name();

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::unavailable(format!("media dir {}: {e}", self.root.display())))?;
        tokio::fs::write(self.root.join(&name), &upload.bytes)
            .await
            .map_err(|e| StoreError::unavailable(format!("writing {name}: {e}")))?;

        tracing::debug!(object = %name, bytes = upload.bytes.len(), content_type = ?upload.content_type, "stored media object");
        Ok(format!("{}/{}", self.base_url, name))
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        // Only plain object names under our own base URL map to a file.
        let Some(name) = url
            .strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|n| !n.is_empty() && !n.contains(['/', '\\']) && !n.starts_with('.'))
        else {
            return Ok(());
        };

        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::unavailable(format!("removing {name}: {e}"))),
        }
    }
}
