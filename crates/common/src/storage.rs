//! Object storage abstraction for file uploads.
//!
//! Uploaded attachments are written through a [`StorageBackend`]. The local
//! filesystem backend is used in production; [`MemoryStorage`] keeps files in
//! memory and records every call so tests can assert on side effects.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::{AppError, AppResult};

/// Uploaded file metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Storage key (path or object key).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Shared handle to a storage backend.
pub type StorageService = Arc<dyn StorageBackend>;

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Directory the files are written to.
    #[must_use]
    pub const fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Upload(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Upload(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.base_path.join(key);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to stat file: {e}")))
    }
}

#[derive(Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    uploads: Vec<String>,
    deletes: Vec<String>,
}

/// In-memory storage backend.
///
/// Can be told to fail after a number of uploads, to stall each upload, or to
/// fail deletions, which is how upload rollback and cleanup paths are tested.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
    fail_after: Option<usize>,
    delay: Option<Duration>,
    fail_deletes: bool,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every upload after the first `n` succeed.
    #[must_use]
    pub const fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Sleep for `delay` before completing each upload.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every delete call fail.
    #[must_use]
    pub const fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keys currently held.
    #[must_use]
    pub fn stored_keys(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    /// Every key an upload was attempted for, in call order.
    #[must_use]
    pub fn upload_attempts(&self) -> Vec<String> {
        self.lock().uploads.clone()
    }

    /// Every key a delete was requested for, in call order.
    #[must_use]
    pub fn delete_requests(&self) -> Vec<String> {
        self.lock().deletes.clone()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let attempt = {
            let mut state = self.lock();
            state.uploads.push(key.to_string());
            state.uploads.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_after.is_some_and(|n| attempt > n) {
            return Err(AppError::Upload(format!("Storage rejected {key}")));
        }

        self.lock().files.insert(key.to_string(), data.to_vec());

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5: format!("{:x}", md5::compute(data)),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut state = self.lock();
        state.deletes.push(key.to_string());
        if self.fail_deletes {
            return Err(AppError::Internal(format!("Storage refused to delete {key}")));
        }
        state.files.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("/uploads/{key}")
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.lock().files.contains_key(key))
    }
}

/// Generate a unique storage key for a file.
///
/// Keys look like `{prefix}/{YYYY/MM/DD}/{user}/{millis}_{uuid}.{ext}`.
#[must_use]
pub fn generate_storage_key(prefix: &str, user_id: &str, original_name: &str) -> String {
    use chrono::Utc;

    let now = Utc::now();
    let date_path = now.format("%Y/%m/%d").to_string();
    let timestamp = now.timestamp_millis();

    format!(
        "{}/{}/{}/{}_{}.{}",
        prefix,
        date_path,
        user_id,
        timestamp,
        uuid::Uuid::new_v4().simple(),
        file_extension(original_name).unwrap_or_else(|| "bin".to_string())
    )
}

/// Lowercased extension of a file name, if it has a usable one.
#[must_use]
pub fn file_extension(name: &str) -> Option<String> {
    name.rfind('.')
        .filter(|&pos| pos > 0 && pos < name.len() - 1)
        .map(|pos| &name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}
