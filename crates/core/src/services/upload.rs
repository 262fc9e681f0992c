//! Upload resolver.
//!
//! Turns raw attachments into stored media. A batch either stores completely
//! or leaves nothing behind: when one file fails, the files already stored
//! from the same batch are released before the error is returned.

use std::time::Duration;

use bytes::Bytes;
use gofarm_common::{
    AppError, AppResult, StorageService, file_extension, generate_storage_key,
};
use gofarm_db::entities::StoredMedia;

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Default bound on a single store call.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Kind of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
}

impl AttachmentKind {
    const fn mime_prefix(self) -> &'static str {
        match self {
            Self::Image => "image/",
            Self::Video => "video/",
        }
    }

    const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_EXTENSIONS,
            Self::Video => VIDEO_EXTENSIONS,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl Attachment {
    /// Check that the MIME type and extension both match the declared kind.
    pub fn validate(&self, max_bytes: usize) -> AppResult<()> {
        let mime_ok = self
            .content_type
            .to_ascii_lowercase()
            .starts_with(self.kind.mime_prefix());
        let ext_ok = file_extension(&self.file_name)
            .is_some_and(|ext| self.kind.extensions().contains(&ext.as_str()));

        if !mime_ok || !ext_ok {
            return Err(AppError::Validation(format!(
                "{} is not an accepted {} file (allowed: {})",
                self.file_name,
                self.kind.label(),
                self.kind.extensions().join(", ")
            )));
        }

        if self.data.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "{} exceeds the {} byte limit",
                self.file_name, max_bytes
            )));
        }

        Ok(())
    }
}

/// Fail with [`AppError::AttachmentLimit`] when `got` exceeds `max`.
pub fn check_limit(field: &'static str, max: usize, got: usize) -> AppResult<()> {
    if got > max {
        return Err(AppError::AttachmentLimit { field, max, got });
    }
    Ok(())
}

/// Stores attachments and releases stored media.
#[derive(Clone)]
pub struct UploadResolver {
    storage: StorageService,
    timeout: Duration,
}

impl UploadResolver {
    #[must_use]
    pub fn new(storage: StorageService) -> Self {
        Self {
            storage,
            timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Override the per-file store timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate and store a batch, preserving order.
    ///
    /// Every attachment is validated before the first one is stored.
    pub async fn resolve(
        &self,
        owner_id: &str,
        prefix: &str,
        attachments: &[Attachment],
        max_bytes: usize,
    ) -> AppResult<Vec<StoredMedia>> {
        for attachment in attachments {
            attachment.validate(max_bytes)?;
        }

        let mut stored = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            match self.store(owner_id, prefix, attachment).await {
                Ok(media) => stored.push(media),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        file = %attachment.file_name,
                        rollback = stored.len(),
                        "Attachment upload failed, rolling back batch"
                    );
                    self.release(&stored).await;
                    return Err(e);
                }
            }
        }

        Ok(stored)
    }

    async fn store(
        &self,
        owner_id: &str,
        prefix: &str,
        attachment: &Attachment,
    ) -> AppResult<StoredMedia> {
        let key = generate_storage_key(prefix, owner_id, &attachment.file_name);

        let uploaded = tokio::time::timeout(
            self.timeout,
            self.storage
                .upload(&key, &attachment.data, &attachment.content_type),
        )
        .await
        .map_err(|_| {
            AppError::Upload(format!(
                "Storing {} timed out after {}s",
                attachment.file_name,
                self.timeout.as_secs_f32()
            ))
        })?
        .map_err(|e| match e {
            AppError::Upload(_) => e,
            other => AppError::Upload(other.to_string()),
        })?;

        tracing::debug!(key = %uploaded.key, size = uploaded.size, "Stored attachment");

        Ok(StoredMedia {
            url: uploaded.url,
            filename: uploaded.key,
        })
    }

    /// Delete stored media. Failures are logged and otherwise ignored.
    pub async fn release(&self, media: &[StoredMedia]) {
        for item in media {
            if let Err(e) = self.storage.delete(&item.filename).await {
                tracing::warn!(error = %e, key = %item.filename, "Failed to release stored media");
            }
        }
    }
}
