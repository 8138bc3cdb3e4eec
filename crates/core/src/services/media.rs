//! Media upload service.

use std::sync::Arc;

use serde::Serialize;
use survey_common::{AppError, AppResult, StorageBackend, generate_media_key};
use survey_db::entities::survey_media_file::MediaFileType;
use tracing::info;

/// Result of a media upload.
#[derive(Debug, Clone, Serialize)]
pub struct MediaUpload {
    pub key: String,
    pub url: String,
    pub file_type: MediaFileType,
    pub size: u64,
    pub content_type: String,
}

/// Stores uploaded survey media.
#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn StorageBackend>,
    max_upload_bytes: usize,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, max_upload_bytes: usize) -> Self {
        Self {
            storage,
            max_upload_bytes,
        }
    }

    /// Store a file and return where it can be fetched.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<MediaUpload> {
        if data.is_empty() {
            return Err(AppError::Validation("file is empty".to_string()));
        }
        if data.len() > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "file exceeds the {} byte upload limit",
                self.max_upload_bytes
            )));
        }

        let key = generate_media_key(file_name);
        let stored = self.storage.upload(&key, data, content_type).await?;

        info!(key = %stored.key, size = stored.size, "Stored media file");

        Ok(MediaUpload {
            key: stored.key,
            url: stored.url,
            file_type: MediaFileType::from_content_type(content_type),
            size: stored.size,
            content_type: stored.content_type,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use survey_common::UploadedFile;

    struct RecordingStorage;

    #[async_trait::async_trait]
    impl StorageBackend for RecordingStorage {
        async fn upload(
            &self,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> AppResult<UploadedFile> {
            Ok(UploadedFile {
                key: key.to_string(),
                url: self.public_url(key),
                size: data.len() as u64,
                content_type: content_type.to_string(),
                md5: String::new(),
            })
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("http://media.local/{key}")
        }
    }

    fn service(limit: usize) -> MediaService {
        MediaService::new(Arc::new(RecordingStorage), limit)
    }

    #[tokio::test]
    async fn test_upload_derives_file_type() {
        let upload = service(1024)
            .upload("clip.mp4", "video/mp4", b"data")
            .await
            .unwrap();

        assert_eq!(upload.file_type, MediaFileType::Video);
        assert!(upload.key.starts_with("surveys/media/"));
        assert!(upload.key.ends_with(".mp4"));
        assert_eq!(upload.url, format!("http://media.local/{}", upload.key));
        assert_eq!(upload.size, 4);
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let result = service(1024).upload("a.png", "image/png", b"").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversize_file() {
        let result = service(3).upload("a.png", "image/png", b"abcd").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
