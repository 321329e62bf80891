use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;

use crate::config::UploadConfig;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Only image uploads are accepted")]
    NotAnImage,

    #[error("File exceeds the {limit_mb} MB upload limit")]
    TooLarge { limit_mb: u64 },

    #[error("Failed to store uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes profile images into the uploads directory under collision-free
/// names; the directory is served verbatim at `/uploads`.
#[derive(Clone)]
pub struct UploadService {
    root: PathBuf,
    max_bytes: u64,
    limit_mb: u64,
}

impl UploadService {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: PathBuf::from(&config.path),
            max_bytes: config.max_file_size_mb * 1024 * 1024,
            limit_mb: config.max_file_size_mb,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Validate and persist an uploaded profile image, returning the stored
    /// filename.
    pub async fn store_profile_image(
        &self,
        original_filename: Option<&str>,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<String, UploadError> {
        let content_type = content_type.unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(UploadError::NotAnImage);
        }

        if data.len() as u64 > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit_mb: self.limit_mb,
            });
        }

        let filename = unique_filename(original_filename, content_type);

        self.ensure_dir().await?;
        tokio::fs::write(self.root.join(&filename), data).await?;

        Ok(filename)
    }
}

fn unique_filename(original: Option<&str>, content_type: &str) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first())
                .map(|e| (*e).to_string())
        })
        .unwrap_or_else(|| "bin".to_string());

    let timestamp = chrono::Utc::now().timestamp_millis();
    let nonce: u32 = rand::rng().random_range(0..1_000_000_000);

    format!("profile-{timestamp}-{nonce}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(limit_mb: u64) -> UploadService {
        UploadService::new(&UploadConfig {
            path: std::env::temp_dir()
                .join("crewbase-upload-tests")
                .to_string_lossy()
                .into_owned(),
            max_file_size_mb: limit_mb,
        })
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let result = service(5)
            .store_profile_image(Some("notes.txt"), Some("text/plain"), b"hello")
            .await;
        assert!(matches!(result, Err(UploadError::NotAnImage)));
    }

    #[tokio::test]
    async fn test_rejects_missing_content_type() {
        let result = service(5).store_profile_image(Some("a.png"), None, b"x").await;
        assert!(matches!(result, Err(UploadError::NotAnImage)));
    }

    #[tokio::test]
    async fn test_rejects_oversized_file() {
        let data = vec![0u8; 1024 * 1024 + 1];
        let result = service(1)
            .store_profile_image(Some("big.png"), Some("image/png"), &data)
            .await;
        assert!(matches!(result, Err(UploadError::TooLarge { limit_mb: 1 })));
    }

    #[tokio::test]
    async fn test_stores_image_with_generated_name() {
        let svc = service(5);
        let name = svc
            .store_profile_image(Some("me.PNG"), Some("image/png"), b"fake-png")
            .await
            .unwrap();

        assert!(name.starts_with("profile-"));
        assert!(name.ends_with(".png"));

        let stored = tokio::fs::read(svc.root().join(&name)).await.unwrap();
        assert_eq!(stored, b"fake-png");
    }
}
