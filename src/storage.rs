use serde::Serialize;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

use crate::error::AuthError;

/// Metadata about a stored blob.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredFile {
    /// Original filename from the upload
    pub filename: String,
    /// Stored reference (UUID-based to avoid collisions)
    pub stored_name: String,
    /// MIME content type
    pub content_type: String,
    /// File size in bytes
    pub size: u64,
}

/// Blob store collaborator for avatar images.
///
/// The core only depends on this seam; swapping the backend (object storage,
/// CDN) never touches the service layer.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store blob bytes and return the stored reference.
    async fn store(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredFile, AuthError>;

    /// Delete a blob by its stored reference.
    async fn delete(&self, stored_name: &str) -> Result<(), AuthError>;

    /// Check if a blob exists.
    async fn exists(&self, stored_name: &str) -> Result<bool, AuthError>;

    /// Get the public URL or path for a blob.
    async fn url(&self, stored_name: &str) -> Result<String, AuthError>;
}

/// Local filesystem storage backend.
///
/// Blobs are stored in the configured upload directory with UUID-based names.
#[derive(Clone)]
pub struct LocalStorage {
    pub upload_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend.
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        LocalStorage {
            upload_dir: upload_dir.into(),
        }
    }

    /// Ensure the upload directory exists.
    pub async fn ensure_dir(&self) -> Result<(), AuthError> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| AuthError::Internal(format!("Failed to create upload dir: {}", e)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn store(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredFile, AuthError> {
        self.ensure_dir().await?;

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        let file_path = self.upload_dir.join(&stored_name);

        tokio::fs::write(&file_path, data)
            .await
            .map_err(|e| AuthError::Internal(format!("Failed to write file: {}", e)))?;

        Ok(StoredFile {
            filename: filename.to_string(),
            stored_name,
            content_type: content_type.to_string(),
            size: data.len() as u64,
        })
    }

    async fn delete(&self, stored_name: &str) -> Result<(), AuthError> {
        let file_path = self.upload_dir.join(stored_name);
        if file_path.exists() {
            tokio::fs::remove_file(&file_path)
                .await
                .map_err(|e| AuthError::Internal(format!("Failed to delete file: {}", e)))?;
        }
        Ok(())
    }

    async fn exists(&self, stored_name: &str) -> Result<bool, AuthError> {
        let file_path = self.upload_dir.join(stored_name);
        Ok(file_path.exists())
    }

    async fn url(&self, stored_name: &str) -> Result<String, AuthError> {
        Ok(format!("/uploads/{}", stored_name))
    }
}

/// Helper to validate allowed MIME types.
pub fn validate_content_type(content_type: &str, allowed: &[&str]) -> Result<(), AuthError> {
    if !allowed.iter().any(|a| content_type.starts_with(a)) {
        return Err(AuthError::Validation(vec![crate::error::FieldError::new(
            "image",
            format!("Content type '{}' not allowed", content_type),
        )]));
    }
    Ok(())
}
