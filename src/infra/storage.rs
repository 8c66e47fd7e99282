//! File storage for uploaded pictures.
//!
//! Stored paths are relative to the configured upload root so the
//! database stays portable across deployments.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{ALLOWED_PHOTO_EXTENSIONS, MAX_PHOTO_BYTES};
use crate::errors::{AppError, AppResult};

/// File persistence boundary used by the profile and listing handlers.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store a user's profile picture. Returns the stored relative path.
    async fn store_user_picture(
        &self,
        user_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> AppResult<String>;

    /// Store a listing photo keyed by listing id. Returns the stored
    /// relative path.
    async fn store_listing_photo(
        &self,
        listing_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> AppResult<String>;
}

/// Local-disk file store rooted at the configured upload directory.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    async fn write(&self, relative: &Path, bytes: &[u8]) -> AppResult<String> {
        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(relative.to_string_lossy().into_owned())
    }
}

/// Extract and check the file extension of an uploaded filename.
///
/// Only the basename is considered, so path components smuggled into
/// the filename cannot escape the upload root.
fn checked_extension(filename: &str) -> AppResult<String> {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let ext = Path::new(basename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| AppError::BadRequest("file has no extension".to_string()))?;

    if !ALLOWED_PHOTO_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "unsupported file type .{}",
            ext
        )));
    }

    Ok(ext)
}

fn check_size(bytes: &[u8]) -> AppResult<()> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("uploaded file is empty".to_string()));
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(AppError::BadRequest(format!(
            "file exceeds the {} byte limit",
            MAX_PHOTO_BYTES
        )));
    }
    Ok(())
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store_user_picture(
        &self,
        user_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> AppResult<String> {
        check_size(bytes)?;
        let ext = checked_extension(filename)?;
        // One picture per user; a re-upload replaces it
        let relative = PathBuf::from("users")
            .join(user_id.to_string())
            .join(format!("picture.{}", ext));
        self.write(&relative, bytes).await
    }

    async fn store_listing_photo(
        &self,
        listing_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> AppResult<String> {
        check_size(bytes)?;
        let ext = checked_extension(filename)?;
        let relative = PathBuf::from("listings")
            .join(listing_id.to_string())
            .join(format!("{}.{}", Uuid::new_v4(), ext));
        self.write(&relative, bytes).await
    }
}
