//! Local file storage for uploaded images.
//!
//! Files live under `{root}/{bucket}/...` and are served by the storefront
//! at `{public_base}/uploads/{bucket}/...`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;
use thiserror::Error;

use soko_core::UserId;

const MB: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("file exceeds the {max_mb} MB limit")]
    TooLarge { max_mb: usize },

    #[error("file is empty")]
    Empty,

    #[error("unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("invalid folder name")]
    InvalidFolder,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A storage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Avatars,
    BrandImages,
    CategoryImages,
    ProductImages,
}

impl Bucket {
    pub const ALL: [Self; 4] = [
        Self::Avatars,
        Self::BrandImages,
        Self::CategoryImages,
        Self::ProductImages,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avatars => "avatars",
            Self::BrandImages => "brand-images",
            Self::CategoryImages => "category-images",
            Self::ProductImages => "product-images",
        }
    }

    /// Largest accepted upload, in bytes.
    #[must_use]
    pub const fn max_bytes(self) -> usize {
        match self {
            Self::Avatars => 2 * MB,
            _ => 5 * MB,
        }
    }

    /// File extension for an accepted content type.
    fn extension_for(self, content_type: &str) -> Option<&'static str> {
        let ext = match content_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => return None,
        };
        match self {
            Self::Avatars if !matches!(ext, "jpg" | "png") => None,
            _ => Some(ext),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| StorageError::UnknownBucket(s.to_owned()))
    }
}

/// Location of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    /// Path relative to the bucket.
    pub path: String,
    /// Public URL.
    pub url: String,
}

/// Disk-backed bucket store.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    public_base: String,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Public URL for a path inside a bucket.
    #[must_use]
    pub fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!("{}/uploads/{bucket}/{path}", self.public_base)
    }

    /// Store a user's avatar as `{user_id}_{unix_millis}.{ext}`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file is empty, too large, not JPEG/PNG, or cannot be written.
    pub async fn save_avatar(
        &self,
        user_id: UserId,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        let ext = check(Bucket::Avatars, content_type, bytes)?;
        let name = format!("{user_id}_{}.{ext}", Utc::now().timestamp_millis());
        self.write(Bucket::Avatars, name, bytes).await
    }

    /// Store an image as `[{folder}/]{unix_millis}-{random8}.{ext}`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file is rejected or cannot be written.
    pub async fn save(
        &self,
        bucket: Bucket,
        folder: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        let ext = check(bucket, content_type, bytes)?;
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        let name = format!("{}-{suffix}.{ext}", Utc::now().timestamp_millis());

        let path = match folder.map(str::trim).filter(|f| !f.is_empty()) {
            Some(folder) => {
                validate_folder(folder)?;
                format!("{folder}/{name}")
            }
            None => name,
        };
        self.write(bucket, path, bytes).await
    }

    async fn write(
        &self,
        bucket: Bucket,
        path: String,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        let full = self.root.join(bucket.as_str()).join(&path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        tracing::info!(bucket = %bucket, path = %path, size = bytes.len(), "File stored");

        Ok(StoredFile {
            url: self.public_url(bucket, &path),
            path,
        })
    }
}

fn check(bucket: Bucket, content_type: &str, bytes: &[u8]) -> Result<&'static str, StorageError> {
    if bytes.is_empty() {
        return Err(StorageError::Empty);
    }
    if bytes.len() > bucket.max_bytes() {
        return Err(StorageError::TooLarge {
            max_mb: bucket.max_bytes() / MB,
        });
    }
    bucket
        .extension_for(content_type)
        .ok_or_else(|| StorageError::UnsupportedType(content_type.to_owned()))
}

fn validate_folder(folder: &str) -> Result<(), StorageError> {
    let ok = folder.len() <= 64
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok { Ok(()) } else { Err(StorageError::InvalidFolder) }
}
