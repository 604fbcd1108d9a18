use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// Upper bound for every image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Image storage collaborator. Objects are addressed by a relative key on
/// upload and by their public URL afterwards.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` and return its public URL.
    async fn upload(&self, data: Bytes, content_type: &str, key: &str) -> Result<String>;

    /// Remove the object behind `url`. Missing objects are not an error.
    async fn delete(&self, url: &str) -> Result<()>;
}

/// `<folder>/<uuid>.<ext>` with the extension taken from the MIME type.
pub fn object_key(folder: &str, content_type: &str) -> String {
    let ext = match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    };
    format!("{}/{}.{}", folder, Uuid::new_v4(), ext)
}

/// Rejects empty or oversize uploads and content types outside `allowed`.
pub fn check_image(data: &[u8], content_type: &str, allowed: &[&str]) -> ServiceResult<()> {
    if !allowed.contains(&content_type) {
        return Err(ServiceError::BadRequest(format!(
            "Invalid file type. Allowed types: {}",
            allowed.join(", ")
        )));
    }
    if data.is_empty() {
        return Err(ServiceError::BadRequest("No image file provided".into()));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(ServiceError::BadRequest(
            "File too large. Maximum size is 5MB".into(),
        ));
    }
    Ok(())
}

/// Objects stored as plain files under one directory, served back by the
/// HTTP layer under `public_url`.
pub struct LocalObjectStore {
    dir: PathBuf,
    public_url: String,
}

impl LocalObjectStore {
    pub async fn new(dir: PathBuf, public_url: &str) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Object storage directory: {}", dir.display());
        Ok(Self {
            dir,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!("Invalid object key '{}'", key);
        }
        Ok(self.dir.join(relative))
    }

    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_url)?.strip_prefix('/')
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, data: Bytes, content_type: &str, key: &str) -> Result<String> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &data).await?;

        info!("Stored {} ({} bytes, {})", key, data.len(), content_type);
        Ok(format!("{}/{}", self.public_url, key))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let Some(key) = self.key_for_url(url) else {
            warn!("Not deleting {}: outside object storage", url);
            return Ok(());
        };
        let path = match self.object_path(key) {
            Ok(path) => path,
            Err(e) => {
                warn!("Not deleting {}: {}", url, e);
                return Ok(());
            }
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted object {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Object {} already gone", key);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
