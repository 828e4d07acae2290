//! Image store implementations.
//!
//! Both stores generate a fresh UUID per image and never overwrite or
//! delete an image once saved.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::Image;
use crate::repository::ImageStore;

/// Keeps image bytes in memory, keyed by image id
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    images: RwLock<HashMap<String, Image>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, image_id: &str) -> StoreResult<Option<Image>> {
        Ok(self.images.read()?.get(image_id).cloned())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.images.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn save(&self, laptop_id: &str, image_type: &str, data: Vec<u8>) -> StoreResult<String> {
        let image_id = Uuid::new_v4().to_string();
        let image = Image {
            laptop_id: laptop_id.to_string(),
            image_type: image_type.to_string(),
            data,
        };
        self.images.write()?.insert(image_id.clone(), image);
        debug!(%image_id, "Stored image in memory");
        Ok(image_id)
    }
}

/// Metadata for an image written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub laptop_id: String,
    pub image_type: String,
    pub path: PathBuf,
}

/// Writes each image to `<dir>/<image id><image type>`
///
/// The file is written before the metadata lock is taken, so concurrent
/// uploads only contend on the map insert.
#[derive(Debug)]
pub struct DiskImageStore {
    dir: PathBuf,
    images: RwLock<HashMap<String, StoredImage>>,
}

impl DiskImageStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            images: RwLock::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self, image_id: &str) -> StoreResult<Option<StoredImage>> {
        Ok(self.images.read()?.get(image_id).cloned())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.images.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn save(&self, laptop_id: &str, image_type: &str, data: Vec<u8>) -> StoreResult<String> {
        let image_id = Uuid::new_v4().to_string();
        let path = self.dir.join(format!("{image_id}{image_type}"));

        tokio::fs::write(&path, &data).await?;

        let stored = StoredImage {
            laptop_id: laptop_id.to_string(),
            image_type: image_type.to_string(),
            path,
        };
        debug!(%image_id, path = %stored.path.display(), "Wrote image to disk");
        self.images.write()?.insert(image_id.clone(), stored);
        Ok(image_id)
    }
}
