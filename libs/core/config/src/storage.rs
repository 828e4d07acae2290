use crate::{env_or_default, ConfigError, FromEnv};
use std::path::PathBuf;
use std::str::FromStr;

/// Where uploaded laptop images are kept
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ImageBackend {
    /// Images live in process memory and are lost on restart
    #[default]
    Memory,
    /// Images are written as files under `ImageStoreConfig::dir`
    Disk,
}

impl FromStr for ImageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(ImageBackend::Memory),
            "disk" => Ok(ImageBackend::Disk),
            other => Err(format!("unknown image backend '{}', expected memory or disk", other)),
        }
    }
}

/// Image store configuration
#[derive(Clone, Debug)]
pub struct ImageStoreConfig {
    pub backend: ImageBackend,
    pub dir: PathBuf,
}

impl ImageStoreConfig {
    pub fn memory() -> Self {
        Self {
            backend: ImageBackend::Memory,
            dir: PathBuf::from("img"),
        }
    }

    pub fn disk(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: ImageBackend::Disk,
            dir: dir.into(),
        }
    }
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self::memory()
    }
}

impl FromEnv for ImageStoreConfig {
    /// Reads from environment variables:
    /// - IMAGE_STORE: "memory" or "disk" (default: memory)
    /// - IMAGE_DIR: target folder for the disk backend (default: img)
    fn from_env() -> Result<Self, ConfigError> {
        let backend = env_or_default("IMAGE_STORE", "memory")
            .parse()
            .map_err(|details| ConfigError::ParseError {
                key: "IMAGE_STORE".to_string(),
                details,
            })?;
        let dir = PathBuf::from(env_or_default("IMAGE_DIR", "img"));

        Ok(Self { backend, dir })
    }
}
