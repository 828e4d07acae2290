//! Single-laptop file serialization for offline inspection.
//!
//! Binary files hold the protobuf encoding of `rpc::Laptop`; JSON files hold
//! the serde form of the domain [`Laptop`].

use prost::Message;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Laptop;

#[derive(Debug, Error)]
pub enum SerializerError {
    #[error("cannot read or write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot decode protobuf laptop: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("decoded laptop is invalid: {0}")]
    Invalid(String),

    #[error("cannot convert laptop to or from JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SerializerResult<T> = Result<T, SerializerError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SerializerError + '_ {
    move |source| SerializerError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn write_binary_file(laptop: &Laptop, path: impl AsRef<Path>) -> SerializerResult<()> {
    let path = path.as_ref();
    let data = rpc::Laptop::from(laptop.clone()).encode_to_vec();
    std::fs::write(path, data).map_err(io_error(path))
}

pub fn read_binary_file(path: impl AsRef<Path>) -> SerializerResult<Laptop> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(io_error(path))?;
    let proto = rpc::Laptop::decode(data.as_slice())?;
    Laptop::try_from(proto).map_err(SerializerError::Invalid)
}

/// Pretty-printed JSON
pub fn laptop_to_json(laptop: &Laptop) -> SerializerResult<String> {
    Ok(serde_json::to_string_pretty(laptop)?)
}

pub fn write_json_file(laptop: &Laptop, path: impl AsRef<Path>) -> SerializerResult<()> {
    let path = path.as_ref();
    let json = laptop_to_json(laptop)?;
    std::fs::write(path, json).map_err(io_error(path))
}

pub fn read_json_file(path: impl AsRef<Path>) -> SerializerResult<Laptop> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(io_error(path))?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    #[test]
    fn test_binary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laptop.bin");
        let laptop = sample::new_laptop();

        write_binary_file(&laptop, &path).unwrap();
        let read = read_binary_file(&path).unwrap();

        assert_eq!(read.id, laptop.id);
        assert_eq!(read.cpu, laptop.cpu);
        assert_eq!(read.storages, laptop.storages);
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laptop.json");
        let laptop = sample::new_laptop();

        write_json_file(&laptop, &path).unwrap();
        assert_eq!(read_json_file(&path).unwrap(), laptop);
    }

    #[test]
    fn test_json_uses_readable_units() {
        let json = laptop_to_json(&sample::new_laptop()).unwrap();
        assert!(json.contains("\"gigabyte\""));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_binary_file("/definitely/not/here.bin").unwrap_err();
        assert!(matches!(err, SerializerError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.bin"));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, [0xff, 0xff, 0xff]).unwrap();
        assert!(matches!(
            read_binary_file(&path).unwrap_err(),
            SerializerError::Decode(_)
        ));
    }
}
