use std::path::PathBuf;

use crate::error::{Error, Result};

/// Storage backing the license catalog and content files.
///
/// The catalog code only ever asks for whole files by name: the two JSON
/// documents ([`crate::catalog::LIST_LICENSES`],
/// [`crate::catalog::LIST_EXCEPTIONS`]) and the per-license `.txt` bodies.
pub trait AssetStore {
    fn get(&self, name: &str) -> Result<Vec<u8>>;
}

/// Asset store reading from a flat directory on disk.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetStore for DirStore {
    fn get(&self, name: &str) -> Result<Vec<u8>> {
        if name.is_empty() {
            return Err(Error::AssetMissing(String::new()));
        }

        let path = self.root.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::AssetMissing(name.to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("MIT.txt"), b"MIT License").unwrap();

        let store = DirStore::new(dir.path());
        assert_eq!(store.get("MIT.txt").unwrap(), b"MIT License");
    }

    #[test]
    fn test_get_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path());

        match store.get("nope.txt") {
            Err(Error::AssetMissing(name)) => assert_eq!(name, "nope.txt"),
            other => panic!("expected AssetMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_get_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path());
        assert!(matches!(store.get(""), Err(Error::AssetMissing(_))));
    }
}
