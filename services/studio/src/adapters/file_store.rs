//! services/studio/src/adapters/file_store.rs
//!
//! This module contains the on-disk key-value store, the concrete implementation
//! of the `KeyValueStore` port used by the CLI. Each key is one file under the
//! data directory; writes go to a sibling temp file and are renamed into place.

use qr_studio_core::ports::{KeyValueStore, PortError, PortResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A key-value store that keeps one file per key in a directory.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a new `FileKeyValueStore`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Maps a key to a safe file stem.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> PortError {
    PortError::Unexpected(format!("failed to {} {}: {}", action, path.display(), e))
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| io_error("create", &self.root, e))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| io_error("write", &tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error("replace", &path, e))?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove", &path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn set_replaces_prior_value() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert!(!dir.path().join("nested").join("k.json.tmp").exists());
    }

    #[test]
    fn remove_deletes_file_and_tolerates_absence() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert!(!dir.path().join("k.json").exists());
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        store.set("../evil/key", "v").unwrap();
        assert!(dir.path().join(".._evil_key.json").exists());
    }
}
