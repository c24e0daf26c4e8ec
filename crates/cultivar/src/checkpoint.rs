//! Named-blob checkpoint store.
//!
//! Each network persists its parameter set as one opaque blob keyed by the
//! network's name; the training session writes all six blobs whenever the
//! trailing reward average improves.

use std::fs;
use std::path::{Path, PathBuf};

use crate::net::HasVarStore;
use crate::Result;

/// Directory-backed store of named parameter blobs (`<dir>/<name>.ot`).
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open a store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Get the store directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a blob exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.blob_path(name).exists()
    }

    /// Write `net`'s parameters under `name`, replacing any previous blob.
    pub fn save<N: HasVarStore>(&self, name: &str, net: &N) -> Result<()> {
        let path = self.blob_path(name);
        net.var_store().save(&path)?;
        tracing::debug!(name, path = %path.display(), "Saved parameter blob");
        Ok(())
    }

    /// Restore `net`'s parameters from the blob stored under `name`.
    pub fn load<N: HasVarStore>(&self, name: &str, net: &mut N) -> Result<()> {
        let path = self.blob_path(name);
        net.var_store_mut().load(&path)?;
        tracing::debug!(name, path = %path.display(), "Loaded parameter blob");
        Ok(())
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.ot", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{ActorNetwork, HasVarStore};
    use tch::Device;
    use tempfile::tempdir;

    #[test]
    fn test_store_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("runs").join("best");
        let store = CheckpointStore::new(&nested).unwrap();

        assert!(nested.is_dir());
        assert!(!store.contains("actor"));
    }

    #[test]
    fn test_blob_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();

        let saved = ActorNetwork::new(3, 2, 8, 8, 1e-3, Device::Cpu).unwrap();
        store.save("actor", &saved).unwrap();
        assert!(store.contains("actor"));

        let mut restored = ActorNetwork::new(3, 2, 8, 8, 1e-3, Device::Cpu).unwrap();
        store.load("actor", &mut restored).unwrap();

        let expected = saved.var_store().variables();
        for (name, tensor) in restored.var_store().variables() {
            assert!(tensor.equal(expected.get(&name).unwrap()), "{} differs", name);
        }
    }
}
