//! Persistence of the best brain between runs.
//!
//! Brains are stored as JSON text so the same format works for a file on disk and for the
//! browser's local storage.

use crate::error::{SimResult, SimulationError};
use crate::network::NeuralNetwork;
use std::path::PathBuf;

/// The key (or file stem) under which the best brain is stored.
pub const BRAIN_KEY: &str = "bestBrain";

/// Somewhere a single brain can be kept.
pub trait BrainStore {
    /// Returns the stored brain, `None` if nothing was saved yet.
    fn load(&mut self) -> SimResult<Option<NeuralNetwork>>;

    /// Replaces the stored brain.
    fn save(&mut self, brain: &NeuralNetwork) -> SimResult<()>;

    /// Forgets the stored brain. Discarding an empty store is fine.
    fn discard(&mut self) -> SimResult<()>;
}

/// Keeps the brain text in memory only.
#[derive(Default)]
pub struct MemoryBrainStore {
    stored: Option<String>,
}

impl BrainStore for MemoryBrainStore {
    fn load(&mut self) -> SimResult<Option<NeuralNetwork>> {
        self.stored
            .as_deref()
            .map(NeuralNetwork::from_json)
            .transpose()
    }

    fn save(&mut self, brain: &NeuralNetwork) -> SimResult<()> {
        self.stored = Some(brain.to_json()?);
        Ok(())
    }

    fn discard(&mut self) -> SimResult<()> {
        self.stored = None;
        Ok(())
    }
}

/// Keeps the brain in a JSON file.
pub struct FileBrainStore {
    path: PathBuf,
}

impl FileBrainStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBrainStore { path: path.into() }
    }

    /// The default location `bestBrain.json` in the working directory.
    pub fn in_working_dir() -> Self {
        Self::new(format!("{BRAIN_KEY}.json"))
    }
}

impl BrainStore for FileBrainStore {
    fn load(&mut self) -> SimResult<Option<NeuralNetwork>> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => NeuralNetwork::from_json(&json).map(Some),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SimulationError::Storage(format!(
                "failed to read {}: {error}",
                self.path.display()
            ))),
        }
    }

    fn save(&mut self, brain: &NeuralNetwork) -> SimResult<()> {
        std::fs::write(&self.path, brain.to_json()?).map_err(|error| {
            SimulationError::Storage(format!("failed to write {}: {error}", self.path.display()))
        })?;
        tracing::info!(path = %self.path.display(), "Saved best brain.");
        Ok(())
    }

    fn discard(&mut self) -> SimResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Discarded stored brain.");
                Ok(())
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SimulationError::Storage(format!(
                "failed to remove {}: {error}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brain() -> NeuralNetwork {
        let mut rng = fastrand::Rng::with_seed(21);
        NeuralNetwork::new(&[5, 6, 4], &mut rng).unwrap()
    }

    #[test]
    fn memory_store_lifecycle() {
        let mut store = MemoryBrainStore::default();
        assert!(store.load().unwrap().is_none());
        store.save(&brain()).unwrap();
        assert_eq!(store.load().unwrap(), Some(brain()));
        store.discard().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_lifecycle() {
        let path = std::env::temp_dir().join(format!(
            "brain-store-test-{}-{}.json",
            std::process::id(),
            fastrand::u64(..)
        ));
        let mut store = FileBrainStore::new(&path);
        assert!(store.load().unwrap().is_none());
        store.save(&brain()).unwrap();
        assert_eq!(store.load().unwrap(), Some(brain()));
        store.discard().unwrap();
        assert!(!path.exists());
        store.discard().unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "brain-store-corrupt-{}-{}.json",
            std::process::id(),
            fastrand::u64(..)
        ));
        std::fs::write(&path, "{ nope").unwrap();
        let mut store = FileBrainStore::new(&path);
        assert!(store.load().is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
