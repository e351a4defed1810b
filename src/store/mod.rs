mod error;
mod file;
mod memory;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::StoreError;
pub use file::FileCollection;
pub use memory::MemoryCollection;

use crate::config::StorageConfig;

/// A document persisted under a numeric catalog key.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn key(&self) -> u32;
}

/// Keyed document collection. Writes replace whole documents; a reader sees either the
/// old or the new version of any single document.
pub trait Collection<T: Document>: Send + Sync {
    /// Upserts every document and returns how many were written.
    fn upsert_all(&self, documents: &[T]) -> Result<usize, StoreError>;

    fn upsert(&self, document: &T) -> Result<(), StoreError> {
        self.upsert_all(std::slice::from_ref(document)).map(|_| ())
    }

    fn find(&self, key: u32) -> Result<Option<T>, StoreError>;

    /// All documents, ordered by key.
    fn find_all(&self) -> Result<Vec<T>, StoreError>;
}

pub type SharedCollection<T> = Arc<dyn Collection<T>>;

pub fn open_collection<T: Document>(
    config: &StorageConfig,
) -> Result<SharedCollection<T>, StoreError> {
    match config {
        StorageConfig::Memory => Ok(Arc::new(MemoryCollection::<T>::new())),
        StorageConfig::File { base_folder } => {
            Ok(Arc::new(FileCollection::<T>::open(base_folder.clone())?))
        }
    }
}
