use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{Collection, Document, StoreError};

pub struct MemoryCollection<T> {
    documents: RwLock<BTreeMap<u32, T>>,
}

impl<T: Document> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Document> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> Collection<T> for MemoryCollection<T> {
    fn upsert_all(&self, documents: &[T]) -> Result<usize, StoreError> {
        let mut locked = self
            .documents
            .write()
            .map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        for document in documents {
            locked.insert(document.key(), document.clone());
        }
        Ok(documents.len())
    }

    fn find(&self, key: u32) -> Result<Option<T>, StoreError> {
        let locked = self
            .documents
            .read()
            .map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        Ok(locked.get(&key).cloned())
    }

    fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let locked = self
            .documents
            .read()
            .map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        Ok(locked.values().cloned().collect())
    }
}
