use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;

use log::error;

use super::{Collection, Document, StoreError};

/// One JSON file per document under `<base>/<collection>/<key>.json`.
///
/// Documents are written to a temporary file and renamed into place, so readers never
/// observe a partially written document.
pub struct FileCollection<T> {
    folder: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> FileCollection<T> {
    pub fn open(base: PathBuf) -> Result<Self, StoreError> {
        let folder = base.join(T::COLLECTION);
        fs::create_dir_all(&folder)?;
        Ok(FileCollection {
            folder,
            _marker: PhantomData,
        })
    }

    fn document_path(&self, key: u32) -> PathBuf {
        self.folder.join(format!("{}.json", key))
    }

    fn write_document(&self, document: &T) -> Result<(), StoreError> {
        let content = serde_json::to_vec(document)?;
        let tmp_path = self
            .folder
            .join(format!(".{}.{}.tmp", document.key(), uuid::Uuid::new_v4()));
        fs::write(&tmp_path, content)?;
        if let Err(e) = fs::rename(&tmp_path, self.document_path(document.key())) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

impl<T: Document> Collection<T> for FileCollection<T> {
    fn upsert_all(&self, documents: &[T]) -> Result<usize, StoreError> {
        for document in documents {
            self.write_document(document)?;
        }
        Ok(documents.len())
    }

    fn find(&self, key: u32) -> Result<Option<T>, StoreError> {
        let path = self.document_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&content)?))
    }

    fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let mut documents = Vec::new();
        for entry in self.folder.read_dir()? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let content = match fs::read(&path) {
                Ok(content) => content,
                Err(e) => {
                    error!("Failed to read document {}: {}", path.display(), e);
                    continue;
                }
            };

            match serde_json::from_slice::<T>(&content) {
                Ok(document) => documents.push(document),
                Err(e) => error!("Failed to decode document {}: {}", path.display(), e),
            }
        }

        documents.sort_by_key(|d| d.key());
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{note, Note};

    #[test]
    fn documents_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        {
            let collection = FileCollection::<Note>::open(dir.path().to_path_buf()).unwrap();
            collection
                .upsert_all(&[note(7, "seven"), note(3, "three")])
                .unwrap();
            collection.upsert(&note(7, "replaced")).unwrap();
        }

        let reopened = FileCollection::<Note>::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.find(7).unwrap(), Some(note(7, "replaced")));
        assert_eq!(reopened.find(8).unwrap(), None);
        assert_eq!(
            reopened.find_all().unwrap(),
            vec![note(3, "three"), note(7, "replaced")]
        );
    }

    #[test]
    fn find_all_skips_corrupt_documents() {
        let dir = tempfile::tempdir().unwrap();
        let collection = FileCollection::<Note>::open(dir.path().to_path_buf()).unwrap();
        collection.upsert(&note(1, "ok")).unwrap();
        fs::write(dir.path().join("notes").join("2.json"), b"{not json").unwrap();

        assert_eq!(collection.find_all().unwrap(), vec![note(1, "ok")]);
        assert!(collection.find(2).is_err());
    }
}
