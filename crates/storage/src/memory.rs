use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use roomsvital_core::field_value::Document;

use crate::error::StorageError;
use crate::traits::{Collection, DocumentStore};

/// In-process document store. Contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<(Collection, String), Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.docs
            .lock()
            .keys()
            .filter(|(c, _)| *c == collection)
            .count()
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StorageError> {
        Ok(self.docs.lock().get(&(collection, id.to_string())).cloned())
    }

    async fn set(&self, collection: Collection, id: &str, doc: Document) -> Result<(), StorageError> {
        self.docs.lock().insert((collection, id.to_string()), doc);
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<(), StorageError> {
        let mut docs = self.docs.lock();
        match docs.get_mut(&(collection, id.to_string())) {
            Some(doc) => {
                doc.extend(fields);
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("{}/{id}", collection.as_str()))),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StorageError> {
        self.docs.lock().remove(&(collection, id.to_string()));
        Ok(())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<(String, Document)>, StorageError> {
        Ok(self
            .docs
            .lock()
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|((_, id), doc)| (id.clone(), doc.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomsvital_core::FieldValue;

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let mut fields = Document::new();
        fields.insert("isLocked".into(), FieldValue::Boolean(true));
        let result = store.update(Collection::Rooms, "12", fields).await;
        assert!(matches!(result, Err(StorageError::NotFound(ref key)) if key == "rooms/12"));
    }

    #[tokio::test]
    async fn collections_are_disjoint() -> Result<(), StorageError> {
        let store = MemoryStore::new();
        store.set(Collection::Rooms, "a", Document::new()).await?;
        store.set(Collection::Admins, "a", Document::new()).await?;
        store.delete(Collection::Rooms, "a").await?;
        assert!(store.is_empty(Collection::Rooms));
        assert_eq!(store.len(Collection::Admins), 1);
        Ok(())
    }
}
