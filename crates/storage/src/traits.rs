use async_trait::async_trait;

use roomsvital_core::field_value::Document;

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Rooms,
    Admins,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rooms => "rooms",
            Self::Admins => "admins",
        }
    }
}

/// Keyed document service addressed by collection + id.
///
/// Each call is atomic per document. No ordering is promised between
/// concurrent calls on the same id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StorageError>;

    /// Replaces the whole document, creating it if absent.
    async fn set(&self, collection: Collection, id: &str, doc: Document) -> Result<(), StorageError>;

    /// Merges `fields` into an existing document.
    /// Fails with [`StorageError::NotFound`] when there is no document at `id`.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<(), StorageError>;

    /// Removes the document. Deleting a missing document is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StorageError>;

    async fn list(&self, collection: Collection) -> Result<Vec<(String, Document)>, StorageError>;
}
