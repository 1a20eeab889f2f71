use std::sync::Arc;

use roomsvital_core::RoomId;
use roomsvital_storage::{Collection, DocumentStore, StorageError};

use crate::decision::{Confirmer, Decision, Prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Vacant,
    Occupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Fresh,
    Overwrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Proceed(WriteKind),
    Abort,
}

/// Existence check and overwrite gate for create. Never merges.
pub struct ConflictResolver {
    store: Arc<dyn DocumentStore>,
}

impl ConflictResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn check(&self, id: &RoomId) -> Result<Existence, StorageError> {
        let existing = self.store.get(Collection::Rooms, id.as_str()).await?;
        Ok(if existing.is_some() {
            Existence::Occupied
        } else {
            Existence::Vacant
        })
    }

    pub fn gate(&self, id: &RoomId, existence: Existence, confirmer: &dyn Confirmer) -> Resolution {
        match existence {
            Existence::Vacant => Resolution::Proceed(WriteKind::Fresh),
            Existence::Occupied => {
                match confirmer.decide(&Prompt::Overwrite { id: id.clone() }) {
                    Decision::Confirm => Resolution::Proceed(WriteKind::Overwrite),
                    Decision::Decline => Resolution::Abort,
                }
            }
        }
    }

    pub async fn resolve(
        &self,
        id: &RoomId,
        confirmer: &dyn Confirmer,
    ) -> Result<Resolution, StorageError> {
        let existence = self.check(id).await?;
        Ok(self.gate(id, existence, confirmer))
    }
}
