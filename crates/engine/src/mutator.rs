use std::sync::Arc;

use parking_lot::Mutex;

use roomsvital_core::room::lock_fields;
use roomsvital_core::{time, RoomFields, RoomId, ValidRoom, ValidationError};
use roomsvital_storage::{Collection, DocumentStore};

use crate::config::LockOrdering;
use crate::conflict::{ConflictResolver, Resolution, WriteKind};
use crate::decision::{Confirmer, Decision, Prompt};
use crate::directory::RoomDirectory;
use crate::error::EngineError;
use crate::lock::LockLedger;
use crate::notice::{Notice, Notifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(RoomId),
    Overwritten(RoomId),
    /// The room existed and the overwrite was declined. Nothing was written.
    Declined(RoomId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(RoomId),
    Declined(RoomId),
}

/// Create/update/delete/lock against the store, keeping the directory in
/// step.
///
/// Only the lock toggle touches the cache before the store answers; every
/// other mutation writes first and then re-fetches the directory.
pub struct RecordMutator {
    store: Arc<dyn DocumentStore>,
    directory: Arc<RoomDirectory>,
    resolver: ConflictResolver,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
    locks: Mutex<LockLedger>,
}

impl RecordMutator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        directory: Arc<RoomDirectory>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
        lock_ordering: LockOrdering,
    ) -> Self {
        Self {
            resolver: ConflictResolver::new(Arc::clone(&store)),
            store,
            directory,
            confirmer,
            notifier,
            locks: Mutex::new(LockLedger::new(lock_ordering)),
        }
    }

    pub fn directory(&self) -> &Arc<RoomDirectory> {
        &self.directory
    }

    /// Writes a new room under `id = roomNo`. An existing room is replaced
    /// wholesale, unlocked, only after the confirmer agrees.
    pub async fn create(&self, fields: &RoomFields) -> Result<CreateOutcome, EngineError> {
        let room = self.validate(fields)?;
        let id = room.derived_id();

        let resolution = match self.resolver.resolve(&id, self.confirmer.as_ref()).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!(room_id = %id, error = %e, "existence check failed");
                self.notify(Notice::error("Error", "Could not save the room."));
                return Err(e.into());
            }
        };
        let kind = match resolution {
            Resolution::Proceed(kind) => kind,
            Resolution::Abort => {
                tracing::info!(room_id = %id, "overwrite declined");
                return Ok(CreateOutcome::Declined(id));
            }
        };

        let doc = room.create_document(&time::now_iso());
        if let Err(e) = self.store.set(Collection::Rooms, id.as_str(), doc).await {
            tracing::warn!(room_id = %id, error = %e, "room create failed");
            self.notify(Notice::error("Error", "Could not save the room."));
            return Err(e.into());
        }
        tracing::info!(room_id = %id, ?kind, "room saved");
        self.notify(Notice::success("Submitted!", "Room has been saved."));
        self.refresh_after_write().await;

        Ok(match kind {
            WriteKind::Fresh => CreateOutcome::Created(id),
            WriteKind::Overwrite => CreateOutcome::Overwritten(id),
        })
    }

    /// Updates name, gender, room number and date of the room at `id`.
    /// The id is kept even when the room number changes.
    pub async fn update(&self, id: &RoomId, fields: &RoomFields) -> Result<(), EngineError> {
        let room = self.validate(fields)?;
        let changes = room.update_fields(&time::now_iso());
        if let Err(e) = self.store.update(Collection::Rooms, id.as_str(), changes).await {
            tracing::warn!(room_id = %id, error = %e, "room update failed");
            self.notify(Notice::error("Error", "Could not update the room."));
            return Err(e.into());
        }
        if id.as_room_no() != Some(room.room_no) {
            tracing::debug!(room_id = %id, room_no = %room.room_no, "room number now differs from id");
        }
        tracing::info!(room_id = %id, "room updated");
        self.notify(Notice::success("Updated!", "The record has been updated."));
        self.refresh_after_write().await;
        Ok(())
    }

    /// Deletes the room once the confirmer agrees.
    pub async fn delete(&self, id: &RoomId) -> Result<DeleteOutcome, EngineError> {
        if self.confirmer.decide(&Prompt::Delete { id: id.clone() }) == Decision::Decline {
            tracing::debug!(room_id = %id, "delete declined");
            return Ok(DeleteOutcome::Declined(id.clone()));
        }
        if let Err(e) = self.store.delete(Collection::Rooms, id.as_str()).await {
            tracing::warn!(room_id = %id, error = %e, "room delete failed");
            self.notify(Notice::error("Error", "Could not delete the room."));
            return Err(e.into());
        }
        tracing::info!(room_id = %id, "room deleted");
        self.notify(Notice::success("Deleted!", "The record has been deleted."));
        self.refresh_after_write().await;
        Ok(DeleteOutcome::Deleted(id.clone()))
    }

    /// Flips the cached lock at once, then stores it. A failed store call
    /// puts the cached value back (see [`LockOrdering`]). Returns the value
    /// the store accepted.
    pub async fn toggle_lock(&self, id: &RoomId) -> Result<bool, EngineError> {
        // Ledger then cache, always in that order.
        let ticket = {
            let mut locks = self.locks.lock();
            self.directory.toggle_locked(id).map(|previous| locks.issue(id, previous))
        };
        let Some(ticket) = ticket else {
            self.notify(Notice::error("Error", "Could not update the lock."));
            return Err(EngineError::RoomNotFound(id.to_string()));
        };
        let next = !ticket.previous;
        tracing::debug!(room_id = %id, is_locked = next, seq = ticket.seq, "lock applied locally");

        match self.store.update(Collection::Rooms, id.as_str(), lock_fields(next)).await {
            Ok(()) => {
                self.locks.lock().accepted(id, ticket);
                tracing::info!(room_id = %id, is_locked = next, "lock stored");
                Ok(next)
            }
            Err(e) => {
                let restored = {
                    let mut locks = self.locks.lock();
                    let restore = locks.rejected(id, ticket);
                    if let Some(value) = restore {
                        self.directory.set_locked(id, value);
                    }
                    restore
                };
                match restored {
                    Some(value) => {
                        tracing::warn!(room_id = %id, restored = value, error = %e, "lock update failed, rolled back");
                    }
                    None => {
                        tracing::warn!(room_id = %id, error = %e, "superseded lock update failed");
                    }
                }
                self.notify(Notice::error("Error", "Could not update the lock."));
                Err(e.into())
            }
        }
    }

    fn validate(&self, fields: &RoomFields) -> Result<ValidRoom, EngineError> {
        fields.validate().map_err(|e| {
            tracing::debug!(error = %e, "room form rejected");
            self.notify(validation_notice(&e));
            EngineError::from(e)
        })
    }

    /// The write already succeeded; a failed re-fetch leaves the old cache
    /// in place and is reported on its own.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.directory.refresh().await {
            tracing::warn!(error = %e, "refresh after write failed");
            self.notify(Notice::error("Error", "Could not load rooms."));
        }
    }

    fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }
}

fn validation_notice(error: &ValidationError) -> Notice {
    match error {
        ValidationError::MissingField(_) => Notice::warning("Missing info", "Please fill all fields."),
        other => Notice::warning("Invalid info", other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::FixedDecision;
    use crate::notice::NoticeLevel;
    use crate::paging::Pagination;
    use roomsvital_core::RoomNo;
    use roomsvital_storage::MemoryStore;

    #[derive(Default)]
    struct Collect(Mutex<Vec<Notice>>);

    impl Notifier for Collect {
        fn notify(&self, notice: Notice) {
            self.0.lock().push(notice);
        }
    }

    fn mutator(decision: Decision) -> (Arc<MemoryStore>, Arc<Collect>, RecordMutator) {
        let store = Arc::new(MemoryStore::new());
        let notices = Arc::new(Collect::default());
        let directory = Arc::new(RoomDirectory::new(store.clone(), Pagination::new(10, vec![10]).unwrap()));
        let mutator = RecordMutator::new(
            store.clone(),
            directory,
            Arc::new(FixedDecision(decision)),
            notices.clone(),
            LockOrdering::default(),
        );
        (store, notices, mutator)
    }

    fn form(name: &str, room_no: &str) -> RoomFields {
        RoomFields::new(name, "MALE", room_no)
    }

    #[tokio::test]
    async fn create_writes_under_room_number() -> Result<(), EngineError> {
        let (store, notices, mutator) = mutator(Decision::Confirm);
        let outcome = mutator.create(&form("Asha", "12")).await?;
        assert_eq!(outcome, CreateOutcome::Created(RoomId::new("12")));

        let doc = store.get(Collection::Rooms, "12").await?.unwrap();
        let record = roomsvital_core::RoomRecord::from_document(RoomId::new("12"), &doc);
        assert_eq!(record.room_no, Some(RoomNo::from(12)));
        assert!(!record.is_locked);
        assert_eq!(mutator.directory().records().len(), 1);
        assert_eq!(notices.0.lock()[0].title, "Submitted!");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_form_writes_nothing() -> Result<(), EngineError> {
        let (store, notices, mutator) = mutator(Decision::Confirm);
        let result = mutator.create(&form("  ", "12")).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert!(store.is_empty(Collection::Rooms));
        let notices = notices.0.lock();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert_eq!(notices[0].text, "Please fill all fields.");
        Ok(())
    }

    #[tokio::test]
    async fn declined_delete_keeps_room() -> Result<(), EngineError> {
        let (store, notices, mutator) = mutator(Decision::Decline);
        mutator.create(&form("Asha", "12")).await?;
        let outcome = mutator.delete(&RoomId::new("12")).await?;
        assert_eq!(outcome, DeleteOutcome::Declined(RoomId::new("12")));
        assert!(store.get(Collection::Rooms, "12").await?.is_some());
        assert_eq!(notices.0.lock().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_id_when_room_number_changes() -> Result<(), EngineError> {
        let (store, _, mutator) = mutator(Decision::Confirm);
        mutator.create(&form("Asha", "12")).await?;
        mutator.update(&RoomId::new("12"), &form("Asha", "14")).await?;

        assert!(store.get(Collection::Rooms, "14").await?.is_none());
        let record = mutator.directory().get(&RoomId::new("12")).unwrap();
        assert_eq!(record.room_no, Some(RoomNo::from(14)));
        Ok(())
    }

    #[tokio::test]
    async fn toggle_flips_cache_and_store() -> Result<(), EngineError> {
        let (store, notices, mutator) = mutator(Decision::Confirm);
        mutator.create(&form("Asha", "12")).await?;
        let id = RoomId::new("12");

        assert!(mutator.toggle_lock(&id).await?);
        assert!(mutator.directory().get(&id).unwrap().is_locked);
        let doc = store.get(Collection::Rooms, "12").await?.unwrap();
        assert_eq!(doc.get("isLocked").and_then(|v| v.as_boolean()), Some(true));
        // Only the create notice; a stored toggle is silent.
        assert_eq!(notices.0.lock().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn second_toggle_flips_back() -> Result<(), EngineError> {
        let (store, _, mutator) = mutator(Decision::Confirm);
        mutator.create(&form("Asha", "12")).await?;
        let id = RoomId::new("12");

        assert!(mutator.toggle_lock(&id).await?);
        assert!(!mutator.toggle_lock(&id).await?);
        assert!(!mutator.directory().get(&id).unwrap().is_locked);
        let doc = store.get(Collection::Rooms, "12").await?.unwrap();
        assert_eq!(doc.get("isLocked").and_then(|v| v.as_boolean()), Some(false));
        Ok(())
    }

    #[tokio::test]
    async fn toggle_unknown_room_fails() {
        let (_, notices, mutator) = mutator(Decision::Confirm);
        let result = mutator.toggle_lock(&RoomId::new("99")).await;
        assert!(matches!(result, Err(EngineError::RoomNotFound(_))));
        assert_eq!(notices.0.lock()[0].level, NoticeLevel::Error);
    }
}
