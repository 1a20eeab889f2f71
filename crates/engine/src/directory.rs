use std::sync::Arc;

use parking_lot::Mutex;

use roomsvital_core::{RoomId, RoomRecord};
use roomsvital_storage::{Collection, DocumentStore};

use crate::cache::{DirectoryView, RoomCache};
use crate::error::EngineError;
use crate::paging::{Page, Pagination};

/// Local cache of the `rooms` collection with search and paging.
///
/// Cache writes come only from `refresh`/`search` here and from the
/// mutator's lock toggle through the crate-private helpers. Locks are
/// released before every await.
pub struct RoomDirectory {
    store: Arc<dyn DocumentStore>,
    cache: Mutex<RoomCache>,
    paging: Mutex<Pagination>,
}

impl RoomDirectory {
    pub fn new(store: Arc<dyn DocumentStore>, paging: Pagination) -> Self {
        Self {
            store,
            cache: Mutex::new(RoomCache::new()),
            paging: Mutex::new(paging),
        }
    }

    /// Fetches every room and replaces the cache with the result.
    /// On failure the cache keeps its previous contents.
    pub async fn refresh(&self) -> Result<usize, EngineError> {
        let docs = self.store.list(Collection::Rooms).await.inspect_err(|e| {
            tracing::warn!(error = %e, "room fetch failed, keeping cached rooms");
        })?;
        let records: Vec<RoomRecord> = docs
            .into_iter()
            .map(|(id, doc)| RoomRecord::from_document(RoomId::new(id), &doc))
            .collect();
        let count = records.len();
        self.cache.lock().replace(records);
        self.paging.lock().reset();
        tracing::debug!(count, "room cache replaced");
        Ok(count)
    }

    /// `Some(record)` narrows the view to that record. `None` clears the
    /// search by fetching everything again.
    pub async fn search(&self, pick: Option<&RoomRecord>) -> Result<DirectoryView, EngineError> {
        match pick {
            Some(record) => {
                let view = {
                    let mut cache = self.cache.lock();
                    if !cache.filter(&record.id) {
                        return Err(EngineError::RoomNotFound(record.id.to_string()));
                    }
                    cache.view().clone()
                };
                self.paging.lock().reset();
                tracing::debug!(room_id = %record.id, "directory filtered");
                Ok(view)
            }
            None => {
                self.refresh().await?;
                Ok(self.view())
            }
        }
    }

    /// Visible records whose name contains `input`, ignoring case.
    pub fn suggestions(&self, input: &str) -> Vec<RoomRecord> {
        let needle = input.to_lowercase();
        self.cache
            .lock()
            .visible()
            .into_iter()
            .filter(|r| !r.name.is_empty() && r.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// First visible record named exactly `name`.
    pub fn find_by_name(&self, name: &str) -> Option<RoomRecord> {
        self.cache.lock().visible().into_iter().find(|r| r.name == name)
    }

    pub fn get(&self, id: &RoomId) -> Option<RoomRecord> {
        self.cache.lock().get(id).cloned()
    }

    /// The full backing set, regardless of view.
    pub fn records(&self) -> Vec<RoomRecord> {
        self.cache.lock().records().to_vec()
    }

    pub fn visible(&self) -> Vec<RoomRecord> {
        self.cache.lock().visible()
    }

    pub fn view(&self) -> DirectoryView {
        self.cache.lock().view().clone()
    }

    pub fn refresh_count(&self) -> u64 {
        self.cache.lock().generation()
    }

    // ========================================================================
    // Paging
    // ========================================================================

    pub fn current_page(&self) -> Page<RoomRecord> {
        let visible = self.visible();
        Page::cut(&self.paging.lock(), &visible)
    }

    pub fn set_page(&self, page: usize) {
        let total = self.cache.lock().visible().len();
        self.paging.lock().set_page(page, total);
    }

    pub fn set_rows_per_page(&self, rows_per_page: usize) -> Result<(), EngineError> {
        self.paging.lock().set_rows_per_page(rows_per_page)
    }

    // ========================================================================
    // Lock toggle support
    // ========================================================================

    pub(crate) fn set_locked(&self, id: &RoomId, is_locked: bool) -> Option<bool> {
        self.cache.lock().set_locked(id, is_locked)
    }

    /// Flips the cached flag in one step and returns the value it replaced.
    pub(crate) fn toggle_locked(&self, id: &RoomId) -> Option<bool> {
        self.cache.lock().toggle_locked(id)
    }
}
