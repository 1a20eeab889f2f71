use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};

use roomsvital_core::Document;
use roomsvital_storage::{Collection, DocumentStore, MemoryStore, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Set,
    Update,
    Delete,
    List,
}

/// How a held call is let go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Run the call against the wrapped store.
    Apply,
    /// Fail without touching the wrapped store.
    Fail,
}

struct Held {
    op: StoreOp,
    id: String,
    release: Option<oneshot::Sender<Release>>,
}

/// A store wrapper that can fail or park calls on demand.
///
/// Parked calls are numbered by arrival and released one at a time, so a
/// test decides the order responses come back in.
pub struct FlakyStore {
    inner: Arc<dyn DocumentStore>,
    failing: Mutex<HashSet<StoreOp>>,
    holding: Mutex<HashSet<StoreOp>>,
    held: Mutex<Vec<Held>>,
    arrived: watch::Sender<usize>,
    settled: watch::Sender<usize>,
    calls: Mutex<Vec<(StoreOp, String)>>,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            holding: Mutex::new(HashSet::new()),
            held: Mutex::new(Vec::new()),
            arrived: watch::Sender::new(0),
            settled: watch::Sender::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The wrapped store, for seeding and inspection without faults.
    pub fn inner(&self) -> &Arc<dyn DocumentStore> {
        &self.inner
    }

    pub fn fail(&self, op: StoreOp) {
        self.failing.lock().insert(op);
    }

    pub fn heal(&self, op: StoreOp) {
        self.failing.lock().remove(&op);
    }

    pub fn hold(&self, op: StoreOp) {
        self.holding.lock().insert(op);
    }

    /// Every call seen so far, in arrival order.
    pub fn calls(&self) -> Vec<(StoreOp, String)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, op: StoreOp) -> usize {
        self.calls.lock().iter().filter(|(o, _)| *o == op).count()
    }

    /// `(op, id)` of the parked call with arrival number `index`.
    /// Operation and id of the parked call `index`.
    pub fn held_call(&self, index: usize) -> Option<(StoreOp, String)> {
        self.held.lock().get(index).map(|h| (h.op, h.id.clone()))
    }

    /// Waits until `count` calls have been parked in total.
    pub async fn wait_held(&self, count: usize) {
        let mut rx = self.arrived.subscribe();
        let _ = rx.wait_for(|n| *n >= count).await;
    }

    /// Waits until `count` parked calls have finished, including whatever
    /// the caller did with the response before its next await.
    pub async fn wait_settled(&self, count: usize) {
        let mut rx = self.settled.subscribe();
        let _ = rx.wait_for(|n| *n >= count).await;
    }

    /// Lets the parked call `index` go. Returns false if there is no such
    /// call or it was already released.
    pub fn release(&self, index: usize, release: Release) -> bool {
        let sender = self
            .held
            .lock()
            .get_mut(index)
            .and_then(|h| h.release.take());
        match sender {
            Some(tx) => tx.send(release).is_ok(),
            None => false,
        }
    }

    async fn admit(&self, op: StoreOp, id: &str) -> Result<bool, StorageError> {
        self.calls.lock().push((op, id.to_string()));

        if self.holding.lock().contains(&op) {
            let (tx, rx) = oneshot::channel();
            self.held.lock().push(Held {
                op,
                id: id.to_string(),
                release: Some(tx),
            });
            self.arrived.send_modify(|n| *n += 1);
            return match rx.await {
                Ok(Release::Apply) => Ok(true),
                Ok(Release::Fail) | Err(_) => {
                    self.settled.send_modify(|n| *n += 1);
                    Err(unavailable(op, id))
                }
            };
        }

        if self.failing.lock().contains(&op) {
            return Err(unavailable(op, id));
        }
        Ok(false)
    }

    fn finish<T>(&self, was_held: bool, result: Result<T, StorageError>) -> Result<T, StorageError> {
        if was_held {
            self.settled.send_modify(|n| *n += 1);
        }
        result
    }
}

fn unavailable(op: StoreOp, id: &str) -> StorageError {
    StorageError::Unavailable(format!("injected {op:?} failure for {id}"))
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StorageError> {
        let held = self.admit(StoreOp::Get, id).await?;
        let result = self.inner.get(collection, id).await;
        self.finish(held, result)
    }

    async fn set(&self, collection: Collection, id: &str, doc: Document) -> Result<(), StorageError> {
        let held = self.admit(StoreOp::Set, id).await?;
        let result = self.inner.set(collection, id, doc).await;
        self.finish(held, result)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<(), StorageError> {
        let held = self.admit(StoreOp::Update, id).await?;
        let result = self.inner.update(collection, id, fields).await;
        self.finish(held, result)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StorageError> {
        let held = self.admit(StoreOp::Delete, id).await?;
        let result = self.inner.delete(collection, id).await;
        self.finish(held, result)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<(String, Document)>, StorageError> {
        let held = self.admit(StoreOp::List, collection.as_str()).await?;
        let result = self.inner.list(collection).await;
        self.finish(held, result)
    }
}
