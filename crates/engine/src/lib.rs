pub mod cache;
pub mod config;
pub mod conflict;
pub mod decision;
pub mod directory;
pub mod error;
pub mod lock;
pub mod mutator;
pub mod notice;
pub mod paging;

pub use cache::{DirectoryView, RoomCache};
pub use config::{ConnectionConfig, LockOrdering, RegistryConfig};
pub use conflict::{ConflictResolver, Existence, Resolution, WriteKind};
pub use decision::{Confirmer, Decision, FixedDecision, Prompt};
pub use directory::RoomDirectory;
pub use error::EngineError;
pub use lock::{LockLedger, LockTicket};
pub use mutator::{CreateOutcome, DeleteOutcome, RecordMutator};
pub use notice::{LogNotifier, Notice, NoticeLevel, Notifier};
pub use paging::{Page, Pagination};

use std::sync::Arc;

use roomsvital_storage::DocumentStore;

/// The room registry: one directory and one mutator over a shared store.
pub struct Registry {
    directory: Arc<RoomDirectory>,
    mutator: RecordMutator,
    notifier: Arc<dyn Notifier>,
}

impl Registry {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
        config: &RegistryConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let paging = Pagination::new(config.rows_per_page, config.rows_per_page_options.clone())?;
        let directory = Arc::new(RoomDirectory::new(Arc::clone(&store), paging));
        let mutator = RecordMutator::new(
            store,
            Arc::clone(&directory),
            confirmer,
            Arc::clone(&notifier),
            config.lock_ordering,
        );
        Ok(Self {
            directory,
            mutator,
            notifier,
        })
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }

    pub fn mutator(&self) -> &RecordMutator {
        &self.mutator
    }

    /// Initial load. The cache stays empty if the fetch fails.
    pub async fn open(&self) -> Result<usize, EngineError> {
        match self.directory.refresh().await {
            Ok(count) => {
                tracing::info!(count, "registry opened");
                Ok(count)
            }
            Err(e) => {
                self.notifier.notify(Notice::error("Error", "Could not load rooms."));
                Err(e)
            }
        }
    }
}
