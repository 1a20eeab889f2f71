use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use roomsvital_core::{Document, FieldValue, RoomId, RoomRecord};
use roomsvital_engine::{
    Confirmer, Decision, EngineError, Notice, Notifier, Prompt, RecordMutator, Registry,
    RegistryConfig, RoomDirectory,
};
use roomsvital_storage::{Collection, DocumentStore, StorageError};

use crate::store::FlakyStore;

/// Answers prompts from a queue, then falls back to a fixed answer.
/// Every prompt it sees is kept.
pub struct ScriptedConfirmer {
    script: Mutex<VecDeque<Decision>>,
    fallback: Decision,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedConfirmer {
    pub fn new(fallback: Decision) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, decision: Decision) {
        self.script.lock().push_back(decision);
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn decide(&self, prompt: &Prompt) -> Decision {
        self.prompts.lock().push(prompt.clone());
        self.script.lock().pop_front().unwrap_or(self.fallback)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.title.clone()).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// A registry wired to a [`FlakyStore`], a scripted confirmer and a
/// recording notifier.
pub struct TestRegistry {
    pub store: Arc<FlakyStore>,
    pub confirmer: Arc<ScriptedConfirmer>,
    pub notices: Arc<RecordingNotifier>,
    pub registry: Registry,
}

impl TestRegistry {
    /// Default config, in-memory store, confirms every prompt.
    pub fn new() -> Result<Self, EngineError> {
        Self::with_config(&RegistryConfig::default())
    }

    pub fn with_config(config: &RegistryConfig) -> Result<Self, EngineError> {
        Self::over(Arc::new(FlakyStore::in_memory()), config)
    }

    pub fn over(store: Arc<FlakyStore>, config: &RegistryConfig) -> Result<Self, EngineError> {
        crate::init_tracing();
        let confirmer = Arc::new(ScriptedConfirmer::new(Decision::Confirm));
        let notices = Arc::new(RecordingNotifier::default());
        let registry = Registry::new(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::clone(&confirmer) as Arc<dyn Confirmer>,
            Arc::clone(&notices) as Arc<dyn Notifier>,
            config,
        )?;
        Ok(Self {
            store,
            confirmer,
            notices,
            registry,
        })
    }

    pub fn directory(&self) -> &RoomDirectory {
        self.registry.directory()
    }

    pub fn mutator(&self) -> &RecordMutator {
        self.registry.mutator()
    }

    /// Writes a room straight into the wrapped store, bypassing faults
    /// and the cache.
    pub async fn seed(&self, room_no: i64, name: &str, gender: &str) -> Result<RoomId, StorageError> {
        let id = RoomId::new(room_no.to_string());
        let mut doc = Document::new();
        doc.insert("name".into(), FieldValue::from(name));
        doc.insert("gender".into(), FieldValue::from(gender));
        doc.insert("roomNo".into(), FieldValue::Integer(room_no));
        doc.insert("date".into(), FieldValue::from("2024-01-01T00:00:00.000Z"));
        doc.insert("isLocked".into(), FieldValue::Boolean(false));
        self.store.inner().set(Collection::Rooms, id.as_str(), doc).await?;
        Ok(id)
    }

    /// The room as currently stored, read without faults.
    pub async fn stored(&self, id: &RoomId) -> Result<Option<RoomRecord>, StorageError> {
        let doc = self.store.inner().get(Collection::Rooms, id.as_str()).await?;
        Ok(doc.map(|doc| RoomRecord::from_document(id.clone(), &doc)))
    }

    pub fn cached(&self, id: &RoomId) -> Option<RoomRecord> {
        self.directory().get(id)
    }

    /// Ids of the visible rows, in display order.
    pub fn visible_ids(&self) -> Vec<String> {
        self.directory()
            .visible()
            .iter()
            .map(|r| r.id.to_string())
            .collect()
    }
}
