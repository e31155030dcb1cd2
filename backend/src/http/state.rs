//! Application state for the HTTP server.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

use crate::api::TimetableKey;
use crate::db::repository::FullRepository;
use crate::error::TimetableResult;
use crate::services::{
    CatalogSuggestionGenerator, EditorSettings, JobTracker, SaveQueue, SuggestionGenerator,
    TimetableEditor,
};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Serializes saves per timetable across requests
    pub queue: SaveQueue,
    pub settings: Arc<EditorSettings>,
    /// Tracker for suggestion jobs
    pub job_tracker: JobTracker,
    pub generator: Arc<dyn SuggestionGenerator>,
    /// One request-level lock per timetable, held from load to save
    edit_locks: Arc<Mutex<HashMap<TimetableKey, Arc<tokio::sync::Mutex<()>>>>>,
}

/// An editor that holds its timetable's request lock.
///
/// Each mutating request loads, checks and saves while holding the lock, so
/// a save is never superseded by a snapshot taken from another request.
pub struct EditSession {
    editor: TimetableEditor,
    _guard: OwnedMutexGuard<()>,
}

impl Deref for EditSession {
    type Target = TimetableEditor;

    fn deref(&self) -> &Self::Target {
        &self.editor
    }
}

impl DerefMut for EditSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.editor
    }
}

impl AppState {
    /// Create a state with default editor settings and the catalog generator.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_settings(repository, EditorSettings::default())
    }

    pub fn with_settings(repository: Arc<dyn FullRepository>, settings: EditorSettings) -> Self {
        Self {
            queue: SaveQueue::new(repository.clone()),
            repository,
            settings: Arc::new(settings),
            job_tracker: JobTracker::new(),
            generator: Arc::new(CatalogSuggestionGenerator::default()),
            edit_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replace the suggestion generator.
    pub fn with_generator(mut self, generator: Arc<dyn SuggestionGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Open a read-only view of the stored timetable for `key`.
    pub async fn editor(&self, key: TimetableKey) -> TimetableResult<TimetableEditor> {
        TimetableEditor::open(self.queue.clone(), self.settings.clone(), key).await
    }

    /// Wait for the request lock of `key`, then load its editor.
    pub async fn edit_session(&self, key: TimetableKey) -> TimetableResult<EditSession> {
        let guard = self.lock_key(&key).await;
        let editor = TimetableEditor::open(self.queue.clone(), self.settings.clone(), key).await?;
        Ok(EditSession {
            editor,
            _guard: guard,
        })
    }

    /// Request lock of `key` without an editor, for whole-record writes.
    pub async fn lock_key(&self, key: &TimetableKey) -> OwnedMutexGuard<()> {
        let lock = self.edit_locks.lock().entry(key.clone()).or_default().clone();
        lock.lock_owned().await
    }
}
