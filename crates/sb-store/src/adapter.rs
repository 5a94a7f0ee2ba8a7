//! Persistence adapter: hydrates a canvas from its store on entry and writes
//! it back on save.
//!
//! One load is meaningful per canvas at a time. Every `load` takes a
//! generation ticket; when a newer load starts (or `cancel_pending` is
//! called) before an older one resolves, the older result is discarded.

use crate::error::{Result, StoreError};
use crate::store::CanvasStore;
use sb_core::{CanvasDocument, LogSink, Notice, NotificationSink, Viewport, ViewportDoc};
use sb_editor::CanvasEditor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of `PersistenceAdapter::load`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(CanvasDocument),
    /// Never saved, or the load failed. Start with a blank canvas.
    Empty,
    /// A newer load started first; this result is stale.
    Superseded,
}

impl LoadOutcome {
    /// Hydrate `editor` unless the result is stale. Returns whether the
    /// editor was touched.
    pub fn apply_to(self, editor: &mut CanvasEditor) -> bool {
        match self {
            LoadOutcome::Loaded(doc) => editor.hydrate(doc),
            LoadOutcome::Empty => editor.hydrate(CanvasDocument::default()),
            LoadOutcome::Superseded => return false,
        }
        true
    }
}

pub struct PersistenceAdapter<S> {
    store: S,
    generation: AtomicU64,
    sink: Arc<dyn NotificationSink>,
}

impl<S: CanvasStore> PersistenceAdapter<S> {
    pub fn new(store: S) -> Self {
        Self::with_sink(store, Arc::new(LogSink))
    }

    pub fn with_sink(store: S, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            generation: AtomicU64::new(0),
            sink,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Invalidate any in-flight load, e.g. when navigating away.
    pub fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Load a canvas. Never fails: errors are reported to the sink and
    /// degrade to an empty canvas.
    pub async fn load(&self, doc_id: &str) -> LoadOutcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.store.load_canvas(doc_id).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            log::debug!("load of `{doc_id}` superseded (ticket {ticket})");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(doc) => {
                log::info!(
                    "loaded `{doc_id}`: {} nodes, {} connections",
                    doc.nodes.len(),
                    doc.connections.len()
                );
                LoadOutcome::Loaded(doc)
            }
            Err(StoreError::NotFound(_)) => {
                log::info!("`{doc_id}` has no saved canvas yet");
                LoadOutcome::Empty
            }
            Err(e) => {
                log::warn!("load of `{doc_id}` failed: {e}");
                self.sink
                    .notify(Notice::error(format!("Failed to load canvas: {e}")));
                LoadOutcome::Empty
            }
        }
    }

    /// Full-document replace. On failure the error is reported and
    /// returned; nothing in memory changes, so the call can be retried.
    pub async fn save(&self, doc_id: &str, doc: &CanvasDocument) -> Result<CanvasDocument> {
        match self.store.save_canvas(doc_id, doc).await {
            Ok(saved) => {
                log::info!("saved `{doc_id}`");
                self.sink.notify(Notice::success("Canvas saved"));
                Ok(saved)
            }
            Err(e) => {
                log::warn!("save of `{doc_id}` failed: {e}");
                self.sink
                    .notify(Notice::error(format!("Failed to save canvas: {e}")));
                Err(e)
            }
        }
    }

    /// Push only the viewport, for periodic view-state sync.
    pub async fn sync_viewport(&self, doc_id: &str, viewport: &Viewport) -> Result<ViewportDoc> {
        let vp = ViewportDoc::from_viewport(viewport);
        self.store
            .update_viewport(doc_id, vp)
            .await
            .inspect_err(|e| log::warn!("viewport sync of `{doc_id}` failed: {e}"))
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for PersistenceAdapter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("store", &self.store)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}
