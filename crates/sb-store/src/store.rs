//! Document store abstraction and an in-memory implementation.

use crate::error::{Result, StoreError};
use sb_core::{CanvasDocument, ViewportDoc};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Where canvas documents live. Transport is the implementor's business.
pub trait CanvasStore: Send + Sync {
    /// Fetch the whole document. `StoreError::NotFound` for a canvas that
    /// was never saved.
    fn load_canvas(&self, doc_id: &str) -> impl Future<Output = Result<CanvasDocument>> + Send;

    /// Replace the whole document. Returns what was persisted.
    fn save_canvas(
        &self,
        doc_id: &str,
        doc: &CanvasDocument,
    ) -> impl Future<Output = Result<CanvasDocument>> + Send;

    /// Overwrite only the viewport of an existing document.
    fn update_viewport(
        &self,
        doc_id: &str,
        viewport: ViewportDoc,
    ) -> impl Future<Output = Result<ViewportDoc>> + Send;
}

// ─── MemoryStore ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryInner {
    docs: Mutex<HashMap<String, CanvasDocument>>,
    latency: Mutex<Duration>,
    /// One-shot delays consumed by the next calls, in call order.
    delays: Mutex<VecDeque<Duration>>,
    failing: AtomicBool,
    saves: AtomicUsize,
    viewport_updates: AtomicUsize,
}

/// In-process store. Clones share the same documents, so a test can keep a
/// handle while the adapter owns another.
///
/// Latency and failures can be injected to exercise the adapter.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay applied to every call.
    pub fn with_latency(self, latency: Duration) -> Self {
        *lock(&self.inner.latency) = latency;
        self
    }

    /// Delay only the next call (queued in call order), overriding the
    /// base latency.
    pub fn queue_delay(&self, delay: Duration) {
        lock(&self.inner.delays).push_back(delay);
    }

    /// While set, every call fails with `StoreError::Backend`.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Seed a document without going through `save_canvas`.
    pub fn insert(&self, doc_id: &str, doc: CanvasDocument) {
        lock(&self.inner.docs).insert(doc_id.to_string(), doc);
    }

    pub fn get(&self, doc_id: &str) -> Option<CanvasDocument> {
        lock(&self.inner.docs).get(doc_id).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    pub fn viewport_update_count(&self) -> usize {
        self.inner.viewport_updates.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) -> Result<()> {
        let delay = {
            let queued = lock(&self.inner.delays).pop_front();
            queued.unwrap_or_else(|| *lock(&self.inner.latency))
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected failure".into()));
        }
        Ok(())
    }
}

impl CanvasStore for MemoryStore {
    async fn load_canvas(&self, doc_id: &str) -> Result<CanvasDocument> {
        self.simulate_latency().await?;
        self.get(doc_id)
            .ok_or_else(|| StoreError::NotFound(doc_id.to_string()))
    }

    async fn save_canvas(&self, doc_id: &str, doc: &CanvasDocument) -> Result<CanvasDocument> {
        self.simulate_latency().await?;
        self.insert(doc_id, doc.clone());
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(doc.clone())
    }

    async fn update_viewport(&self, doc_id: &str, viewport: ViewportDoc) -> Result<ViewportDoc> {
        self.simulate_latency().await?;
        let mut docs = lock(&self.inner.docs);
        let doc = docs
            .get_mut(doc_id)
            .ok_or_else(|| StoreError::NotFound(doc_id.to_string()))?;
        doc.viewport = viewport;
        self.inner.viewport_updates.fetch_add(1, Ordering::SeqCst);
        Ok(viewport)
    }
}
