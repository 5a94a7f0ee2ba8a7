//! JSON-file store: one `<doc_id>.json` per canvas under a directory.

use crate::error::{Result, StoreError};
use crate::store::CanvasStore;
use sb_core::{CanvasDocument, ViewportDoc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a document. Ids that could escape the root are rejected.
    pub fn path_for(&self, doc_id: &str) -> Result<PathBuf> {
        let valid = !doc_id.is_empty()
            && doc_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !doc_id.starts_with('.');
        if !valid {
            return Err(StoreError::Backend(format!("invalid document id `{doc_id}`")));
        }
        Ok(self.root.join(format!("{doc_id}.json")))
    }

    async fn read(&self, doc_id: &str) -> Result<CanvasDocument> {
        let path = self.path_for(doc_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(doc_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write through a temp file and rename, so a crash never leaves a
    /// half-written document behind.
    async fn write(&self, doc_id: &str, doc: &CanvasDocument) -> Result<()> {
        let path = self.path_for(doc_id)?;
        let json = serde_json::to_vec_pretty(doc)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("wrote {} ({} bytes)", path.display(), json.len());
        Ok(())
    }
}

impl CanvasStore for JsonFileStore {
    async fn load_canvas(&self, doc_id: &str) -> Result<CanvasDocument> {
        self.read(doc_id).await
    }

    async fn save_canvas(&self, doc_id: &str, doc: &CanvasDocument) -> Result<CanvasDocument> {
        self.write(doc_id, doc).await?;
        Ok(doc.clone())
    }

    async fn update_viewport(&self, doc_id: &str, viewport: ViewportDoc) -> Result<ViewportDoc> {
        let mut doc = self.read(doc_id).await?;
        doc.viewport = viewport;
        self.write(doc_id, &doc).await?;
        Ok(viewport)
    }
}
