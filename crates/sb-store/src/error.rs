//! Errors raised at the document-store boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("canvas document `{0}` not found")]
    NotFound(String),
    #[error("canvas store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed canvas document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("canvas store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// A missing document is how a brand-new canvas looks, not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
