//! Persistence for the storyboard canvas: the async document-store
//! contract, an in-memory and a JSON-file store, and the adapter that loads
//! and saves a `CanvasEditor`.

pub mod adapter;
pub mod error;
pub mod file;
pub mod store;

pub use adapter::{LoadOutcome, PersistenceAdapter};
pub use error::{Result, StoreError};
pub use file::JsonFileStore;
pub use store::{CanvasStore, MemoryStore};
