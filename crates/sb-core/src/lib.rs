pub mod config;
pub mod document;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod model;
pub mod notify;

pub use config::CanvasConfig;
pub use document::{CanvasDocument, ConnectionDoc, NodeDoc, ViewportDoc, from_document, to_document};
pub use geometry::{Bounds, Point, Viewport};
pub use graph::{CanvasGraph, CanvasMutation, MutationOutcome, Removal};
pub use id::{ConnectionId, NodeId};
pub use model::*;
pub use notify::{CollectingSink, LogSink, Notice, NoticeLevel, NotificationSink};
