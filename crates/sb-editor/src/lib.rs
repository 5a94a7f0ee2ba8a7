//! Interaction layer for the storyboard canvas: input normalization,
//! selection, the drag/pan/connect state machine, shortcuts and undo/redo.

pub mod canvas;
pub mod commands;
pub mod events;
pub mod input;
pub mod selection;
pub mod session;
pub mod shortcuts;

pub use canvas::CanvasEditor;
pub use commands::CommandStack;
pub use events::{CanvasEvent, EventBus, SubscriptionId};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use selection::Selection;
pub use session::{Session, SessionKind};
pub use shortcuts::{ShortcutAction, ShortcutMap};
