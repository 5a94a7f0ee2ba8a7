//! Undo/Redo command stack.
//!
//! Every change is recorded as a graph snapshot pair. Gestures use
//! **snapshot batching**: the graph is captured when the gesture starts and
//! again when it ends, so a whole drag (or a multi-node delete) undoes in a
//! single step no matter how many mutations it applied.

use sb_core::{CanvasGraph, CanvasMutation, MutationOutcome};

/// One undoable step.
#[derive(Debug, Clone)]
pub struct Command {
    before: CanvasGraph,
    after: CanvasGraph,
    pub description: String,
}

/// Manages undo/redo stacks with batch grouping for gestures.
#[derive(Debug)]
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Graph snapshot captured at the start of a batch.
    batch_snapshot: Option<CanvasGraph>,
    batch_description: String,
    /// Whether any mutation changed the graph during the current batch.
    batch_dirty: bool,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_snapshot: None,
            batch_description: String::new(),
            batch_dirty: false,
        }
    }

    /// Start a batch group. All mutations until `end_batch()` are applied
    /// live but tracked as one atomic undo step.
    pub fn begin_batch(&mut self, graph: &CanvasGraph, description: &str) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(graph.clone());
            self.batch_description = description.to_string();
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// Close a batch group. When the outermost batch closes and something
    /// changed, one snapshot command is pushed.
    pub fn end_batch(&mut self, graph: &CanvasGraph) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let before = self.batch_snapshot.take();
        if self.batch_dirty
            && let Some(before) = before
        {
            let description = std::mem::take(&mut self.batch_description);
            self.push(Command {
                before,
                after: graph.clone(),
                description,
            });
        }
        self.batch_dirty = false;
    }

    /// Drop the open batch without recording it. Returns the snapshot taken
    /// at `begin_batch` so the caller can roll the graph back.
    pub fn abort_batch(&mut self) -> Option<CanvasGraph> {
        if self.batch_depth == 0 {
            return None;
        }
        self.batch_depth = 0;
        self.batch_dirty = false;
        self.batch_description.clear();
        self.batch_snapshot.take()
    }

    /// Apply a mutation and record it. Rejected mutations record nothing.
    pub fn execute(
        &mut self,
        graph: &mut CanvasGraph,
        mutation: CanvasMutation,
        description: &str,
    ) -> MutationOutcome {
        if self.batch_depth > 0 {
            // The snapshot at end_batch() captures the cumulative effect.
            let outcome = graph.apply(mutation);
            self.batch_dirty |= outcome.changed();
            return outcome;
        }

        let before = graph.clone();
        let outcome = graph.apply(mutation);
        if outcome.changed() {
            self.push(Command {
                before,
                after: graph.clone(),
                description: description.to_string(),
            });
        }
        outcome
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, graph: &mut CanvasGraph) -> Option<String> {
        if self.batch_depth > 0 {
            log::debug!("undo ignored while a gesture is open");
            return None;
        }
        let cmd = self.undo_stack.pop()?;
        *graph = cmd.before.clone();
        let desc = cmd.description.clone();
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, graph: &mut CanvasGraph) -> Option<String> {
        if self.batch_depth > 0 {
            return None;
        }
        let cmd = self.redo_stack.pop()?;
        *graph = cmd.after.clone();
        let desc = cmd.description.clone();
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget all history, e.g. after the graph is replaced by a load.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.abort_batch();
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }
}
