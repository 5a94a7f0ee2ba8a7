//! Selection set: ordered, duplicate-free node ids. Transient UI state.

use sb_core::NodeId;
use smallvec::SmallVec;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: SmallVec<[NodeId; 8]>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replace the selection with a single node. Returns `true` if it changed.
    pub fn replace(&mut self, id: NodeId) -> bool {
        if self.ids.len() == 1 && self.ids[0] == id {
            return false;
        }
        self.ids.clear();
        self.ids.push(id);
        true
    }

    /// Add or remove `id`. Always changes the selection.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
        true
    }

    /// Replace with an arbitrary list, dropping duplicates.
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>) -> bool {
        let mut next: SmallVec<[NodeId; 8]> = SmallVec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    /// Keep only ids for which `keep` holds. Returns `true` if any were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| keep(*id));
        self.ids.len() != before
    }
}
