//! The canvas editor: owns the graph, viewport, selection and the active
//! interaction session, and turns `InputEvent`s into mutations.
//!
//! All state changes go through here on one thread. Renderers borrow the
//! state through `layout()` / `frame()`; everything else learns about
//! changes from the event bus.

use crate::commands::CommandStack;
use crate::events::{CanvasEvent, EventBus, SubscriptionId};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::selection::Selection;
use crate::session::Session;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use sb_core::{
    CanvasConfig, CanvasDocument, CanvasGraph, CanvasMutation, ConnectionId,
    DEFAULT_CONNECTION_KIND, LogSink, MutationOutcome, Node, NodeId, NodeKind, Notice,
    NotificationSink, Point, Viewport, from_document, to_document,
};
use sb_render::connections::connection_visuals;
use sb_render::{CanvasLayout, Frame, Hit, hit_test, render_frame};
use std::collections::HashSet;
use std::sync::Arc;

pub struct CanvasEditor {
    graph: CanvasGraph,
    viewport: Viewport,
    selection: Selection,
    /// Expanded scene-masters. View state, never persisted.
    expanded: HashSet<NodeId>,
    session: Session,
    /// Space is held: primary-button presses pan.
    pan_key_held: bool,
    commands: CommandStack,
    config: CanvasConfig,
    events: EventBus,
    sink: Arc<dyn NotificationSink>,
}

impl CanvasEditor {
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    pub fn with_sink(config: CanvasConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            graph: CanvasGraph::new(),
            viewport: config.viewport(),
            selection: Selection::new(),
            expanded: HashSet::new(),
            session: Session::Idle,
            pan_key_held: false,
            commands: CommandStack::new(config.undo_depth),
            config,
            events: EventBus::new(),
            sink,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn graph(&self) -> &CanvasGraph {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &[NodeId] {
        self.selection.as_slice()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&CanvasEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Forward a notice to the notification sink.
    pub fn notify(&self, notice: Notice) {
        self.sink.notify(notice);
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the whole canvas with a loaded document. Selection, expanded
    /// flags, the active session and undo history are reset.
    pub fn hydrate(&mut self, doc: CanvasDocument) {
        self.session = Session::Idle;
        self.commands.clear();
        self.expanded.clear();
        self.viewport = self.config.viewport();
        self.graph = from_document(doc, &mut self.viewport);
        log::info!(
            "canvas hydrated: {} nodes, {} connections",
            self.graph.node_count(),
            self.graph.connection_count()
        );
        if self.selection.clear() {
            self.emit_selection();
        }
        self.events.emit(CanvasEvent::GraphReplaced);
        self.emit_viewport();
    }

    /// Snapshot the canvas for saving.
    pub fn document(&self) -> CanvasDocument {
        to_document(&self.graph, &self.viewport)
    }

    // ─── Read side ───────────────────────────────────────────────────────

    pub fn layout(&self) -> CanvasLayout<'_> {
        CanvasLayout::new(&self.graph, &self.expanded, &self.config)
    }

    pub fn frame(&self) -> Frame {
        render_frame(
            &self.layout(),
            &self.viewport,
            self.selection.as_slice(),
            self.session.draft(),
        )
    }

    /// What lies under a screen point.
    pub fn hit(&self, screen: Point) -> Hit {
        let layout = self.layout();
        let connections = connection_visuals(&layout, &self.viewport);
        hit_test(&layout, &self.viewport, &connections, screen)
    }

    // ─── Input dispatch ──────────────────────────────────────────────────

    /// Process one input event. Returns `true` if anything visible changed
    /// and the host should repaint.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(Point::new(*x, *y), *button, *modifiers),
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::DoubleClick { x, y } => self.double_click(Point::new(*x, *y)),
            InputEvent::Wheel { delta_y, .. } => self.wheel(*delta_y),
            InputEvent::KeyDown { key, modifiers } => match ShortcutMap::resolve(key, *modifiers) {
                Some(action) => self.run_shortcut(action),
                None => false,
            },
            InputEvent::KeyUp { key, .. } => match ShortcutMap::resolve_release(key) {
                Some(action) => self.run_shortcut(action),
                None => false,
            },
        }
    }

    fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) -> bool {
        let wants_pan = match button {
            PointerButton::Middle => true,
            PointerButton::Primary => self.pan_key_held,
            PointerButton::Secondary => false,
        };
        if wants_pan {
            self.begin_pan(screen);
            return true;
        }
        if button != PointerButton::Primary {
            // Context menus belong to the host.
            return false;
        }

        let hit = self.hit(screen);

        // Nested controls never reach node-level handlers.
        if let Hit::Control { node, control } = hit {
            self.events.emit(CanvasEvent::ControlPressed { node, control });
            return true;
        }

        if let Session::ConnectingDraft { source, .. } = self.session {
            return match hit.target_node() {
                Some(target) if target == source => false,
                Some(target) => {
                    self.connect(source, target);
                    true
                }
                None => {
                    log::debug!("connection from {source:?} cancelled");
                    self.set_session(Session::Idle);
                    true
                }
            };
        }

        // A press mid-gesture (lost pointer-up) closes the old gesture first.
        self.end_session();

        match hit {
            Hit::Slot {
                child: Some(child), ..
            } => self.select_node(child, modifiers.multi_select()),
            Hit::Slot {
                scene: id,
                child: None,
                ..
            }
            | Hit::Node(id) => {
                self.press_node(id, screen, modifiers);
                true
            }
            Hit::Connection(id) => {
                self.events.emit(CanvasEvent::ConnectionClicked(id));
                true
            }
            Hit::Background => {
                if modifiers.multi_select() {
                    return false;
                }
                self.clear_selection()
            }
            Hit::Control { .. } => false,
        }
    }

    fn press_node(&mut self, id: NodeId, screen: Point, modifiers: Modifiers) {
        // Pressing an already-selected node grabs the whole group as is.
        if !self.selection.contains(id) {
            if modifiers.multi_select() {
                self.selection.toggle(id);
            } else {
                self.selection.replace(id);
            }
            self.emit_selection();
        }
        self.begin_drag(screen);
    }

    fn pointer_move(&mut self, screen: Point) -> bool {
        if matches!(self.session, Session::Dragging { .. }) {
            return self.update_drag(screen);
        }
        match &mut self.session {
            Session::Panning {
                start_pointer_screen,
                start_offset,
            } => {
                let offset = screen - (*start_pointer_screen - *start_offset);
                if offset == self.viewport.offset {
                    return false;
                }
                self.viewport.pan_to(offset);
                self.emit_viewport();
                true
            }
            Session::ConnectingDraft { mouse_position, .. } => {
                *mouse_position = self.viewport.screen_to_world(screen);
                true
            }
            Session::Dragging { .. } | Session::Idle => false,
        }
    }

    fn pointer_up(&mut self, screen: Point) -> bool {
        match self.session {
            Session::Dragging { .. } => {
                self.update_drag(screen);
                self.end_session();
                true
            }
            Session::Panning { .. } => {
                self.set_session(Session::Idle);
                true
            }
            // Connections complete on the next press, not on release.
            Session::ConnectingDraft { .. } | Session::Idle => false,
        }
    }

    fn double_click(&mut self, screen: Point) -> bool {
        let scene = match self.hit(screen) {
            Hit::Node(id) => Some(id),
            Hit::Slot {
                scene, child: None, ..
            } => Some(scene),
            _ => None,
        };
        match scene {
            Some(id) => self.toggle_expanded(id),
            None => false,
        }
    }

    fn wheel(&mut self, delta_y: f64) -> bool {
        let factor = self.config.wheel_zoom_factor;
        if delta_y < 0.0 {
            self.zoom_by(factor)
        } else if delta_y > 0.0 {
            self.zoom_by(1.0 / factor)
        } else {
            false
        }
    }

    fn run_shortcut(&mut self, action: ShortcutAction) -> bool {
        log::debug!("shortcut: {action:?}");
        match action {
            ShortcutAction::Cancel => {
                self.cancel();
                true
            }
            ShortcutAction::Delete => self.delete_selected() > 0,
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Undo => self.undo().is_some(),
            ShortcutAction::Redo => self.redo().is_some(),
            ShortcutAction::ZoomIn => self.zoom_by(self.config.wheel_zoom_factor),
            ShortcutAction::ZoomOut => self.zoom_by(1.0 / self.config.wheel_zoom_factor),
            ShortcutAction::ResetView => self.reset_view(),
            ShortcutAction::PanStart => !std::mem::replace(&mut self.pan_key_held, true),
            ShortcutAction::PanEnd => std::mem::replace(&mut self.pan_key_held, false),
        }
    }

    // ─── Sessions ────────────────────────────────────────────────────────

    fn begin_pan(&mut self, screen: Point) {
        self.end_session();
        self.set_session(Session::Panning {
            start_pointer_screen: screen,
            start_offset: self.viewport.offset,
        });
    }

    fn begin_drag(&mut self, screen: Point) {
        let origins: Vec<(NodeId, Point)> = self
            .selection
            .as_slice()
            .iter()
            .filter_map(|id| self.graph.node(*id).map(|n| (*id, n.position)))
            .collect();
        if origins.is_empty() {
            return;
        }
        self.commands.begin_batch(&self.graph, "move nodes");
        self.set_session(Session::Dragging {
            start_pointer_world: self.viewport.screen_to_world(screen),
            origins,
        });
    }

    /// Move every dragged node to `origin + (pointer - start)`.
    fn update_drag(&mut self, screen: Point) -> bool {
        let Session::Dragging {
            start_pointer_world,
            origins,
        } = &self.session
        else {
            return false;
        };
        let delta = self.viewport.screen_to_world(screen) - *start_pointer_world;
        let mut moved = false;
        for (id, origin) in origins {
            let outcome = self.commands.execute(
                &mut self.graph,
                CanvasMutation::MoveNode {
                    id: *id,
                    position: *origin + delta,
                },
                "move nodes",
            );
            moved |= outcome.changed();
        }
        moved
    }

    /// Close the active session normally. A drag commits its batch.
    fn end_session(&mut self) {
        if let Session::Dragging { origins, .. } = &self.session {
            let moved: Vec<NodeId> = origins
                .iter()
                .filter(|(id, origin)| self.graph.node(*id).is_some_and(|n| n.position != *origin))
                .map(|(id, _)| *id)
                .collect();
            self.commands.end_batch(&self.graph);
            if !moved.is_empty() {
                log::debug!("drag committed for {} nodes", moved.len());
                self.events.emit(CanvasEvent::NodesMoved(moved));
            }
        }
        self.set_session(Session::Idle);
    }

    fn set_session(&mut self, session: Session) {
        let changed = session.kind() != self.session.kind();
        self.session = session;
        if changed {
            self.events.emit(CanvasEvent::SessionChanged(self.session.kind()));
        }
    }

    /// Enter connecting mode from `source`. Ends any other session.
    pub fn start_connection(&mut self, source: NodeId) -> bool {
        let Some(anchor) = self.layout().world_bounds(source).map(|b| b.right_center()) else {
            log::debug!("start_connection: unknown node {source:?}");
            return false;
        };
        self.end_session();
        self.set_session(Session::ConnectingDraft {
            source,
            mouse_position: anchor,
        });
        true
    }

    fn connect(&mut self, source: NodeId, target: NodeId) {
        self.apply_recorded(
            CanvasMutation::AddConnection {
                source,
                target,
                kind: DEFAULT_CONNECTION_KIND.to_string(),
            },
            "connect nodes",
        );
        self.set_session(Session::Idle);
    }

    /// Abort whatever is in progress, clear the selection and dismiss
    /// dependent panels. A cancelled drag puts the nodes back.
    pub fn cancel(&mut self) {
        if let Session::Dragging { origins, .. } = &self.session {
            self.commands.abort_batch();
            for (id, origin) in origins {
                self.graph.move_node(*id, *origin);
            }
            let ids = origins.iter().map(|(id, _)| *id).collect();
            self.events.emit(CanvasEvent::NodesMoved(ids));
        }
        self.set_session(Session::Idle);
        self.clear_selection();
        self.events.emit(CanvasEvent::PanelsDismissed);
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply an external edit (rename, status change, ...) through the same
    /// surface gestures use. Recorded for undo.
    pub fn apply(&mut self, mutation: CanvasMutation) -> MutationOutcome {
        self.apply_recorded(mutation, "edit")
    }

    fn apply_recorded(&mut self, mutation: CanvasMutation, description: &str) -> MutationOutcome {
        let outcome = self
            .commands
            .execute(&mut self.graph, mutation, description);
        self.after_mutation(&outcome);
        outcome
    }

    /// Keep view state consistent with the graph and report the change.
    fn after_mutation(&mut self, outcome: &MutationOutcome) {
        match outcome {
            MutationOutcome::Unchanged => return,
            MutationOutcome::NodeRemoved(removal) => {
                self.forget_node(removal.node.id);
                if !removal.connections.is_empty() {
                    self.sink.notify(Notice::info(format!(
                        "{} connection(s) deleted",
                        removal.connections.len()
                    )));
                }
            }
            MutationOutcome::ConnectionAdded(_) => {
                self.sink.notify(Notice::success("Connection created"));
            }
            MutationOutcome::ConnectionRemoved(_) => {
                self.sink.notify(Notice::info("Connection deleted"));
            }
            _ => {}
        }
        self.events.emit(CanvasEvent::Mutated(outcome.clone()));
    }

    fn forget_node(&mut self, id: NodeId) {
        self.expanded.remove(&id);
        if self.selection.retain(|n| n != id) {
            self.emit_selection();
        }
        if self.session.references(id) {
            if matches!(self.session, Session::Dragging { .. }) {
                self.commands.end_batch(&self.graph);
            }
            self.set_session(Session::Idle);
        }
    }

    /// Prune view state after the graph was swapped wholesale.
    fn reconcile(&mut self) {
        let graph = &self.graph;
        self.expanded.retain(|id| graph.contains_node(*id));
        if self.selection.retain(|id| graph.contains_node(id)) {
            self.emit_selection();
        }
        if let Session::ConnectingDraft { source, .. } = self.session
            && !self.graph.contains_node(source)
        {
            self.set_session(Session::Idle);
        }
        self.events.emit(CanvasEvent::GraphReplaced);
    }

    /// Context-menu create: a new node whose top-left sits under `screen`.
    pub fn create_node_at(&mut self, kind: NodeKind, screen: Point) -> Option<NodeId> {
        let prefix = match kind {
            NodeKind::Shot => "shot",
            NodeKind::SceneMaster => "scene",
        };
        let id = NodeId::with_prefix(prefix);
        let mut node = Node::new(id, kind, self.viewport.screen_to_world(screen));
        let same_kind = self
            .graph
            .nodes()
            .filter(|n| n.kind == kind && !n.is_contained())
            .count();
        node.number = (same_kind + 1).to_string();
        match self.apply_recorded(CanvasMutation::AddNode(Box::new(node)), "create node") {
            MutationOutcome::NodeAdded(id) => Some(id),
            _ => None,
        }
    }

    /// Append a new shot to a scene-master's grid.
    pub fn add_child_shot(&mut self, scene_id: NodeId) -> Option<NodeId> {
        let scene = self.graph.node(scene_id).filter(|n| n.is_scene_master())?;
        let position = scene.position;
        let number = format!(
            "{}.{}",
            scene.number,
            self.graph.children_of(scene_id).len() + 1
        );
        let mut node = Node::shot(NodeId::with_prefix("shot"), position).in_scene(scene_id);
        node.number = number;
        match self.apply_recorded(CanvasMutation::AddNode(Box::new(node)), "add shot") {
            MutationOutcome::NodeAdded(id) => Some(id),
            _ => None,
        }
    }

    /// Delete a connection, typically after the host confirmed a click.
    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        self.apply_recorded(CanvasMutation::RemoveConnection { id }, "delete connection")
            .changed()
    }

    /// Delete every selected node (and, by cascade, their connections) as
    /// one undo step. Returns the number of nodes removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids: Vec<NodeId> = self.selection.as_slice().to_vec();
        if ids.is_empty() {
            return 0;
        }
        self.end_session();
        self.commands.begin_batch(&self.graph, "delete nodes");
        let mut removed = 0;
        for id in ids {
            let outcome = self
                .commands
                .execute(&mut self.graph, CanvasMutation::RemoveNode { id }, "delete nodes");
            if outcome.changed() {
                removed += 1;
            }
            self.after_mutation(&outcome);
        }
        self.commands.end_batch(&self.graph);
        removed
    }

    pub fn undo(&mut self) -> Option<String> {
        if !self.session.is_idle() {
            self.end_session();
        }
        let desc = self.commands.undo(&mut self.graph)?;
        log::debug!("undo: {desc}");
        self.reconcile();
        Some(desc)
    }

    pub fn redo(&mut self) -> Option<String> {
        if !self.session.is_idle() {
            self.end_session();
        }
        let desc = self.commands.redo(&mut self.graph)?;
        log::debug!("redo: {desc}");
        self.reconcile();
        Some(desc)
    }

    // ─── Selection & view state ──────────────────────────────────────────

    /// Select a node, replacing the selection or toggling membership.
    pub fn select_node(&mut self, id: NodeId, additive: bool) -> bool {
        if !self.graph.contains_node(id) {
            return false;
        }
        let changed = if additive {
            self.selection.toggle(id)
        } else {
            self.selection.replace(id)
        };
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn select_all(&mut self) -> bool {
        let ids: Vec<NodeId> = self.graph.node_ids().to_vec();
        let changed = self.selection.set(ids);
        if changed {
            self.emit_selection();
        }
        changed
    }

    /// Flip a scene-master between collapsed and expanded. Selection is
    /// left alone.
    pub fn toggle_expanded(&mut self, id: NodeId) -> bool {
        if !self.graph.node(id).is_some_and(|n| n.is_scene_master()) {
            return false;
        }
        let expanded = if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        };
        self.events
            .emit(CanvasEvent::ExpansionToggled { id, expanded });
        true
    }

    /// Multiplicative zoom. Offset is never touched.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        let before = self.viewport.zoom();
        self.viewport.zoom_by(factor);
        if self.viewport.zoom() == before {
            return false;
        }
        self.emit_viewport();
        true
    }

    pub fn reset_view(&mut self) -> bool {
        let before = self.viewport;
        self.viewport.reset();
        if self.viewport == before {
            return false;
        }
        self.emit_viewport();
        true
    }

    pub fn pan_to(&mut self, offset: Point) -> bool {
        if self.viewport.offset == offset {
            return false;
        }
        self.viewport.pan_to(offset);
        self.emit_viewport();
        true
    }

    fn emit_selection(&mut self) {
        let ids = self.selection.as_slice().to_vec();
        self.events.emit(CanvasEvent::SelectionChanged(ids));
    }

    fn emit_viewport(&mut self) {
        self.events.emit(CanvasEvent::ViewportChanged {
            offset: self.viewport.offset,
            zoom: self.viewport.zoom(),
        });
    }
}

impl std::fmt::Debug for CanvasEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasEditor")
            .field("nodes", &self.graph.node_count())
            .field("connections", &self.graph.connection_count())
            .field("viewport", &self.viewport)
            .field("selection", &self.selection)
            .field("session", &self.session.kind())
            .finish()
    }
}
