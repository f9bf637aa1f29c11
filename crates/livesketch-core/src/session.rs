//! Interaction session: one local user's board.
//!
//! A [`BoardSession`] owns the engine, its event subscription and the sync
//! adapter, and turns engine events into store writes. Pointer moves only
//! touch the local graph; the store sees a shape when its gesture completes
//! and again on every committed modification.

use kurbo::Point;

use crate::attributes::{AttributeEdit, AttributeError, ElementAttributes};
use crate::config::BoardConfig;
use crate::engine::{CanvasEngine, CanvasEvent, EventSubscription};
use crate::keys::{KeyCommand, KeyInput};
use crate::shapes::{Image, ObjectId, Shape};
use crate::store::SharedStore;
use crate::sync::{Protected, ReconcileReport, SyncAdapter};
use crate::tools::{Interaction, ToolKind};

pub struct BoardSession<S, E> {
    adapter: SyncAdapter<S>,
    engine: E,
    /// Released when the session ends.
    events: EventSubscription,
    config: BoardConfig,
    tool: ToolKind,
    interaction: Interaction,
    attributes: ElementAttributes,
    /// The attribute panel is being typed into; selection changes leave it alone.
    panel_editing: bool,
    clipboard: Option<Shape>,
}

impl<S: SharedStore, E: CanvasEngine> BoardSession<S, E> {
    /// Start a session and render whatever the store already holds.
    pub fn new(store: S, mut engine: E, config: BoardConfig) -> Self {
        let events = engine.subscribe();
        let mut adapter = SyncAdapter::new(store);
        adapter.reconcile(&mut engine, &Protected::none());
        Self {
            adapter,
            engine,
            events,
            config,
            tool: ToolKind::default(),
            interaction: Interaction::Idle,
            attributes: ElementAttributes::default(),
            panel_editing: false,
            clipboard: None,
        }
    }

    /// End the session, releasing the event subscription.
    pub fn close(self) -> (S, E) {
        let Self { adapter, engine, events, .. } = self;
        drop(events);
        (adapter.into_store(), engine)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn store(&self) -> &S {
        self.adapter.store()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.adapter.store_mut()
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }

    pub fn clipboard(&self) -> Option<&Shape> {
        self.clipboard.as_ref()
    }

    /// Switch tools, finishing whatever the pointer was doing.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.end_interaction();
        self.tool = tool;
    }

    /// Handle every event the engine emitted since the last call.
    pub fn process_events(&mut self) -> usize {
        let events = self.events.drain();
        let count = events.len();
        for event in events {
            self.handle_event(event);
        }
        count
    }

    pub fn handle_event(&mut self, event: CanvasEvent) {
        log::trace!("Handling {:?}", event);
        match event {
            CanvasEvent::PointerDown { point } => self.pointer_down(point),
            CanvasEvent::PointerMove { point } => self.pointer_move(point),
            CanvasEvent::PointerUp { .. } => self.pointer_up(),
            CanvasEvent::ObjectModified { id } | CanvasEvent::PathCreated { id } => {
                self.adapter.upsert(&self.engine, &id);
            }
            CanvasEvent::ObjectScaling { id } => {
                if let Some(shape) = self.engine.object(&id) {
                    self.attributes = ElementAttributes::from_shape(shape);
                }
            }
            CanvasEvent::SelectionCreated { id } => self.select(&id, None),
            CanvasEvent::SelectionCleared => {
                self.end_interaction();
                self.engine.clear_active();
                self.panel_editing = false;
            }
        }
    }

    fn pointer_down(&mut self, point: Point) {
        if matches!(self.interaction, Interaction::Drawing { .. }) {
            return;
        }
        if self.tool == ToolKind::Image {
            return;
        }

        if let Some(target) = self.engine.object_at(point, self.config.hit_tolerance) {
            self.select(&target, Some(point));
            return;
        }

        self.end_interaction();
        self.engine.clear_active();
        let Some(shape) = self.tool.create_shape(point, &self.config) else {
            return;
        };
        let id = shape.id().clone();
        self.engine.add_object(shape);
        self.engine.request_render();
        self.interaction = Interaction::Drawing { id, origin: point };
    }

    fn pointer_move(&mut self, point: Point) {
        let lost = match &mut self.interaction {
            Interaction::Drawing { id, origin } => match self.engine.object_mut(id) {
                Some(shape) => {
                    shape.resize_from_drag(*origin, point);
                    false
                }
                None => true,
            },
            Interaction::Editing { id, last: Some(last) } => {
                let (dx, dy) = (point.x - last.x, point.y - last.y);
                *last = point;
                match self.engine.object_mut(id) {
                    Some(shape) => {
                        shape.translate(dx, dy);
                        false
                    }
                    None => true,
                }
            }
            _ => return,
        };
        if lost {
            self.interaction = Interaction::Idle;
        } else {
            self.engine.request_render();
        }
    }

    fn pointer_up(&mut self) {
        self.end_interaction();
    }

    /// Make `id` the active object. `grab` is set when the pointer holds it.
    fn select(&mut self, id: &ObjectId, grab: Option<Point>) {
        if self.interaction.target() != Some(id) {
            self.end_interaction();
        }
        if self.engine.active() != Some(id) {
            self.panel_editing = false;
        }
        let Some(shape) = self.engine.object(id) else {
            return;
        };
        if !self.panel_editing {
            self.attributes = ElementAttributes::from_shape(shape);
        }
        self.engine.set_active(id);
        self.interaction = Interaction::Editing {
            id: id.clone(),
            last: grab,
        };
    }

    /// Close the current interaction, flushing its object to the store.
    fn end_interaction(&mut self) {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => {}
            Interaction::Drawing { id, .. } => self.finish_drawing(&id),
            Interaction::Editing { id, .. } => {
                self.adapter.upsert(&self.engine, &id);
            }
        }
    }

    fn finish_drawing(&mut self, id: &ObjectId) {
        if let Some(Shape::Freehand(path)) = self.engine.object_mut(id) {
            path.simplify(self.config.freehand_tolerance);
        }
        self.adapter.upsert(&self.engine, id);
        self.engine.request_render();
        if !self.tool.is_sticky() {
            self.tool = ToolKind::Select;
        }
    }

    fn protection(&self) -> Protected {
        match &self.interaction {
            Interaction::Idle => Protected::none(),
            Interaction::Drawing { id, .. } => Protected::drawing(id.clone()),
            Interaction::Editing { id, .. } => Protected::editing(id.clone()),
        }
    }

    /// Apply pending store notifications to the local graph.
    pub fn sync(&mut self) -> Option<ReconcileReport> {
        let protect = self.protection();
        let report = self.adapter.pump(&mut self.engine, &protect)?;

        let removed = self.interaction.target().filter(|id| !self.engine.contains(id)).cloned();
        if let Some(id) = removed {
            log::debug!("Active object {} was removed remotely", id);
            self.interaction = Interaction::Idle;
            self.engine.clear_active();
        }
        if let Some(active) = self.engine.active() {
            if report.updated.contains(active) && !self.panel_editing {
                if let Some(shape) = self.engine.object(active) {
                    self.attributes = ElementAttributes::from_shape(shape);
                }
            }
        }
        Some(report)
    }

    /// Clear the whole board for everyone.
    pub fn reset(&mut self) -> bool {
        let reset = self.adapter.reset(&mut self.engine);
        if reset {
            self.interaction = Interaction::Idle;
            self.attributes = ElementAttributes::default();
            self.panel_editing = false;
            self.tool = ToolKind::Select;
        }
        reset
    }

    /// Delete the active object. A no-op when nothing is selected.
    pub fn delete_active(&mut self) -> bool {
        let Some(id) = self.engine.active().cloned() else {
            return false;
        };
        if self.interaction.target() == Some(&id) {
            self.interaction = Interaction::Idle;
        }
        self.adapter.delete(&mut self.engine, &id)
    }

    fn add_and_sync(&mut self, shape: Shape) -> ObjectId {
        let id = shape.id().clone();
        self.engine.add_object(shape);
        self.engine.request_render();
        self.adapter.upsert(&self.engine, &id);
        id
    }

    /// Insert an uploaded image, scaled to the configured size.
    ///
    /// Returns `None` when the bytes are not a supported image format.
    pub fn insert_image(&mut self, position: Point, data: &[u8], width: u32, height: u32) -> Option<ObjectId> {
        let Some(image) = Image::from_bytes(position, data, width, height) else {
            log::warn!("Unsupported image upload ({} bytes)", data.len());
            return None;
        };
        let max = self.config.max_image_size;
        self.end_interaction();
        self.tool = ToolKind::Select;
        Some(self.add_and_sync(Shape::Image(image.fit_within(max, max))))
    }

    /// Insert an image by URL.
    pub fn insert_image_url(&mut self, position: Point, src: &str, width: f64, height: f64) -> ObjectId {
        let max = self.config.max_image_size;
        let image = Image::from_url(position, src, width, height).fit_within(max, max);
        self.end_interaction();
        self.tool = ToolKind::Select;
        self.add_and_sync(Shape::Image(image))
    }

    /// Apply an attribute panel edit to the active object and persist it.
    ///
    /// Returns whether the object changed.
    pub fn modify_active(&mut self, property: &str, value: &str) -> Result<bool, AttributeError> {
        let edit = AttributeEdit::parse(property, value)?;
        self.attributes.set(property, value)?;
        self.panel_editing = true;

        let Some(id) = self.engine.active().cloned() else {
            return Ok(false);
        };
        let Some(shape) = self.engine.object_mut(&id) else {
            return Ok(false);
        };
        if !edit.apply(shape)? {
            return Ok(false);
        }
        self.engine.set_coords(&id);
        self.engine.request_render();
        self.adapter.upsert(&self.engine, &id);
        Ok(true)
    }

    /// Run the board command bound to a key press.
    pub fn handle_key(&mut self, input: &KeyInput) -> Option<KeyCommand> {
        let command = KeyCommand::resolve(input)?;
        match command {
            KeyCommand::Copy => self.copy(),
            KeyCommand::Paste => {
                self.paste();
            }
            KeyCommand::Cut => {
                self.copy();
                self.delete_active();
            }
            KeyCommand::Delete => {
                self.delete_active();
            }
            KeyCommand::Undo => {
                self.end_interaction();
                if self.adapter.undo() {
                    self.sync();
                }
            }
            KeyCommand::Redo => {
                self.end_interaction();
                if self.adapter.redo() {
                    self.sync();
                }
            }
            KeyCommand::Escape => {
                self.end_interaction();
                self.engine.clear_active();
                self.panel_editing = false;
            }
        }
        Some(command)
    }

    fn copy(&mut self) {
        let active = self.engine.active().and_then(|id| self.engine.object(id));
        if let Some(shape) = active {
            self.clipboard = Some(shape.clone());
        }
    }

    /// Paste a fresh copy, each paste offset from the previous one.
    fn paste(&mut self) -> Option<ObjectId> {
        let offset = self.config.paste_offset;
        let clipboard = self.clipboard.as_mut()?;
        clipboard.translate(offset, offset);
        let copy = clipboard.with_new_id();

        self.end_interaction();
        let id = self.add_and_sync(copy);
        self.engine.set_active(&id);
        Some(id)
    }
}
