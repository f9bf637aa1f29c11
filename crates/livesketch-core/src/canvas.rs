//! In-memory scene graph.

use std::collections::{BTreeSet, HashMap};

use kurbo::{Point, Rect};

use crate::engine::{CanvasEngine, CanvasEvent, EventEmitter, EventSubscription};
use crate::shapes::{ObjectId, Shape};

/// The local object graph: live shapes keyed by id plus their z-order.
#[derive(Debug, Default)]
pub struct SceneGraph {
    /// All live objects, keyed by id.
    objects: HashMap<ObjectId, Shape>,
    /// Z-order of objects (back to front).
    z_order: Vec<ObjectId>,
    /// Currently selected object.
    active: Option<ObjectId>,
    /// Objects whose transform must be recomputed before the next frame.
    dirty_coords: BTreeSet<ObjectId>,
    /// Renders requested since creation.
    render_requests: usize,
    emitter: EventEmitter,
}

impl SceneGraph {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an input or lifecycle event to subscribers.
    pub fn emit(&mut self, event: CanvasEvent) {
        self.emitter.emit(event);
    }

    /// Ids of every object under a point, front to back.
    pub fn objects_at_point(&self, point: Point, tolerance: f64) -> Vec<ObjectId> {
        self.z_order
            .iter()
            .rev()
            .filter(|id| {
                self.objects
                    .get(*id)
                    .is_some_and(|s| s.hit_test(point, tolerance))
            })
            .cloned()
            .collect()
    }

    /// Bounding box of all objects.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .values()
            .map(Shape::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn render_count(&self) -> usize {
        self.render_requests
    }

    /// Take the set of objects marked for a transform recompute.
    pub fn take_dirty_coords(&mut self) -> BTreeSet<ObjectId> {
        std::mem::take(&mut self.dirty_coords)
    }
}

impl CanvasEngine for SceneGraph {
    fn add_object(&mut self, shape: Shape) {
        let id = shape.id().clone();
        if self.objects.insert(id.clone(), shape).is_none() {
            self.z_order.push(id);
        }
    }

    fn remove_object(&mut self, id: &ObjectId) -> Option<Shape> {
        let removed = self.objects.remove(id)?;
        self.z_order.retain(|other| other != id);
        self.dirty_coords.remove(id);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        Some(removed)
    }

    fn object(&self, id: &ObjectId) -> Option<&Shape> {
        self.objects.get(id)
    }

    fn object_mut(&mut self, id: &ObjectId) -> Option<&mut Shape> {
        self.objects.get_mut(id)
    }

    fn object_ids(&self) -> Vec<ObjectId> {
        self.z_order.clone()
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.z_order.clear();
        self.dirty_coords.clear();
        self.active = None;
    }

    fn object_at(&self, point: Point, tolerance: f64) -> Option<ObjectId> {
        self.objects_at_point(point, tolerance).into_iter().next()
    }

    fn set_active(&mut self, id: &ObjectId) {
        if self.objects.contains_key(id) {
            self.active = Some(id.clone());
        }
    }

    fn active(&self) -> Option<&ObjectId> {
        self.active.as_ref()
    }

    fn clear_active(&mut self) {
        self.active = None;
    }

    fn set_coords(&mut self, id: &ObjectId) {
        if self.objects.contains_key(id) {
            self.dirty_coords.insert(id.clone());
        }
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn subscribe(&mut self) -> EventSubscription {
        self.emitter.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;

    fn rect_at(x: f64, y: f64) -> Shape {
        Shape::Rectangle(Rectangle::new(Point::new(x, y), 100.0, 50.0))
    }

    #[test]
    fn test_scene_creation() {
        let scene = SceneGraph::new();
        assert!(scene.is_empty());
        assert!(scene.active().is_none());
        assert_eq!(scene.render_count(), 0);
    }

    #[test]
    fn test_add_and_remove() {
        let mut scene = SceneGraph::new();
        let shape = rect_at(0.0, 0.0);
        let id = shape.id().clone();

        scene.add_object(shape);
        assert_eq!(scene.len(), 1);
        assert!(scene.contains(&id));

        assert!(scene.remove_object(&id).is_some());
        assert!(scene.is_empty());
        assert!(scene.remove_object(&id).is_none());
    }

    #[test]
    fn test_replacing_keeps_z_order() {
        let mut scene = SceneGraph::new();
        let first = rect_at(0.0, 0.0);
        let second = rect_at(10.0, 10.0);
        let id1 = first.id().clone();
        scene.add_object(first.clone());
        scene.add_object(second);

        let mut moved = first;
        moved.translate(5.0, 5.0);
        scene.add_object(moved);

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.object_ids()[0], id1);
    }

    #[test]
    fn test_z_order() {
        let mut scene = SceneGraph::new();
        let a = rect_at(0.0, 0.0);
        let b = rect_at(25.0, 25.0);
        let (id_a, id_b) = (a.id().clone(), b.id().clone());
        scene.add_object(a);
        scene.add_object(b);

        assert_eq!(scene.object_ids(), vec![id_a.clone(), id_b.clone()]);
        // A removed object rejoins on top
        let a = scene.remove_object(&id_a).unwrap();
        scene.add_object(a);
        assert_eq!(scene.object_ids(), vec![id_b, id_a]);
    }

    #[test]
    fn test_object_at_prefers_topmost() {
        let mut scene = SceneGraph::new();
        let below = rect_at(0.0, 0.0);
        let above = rect_at(50.0, 0.0);
        let above_id = above.id().clone();
        scene.add_object(below);
        scene.add_object(above);

        assert_eq!(scene.objects_at_point(Point::new(75.0, 25.0), 0.0).len(), 2);
        assert_eq!(scene.object_at(Point::new(75.0, 25.0), 0.0), Some(above_id));
        assert_eq!(scene.object_at(Point::new(500.0, 500.0), 0.0), None);
    }

    #[test]
    fn test_active_slot() {
        let mut scene = SceneGraph::new();
        let shape = rect_at(0.0, 0.0);
        let id = shape.id().clone();

        // Absent objects cannot become active
        scene.set_active(&id);
        assert!(scene.active().is_none());

        scene.add_object(shape);
        scene.set_active(&id);
        assert_eq!(scene.active(), Some(&id));

        scene.remove_object(&id);
        assert!(scene.active().is_none());
    }

    #[test]
    fn test_dirty_coords_and_render() {
        let mut scene = SceneGraph::new();
        let shape = rect_at(0.0, 0.0);
        let id = shape.id().clone();
        scene.add_object(shape);

        scene.set_coords(&id);
        scene.set_coords(&ObjectId::from("ghost"));
        scene.request_render();

        assert_eq!(scene.take_dirty_coords().into_iter().collect::<Vec<_>>(), vec![id]);
        assert!(scene.take_dirty_coords().is_empty());
        assert_eq!(scene.render_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut scene = SceneGraph::new();
        for i in 0..3 {
            scene.add_object(rect_at(i as f64 * 10.0, 0.0));
        }
        let first = scene.object_ids()[0].clone();
        scene.set_active(&first);

        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.active().is_none());
        assert!(scene.bounds().is_none());
    }

    #[test]
    fn test_subscription_receives_emitted_events() {
        let mut scene = SceneGraph::new();
        let subscription = scene.subscribe();
        scene.emit(CanvasEvent::PointerUp { point: Point::new(1.0, 1.0) });
        assert_eq!(subscription.drain().len(), 1);

        drop(subscription);
        scene.emit(CanvasEvent::SelectionCleared);
    }
}
