//! Local engine changes to store mutations.
//!
//! Every operation is a silent no-op when the object it names is gone, so
//! events that fire with stale references are harmless.

use crate::engine::CanvasEngine;
use crate::record::ShapeRecord;
use crate::shapes::ObjectId;
use crate::store::{SharedStore, StoreResult};

/// Serialize the engine's object `id` and write it to the store.
///
/// Returns `false` when the object is absent or its record is unchanged.
pub fn upsert<S, E>(store: &mut S, engine: &E, id: &ObjectId) -> StoreResult<bool>
where
    S: SharedStore,
    E: CanvasEngine + ?Sized,
{
    let Some(shape) = engine.object(id) else {
        return Ok(false);
    };
    let record = ShapeRecord::from_shape(shape)?;
    store.mutate(|storage| storage.set(&record))
}

/// Remove `id` from the store, then from the engine.
///
/// The local object stays when the store rejects the transaction.
pub fn delete<S, E>(store: &mut S, engine: &mut E, id: &ObjectId) -> StoreResult<bool>
where
    S: SharedStore,
    E: CanvasEngine + ?Sized,
{
    let in_store = store.mutate(|storage| Ok(storage.delete(id)))?;
    let in_engine = engine.remove_object(id).is_some();
    if in_engine {
        engine.request_render();
    }
    Ok(in_store || in_engine)
}

/// Clear every store entry in one transaction, then clear the engine.
///
/// Returns the number of store entries removed.
pub fn reset<S, E>(store: &mut S, engine: &mut E) -> StoreResult<usize>
where
    S: SharedStore,
    E: CanvasEngine + ?Sized,
{
    let removed = store.mutate(|storage| Ok(storage.clear()))?;
    engine.clear();
    engine.request_render();
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SceneGraph;
    use crate::crdt::LoroStore;
    use crate::shapes::{Circle, Rectangle, Shape};
    use crate::store::StoreError;
    use kurbo::Point;

    fn scene_with(shapes: Vec<Shape>) -> SceneGraph {
        let mut scene = SceneGraph::new();
        for shape in shapes {
            scene.add_object(shape);
        }
        scene
    }

    #[test]
    fn test_upsert_writes_record() {
        let mut store = LoroStore::new();
        let shape = Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 90.0, 90.0));
        let id = shape.id().clone();
        let scene = scene_with(vec![shape.clone()]);

        assert!(upsert(&mut store, &scene, &id).unwrap());
        let record = &store.canvas_objects()[&id];
        assert_eq!(record.to_shape().unwrap(), shape);
    }

    #[test]
    fn test_upsert_unchanged_is_noop() {
        let mut store = LoroStore::new();
        let shape = Shape::Circle(Circle::new(Point::ZERO, 5.0));
        let id = shape.id().clone();
        let scene = scene_with(vec![shape]);

        assert!(upsert(&mut store, &scene, &id).unwrap());
        store.take_notifications();

        assert!(!upsert(&mut store, &scene, &id).unwrap());
        assert!(store.take_notifications().is_empty());
    }

    #[test]
    fn test_stale_references_are_noops() {
        let mut store = LoroStore::new();
        let mut scene = SceneGraph::new();
        let ghost = ObjectId::from("ghost");

        assert!(!upsert(&mut store, &scene, &ghost).unwrap());
        assert!(!delete(&mut store, &mut scene, &ghost).unwrap());
        assert!(store.take_notifications().is_empty());
    }

    #[test]
    fn test_delete_removes_both_sides() {
        let mut store = LoroStore::new();
        let shape = Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0));
        let id = shape.id().clone();
        let mut scene = scene_with(vec![shape]);
        upsert(&mut store, &scene, &id).unwrap();

        assert!(delete(&mut store, &mut scene, &id).unwrap());
        assert!(store.canvas_objects().is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = LoroStore::new();
        let shapes: Vec<Shape> = (0..5)
            .map(|i| Shape::Rectangle(Rectangle::new(Point::new(i as f64 * 20.0, 0.0), 10.0, 10.0)))
            .collect();
        let ids: Vec<ObjectId> = shapes.iter().map(|s| s.id().clone()).collect();
        let mut scene = scene_with(shapes);
        for id in &ids {
            upsert(&mut store, &scene, id).unwrap();
        }
        store.take_notifications();

        assert_eq!(reset(&mut store, &mut scene).unwrap(), 5);
        assert!(store.is_empty());
        assert!(scene.is_empty());
        assert_eq!(store.take_notifications().len(), 1);
    }

    /// Store that rejects every transaction.
    struct RejectingStore;

    impl SharedStore for RejectingStore {
        fn canvas_objects(&self) -> std::collections::BTreeMap<ObjectId, ShapeRecord> {
            Default::default()
        }

        fn mutate<R, F>(&mut self, _body: F) -> StoreResult<R>
        where
            F: FnOnce(&mut crate::store::StorageHandle<'_>) -> StoreResult<R>,
        {
            Err(StoreError::Aborted("rejected".to_string()))
        }

        fn take_notifications(&mut self) -> Vec<crate::store::ChangeNotification> {
            Vec::new()
        }

        fn undo(&mut self) -> bool {
            false
        }

        fn redo(&mut self) -> bool {
            false
        }

        fn can_undo(&self) -> bool {
            false
        }

        fn can_redo(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_aborted_delete_keeps_local_object() {
        let shape = Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0));
        let id = shape.id().clone();
        let mut scene = scene_with(vec![shape]);

        assert!(delete(&mut RejectingStore, &mut scene, &id).is_err());
        assert!(scene.contains(&id));

        assert!(reset(&mut RejectingStore, &mut scene).is_err());
        assert_eq!(scene.len(), 1);
    }
}
