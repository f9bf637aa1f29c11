//! Canvas engine contract.
//!
//! The engine owns the live object graph and emits pointer and object
//! lifecycle events. The sync adapter and the interaction session only talk
//! to it through [`CanvasEngine`]; [`SceneGraph`](crate::canvas::SceneGraph)
//! is the in-memory implementation.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::shapes::{ObjectId, Shape};

/// Events emitted by the canvas engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CanvasEvent {
    PointerDown { point: Point },
    PointerMove { point: Point },
    PointerUp { point: Point },
    /// A drag, resize or style change on the object was committed.
    ObjectModified { id: ObjectId },
    /// The object is being scaled interactively.
    ObjectScaling { id: ObjectId },
    SelectionCreated { id: ObjectId },
    SelectionCleared,
    /// A freehand stroke was completed and added to the graph.
    PathCreated { id: ObjectId },
}

type EventQueue = RefCell<VecDeque<CanvasEvent>>;

/// Scoped acquisition of an engine's event stream.
///
/// Events are queued only while the subscription is alive; dropping it
/// detaches it from the engine.
#[derive(Debug)]
pub struct EventSubscription {
    queue: Rc<EventQueue>,
}

impl EventSubscription {
    /// Take every event received since the last drain.
    pub fn drain(&self) -> Vec<CanvasEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

/// Engine-side list of live subscriptions.
#[derive(Debug, Default)]
pub struct EventEmitter {
    subscribers: Vec<Weak<EventQueue>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> EventSubscription {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        self.subscribers.push(Rc::downgrade(&queue));
        EventSubscription { queue }
    }

    /// Deliver an event to every live subscription, forgetting released ones.
    pub fn emit(&mut self, event: CanvasEvent) {
        self.subscribers.retain(|weak| match weak.upgrade() {
            Some(queue) => {
                queue.borrow_mut().push_back(event.clone());
                true
            }
            None => false,
        });
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|weak| weak.strong_count() > 0).count()
    }
}

/// Imperative surface of the canvas engine.
pub trait CanvasEngine {
    /// Add an object on top of the z-order. Replaces an object with the same id.
    fn add_object(&mut self, shape: Shape);

    fn remove_object(&mut self, id: &ObjectId) -> Option<Shape>;

    fn object(&self, id: &ObjectId) -> Option<&Shape>;

    fn object_mut(&mut self, id: &ObjectId) -> Option<&mut Shape>;

    /// Ids of every live object, back to front.
    fn object_ids(&self) -> Vec<ObjectId>;

    fn contains(&self, id: &ObjectId) -> bool {
        self.object(id).is_some()
    }

    /// Remove every object and the active selection.
    fn clear(&mut self);

    /// Topmost object under `point`.
    fn object_at(&self, point: Point, tolerance: f64) -> Option<ObjectId>;

    fn set_active(&mut self, id: &ObjectId);

    fn active(&self) -> Option<&ObjectId>;

    fn clear_active(&mut self);

    /// Mark an object whose attributes were overwritten so its transform
    /// is recomputed on the next render.
    fn set_coords(&mut self, id: &ObjectId);

    /// Schedule a redraw.
    fn request_render(&mut self);

    fn subscribe(&mut self) -> EventSubscription;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_live_subscriptions() {
        let mut emitter = EventEmitter::new();
        let first = emitter.subscribe();
        let second = emitter.subscribe();

        emitter.emit(CanvasEvent::SelectionCleared);
        assert_eq!(first.drain(), vec![CanvasEvent::SelectionCleared]);
        assert_eq!(second.drain(), vec![CanvasEvent::SelectionCleared]);
        assert!(first.is_empty());
    }

    #[test]
    fn test_dropped_subscription_is_released() {
        let mut emitter = EventEmitter::new();
        let kept = emitter.subscribe();
        {
            let _scoped = emitter.subscribe();
            assert_eq!(emitter.subscriber_count(), 2);
        }
        assert_eq!(emitter.subscriber_count(), 1);

        emitter.emit(CanvasEvent::PointerDown { point: Point::new(1.0, 2.0) });
        assert_eq!(emitter.subscribers.len(), 1);
        assert_eq!(kept.drain().len(), 1);
    }

    #[test]
    fn test_event_json() {
        let event: CanvasEvent =
            serde_json::from_str(r#"{ "type": "pointerDown", "point": { "x": 10.0, "y": 20.0 } }"#).unwrap();
        assert_eq!(event, CanvasEvent::PointerDown { point: Point::new(10.0, 20.0) });

        let event: CanvasEvent = serde_json::from_str(r#"{ "type": "objectModified", "id": "r1" }"#).unwrap();
        assert_eq!(event, CanvasEvent::ObjectModified { id: ObjectId::from("r1") });

        let event: CanvasEvent = serde_json::from_str(r#"{ "type": "selectionCleared" }"#).unwrap();
        assert_eq!(event, CanvasEvent::SelectionCleared);
    }
}
