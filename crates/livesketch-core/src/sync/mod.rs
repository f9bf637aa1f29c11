//! Sync adapter between the canvas engine and the shared store.
//!
//! Local changes flow out through the [`translator`]; store notifications
//! flow back in through the [`reconciler`]. The pipeline is explicit:
//!
//! ```text
//! mutate -> commit -> notification -> pump() -> reconcile -> render
//! ```
//!
//! Store failures never escape the adapter. A rejected transaction leaves the
//! local graph as it was and the next notification re-synchronizes it.

pub mod reconciler;
pub mod translator;

pub use reconciler::{Protected, ReconcileReport, reconcile};

use crate::engine::CanvasEngine;
use crate::shapes::ObjectId;
use crate::store::{Origin, SharedStore};

/// Keeps one engine's object graph and one shared store in step.
pub struct SyncAdapter<S> {
    store: S,
}

impl<S: SharedStore> SyncAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Persist the engine's current state of `id`.
    pub fn upsert<E: CanvasEngine + ?Sized>(&mut self, engine: &E, id: &ObjectId) -> bool {
        match translator::upsert(&mut self.store, engine, id) {
            Ok(written) => written,
            Err(e) => {
                log::warn!("Upsert of {} aborted: {}", id, e);
                false
            }
        }
    }

    /// Delete `id` from the store and the engine.
    pub fn delete<E: CanvasEngine + ?Sized>(&mut self, engine: &mut E, id: &ObjectId) -> bool {
        match translator::delete(&mut self.store, engine, id) {
            Ok(removed) => removed,
            Err(e) => {
                log::warn!("Delete of {} aborted: {}", id, e);
                false
            }
        }
    }

    /// Empty the whole board. Either every entry goes or none does.
    pub fn reset<E: CanvasEngine + ?Sized>(&mut self, engine: &mut E) -> bool {
        match translator::reset(&mut self.store, engine) {
            Ok(removed) => {
                log::info!("Board reset, {} entries removed", removed);
                true
            }
            Err(e) => {
                log::warn!("Reset aborted: {}", e);
                false
            }
        }
    }

    /// Drain pending notifications and reconcile once if there were any.
    pub fn pump<E: CanvasEngine + ?Sized>(&mut self, engine: &mut E, protect: &Protected) -> Option<ReconcileReport> {
        let notifications = self.store.take_notifications();
        if notifications.is_empty() {
            return None;
        }
        let remote = notifications
            .iter()
            .filter(|n| n.origin == Origin::Remote)
            .count();
        log::trace!(
            "{} notifications pending ({} remote)",
            notifications.len(),
            remote
        );
        Some(self.reconcile(engine, protect))
    }

    /// Reconcile against the store's current state unconditionally.
    pub fn reconcile<E: CanvasEngine + ?Sized>(&mut self, engine: &mut E, protect: &Protected) -> ReconcileReport {
        let records = self.store.canvas_objects();
        reconcile(engine, &records, protect)
    }

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }
}
