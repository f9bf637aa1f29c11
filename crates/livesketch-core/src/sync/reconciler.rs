//! Store state to local object graph.

use std::collections::BTreeMap;

use crate::engine::CanvasEngine;
use crate::record::ShapeRecord;
use crate::shapes::ObjectId;

/// Objects the reconciler must not touch during a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Protected {
    /// Object under local edit: never overwritten, but removed if deleted remotely.
    pub editing: Option<ObjectId>,
    /// Provisional shape still being drawn: not in the store yet, never removed.
    pub drawing: Option<ObjectId>,
}

impl Protected {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn editing(id: ObjectId) -> Self {
        Self {
            editing: Some(id),
            drawing: None,
        }
    }

    pub fn drawing(id: ObjectId) -> Self {
        Self {
            editing: None,
            drawing: Some(id),
        }
    }

    fn shields(&self, id: &ObjectId) -> bool {
        self.editing.as_ref() == Some(id) || self.drawing.as_ref() == Some(id)
    }
}

/// Outcome of one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<ObjectId>,
    pub updated: Vec<ObjectId>,
    pub removed: Vec<ObjectId>,
    /// Records left unapplied because the object is mid-edit.
    pub protected: Vec<ObjectId>,
    /// Records this client cannot decode.
    pub skipped: Vec<ObjectId>,
}

impl ReconcileReport {
    /// Whether the pass changed the local graph.
    pub fn changed(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty())
    }
}

/// Bring the engine's object graph in line with `records`.
///
/// Whole-document diff: creates missing objects, overwrites changed ones,
/// removes objects absent from the store, then requests exactly one render.
pub fn reconcile<E>(engine: &mut E, records: &BTreeMap<ObjectId, ShapeRecord>, protect: &Protected) -> ReconcileReport
where
    E: CanvasEngine + ?Sized,
{
    let mut report = ReconcileReport::default();

    for (id, record) in records {
        if protect.shields(id) && engine.contains(id) {
            report.protected.push(id.clone());
            continue;
        }

        let shape = match record.to_shape() {
            Ok(shape) => shape,
            Err(e) => {
                log::warn!("Skipping record {}: {}", id, e);
                report.skipped.push(id.clone());
                continue;
            }
        };

        match engine.object_mut(id) {
            Some(existing) if *existing == shape => {}
            Some(existing) => {
                *existing = shape;
                engine.set_coords(id);
                report.updated.push(id.clone());
            }
            None => {
                engine.add_object(shape);
                report.created.push(id.clone());
            }
        }
    }

    for id in engine.object_ids() {
        if records.contains_key(&id) || protect.drawing.as_ref() == Some(&id) {
            continue;
        }
        engine.remove_object(&id);
        report.removed.push(id);
    }

    engine.request_render();
    log::debug!(
        "Reconciled: {} created, {} updated, {} removed, {} protected, {} skipped",
        report.created.len(),
        report.updated.len(),
        report.removed.len(),
        report.protected.len(),
        report.skipped.len()
    );
    report
}
