//! Loro document schema and operations.

use std::collections::BTreeMap;

use loro::{ExportMode, LoroDoc, LoroMap, PeerID, UndoManager, VersionVector};

use super::convert::{apply_staged, payloads_from_loro};
use crate::config::UndoConfig;
use crate::record::ShapeRecord;
use crate::shapes::ObjectId;
use crate::store::{
    ChangeNotification, Payloads, SharedStore, StorageHandle, StoreError, StoreResult, decode_payloads,
};

/// Key for the shapes map in the document.
pub const SHAPES_KEY: &str = "shapes";

/// A CRDT-backed shared canvas store.
///
/// Wraps a `LoroDoc` whose root map `shapes` holds one JSON payload per
/// object id, plus an `UndoManager` for local undo/redo.
pub struct LoroStore {
    /// The underlying Loro document.
    doc: LoroDoc,
    /// Undo manager for local undo/redo.
    undo_manager: UndoManager,
    /// Notifications not yet taken by the adapter.
    pending: Vec<ChangeNotification>,
}

impl LoroStore {
    /// Create an empty store with default undo settings.
    pub fn new() -> Self {
        Self::with_undo(LoroDoc::new(), &UndoConfig::default())
    }

    /// Create an empty store with the given undo settings.
    pub fn with_config(undo: &UndoConfig) -> Self {
        Self::with_undo(LoroDoc::new(), undo)
    }

    /// Create a store from a snapshot exported by another participant.
    pub fn from_snapshot(bytes: &[u8], undo: &UndoConfig) -> StoreResult<Self> {
        let doc = LoroDoc::new();
        doc.import(bytes)?;
        Ok(Self::with_undo(doc, undo))
    }

    fn with_undo(doc: LoroDoc, undo: &UndoConfig) -> Self {
        let mut undo_manager = UndoManager::new(&doc);
        undo_manager.set_max_undo_steps(undo.max_steps);
        undo_manager.set_merge_interval(undo.merge_interval_ms);
        Self {
            doc,
            undo_manager,
            pending: Vec::new(),
        }
    }

    fn shapes_map(&self) -> LoroMap {
        self.doc.get_map(SHAPES_KEY)
    }

    fn payloads(&self) -> Payloads {
        payloads_from_loro(&self.shapes_map())
    }

    /// Number of entries, including ones this client cannot decode.
    pub fn len(&self) -> usize {
        self.shapes_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn peer_id(&self) -> PeerID {
        self.doc.peer_id()
    }

    /// Current version vector.
    pub fn version(&self) -> VersionVector {
        self.doc.oplog_vv()
    }

    /// Export the full document state.
    pub fn export_snapshot(&self) -> StoreResult<Vec<u8>> {
        self.doc
            .export(ExportMode::Snapshot)
            .map_err(|e| StoreError::Encode(e.to_string()))
    }

    /// Export the updates a peer at `since` is missing.
    pub fn export_updates(&self, since: &VersionVector) -> StoreResult<Vec<u8>> {
        self.doc
            .export(ExportMode::updates(since))
            .map_err(|e| StoreError::Encode(e.to_string()))
    }

    /// Merge updates or a snapshot from another participant.
    ///
    /// Queues a remote notification when the import changed anything.
    pub fn import(&mut self, bytes: &[u8]) -> StoreResult<()> {
        let before = self.doc.oplog_vv();
        self.doc.import(bytes)?;
        if self.doc.oplog_vv() != before {
            self.pending.push(ChangeNotification::remote());
        }
        Ok(())
    }

    /// Clear undo/redo history.
    pub fn clear_undo_history(&self) {
        self.undo_manager.clear();
    }
}

impl Default for LoroStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStore for LoroStore {
    fn canvas_objects(&self) -> BTreeMap<ObjectId, ShapeRecord> {
        decode_payloads(&self.payloads())
    }

    fn mutate<R, F>(&mut self, body: F) -> StoreResult<R>
    where
        F: FnOnce(&mut StorageHandle<'_>) -> StoreResult<R>,
    {
        let base = self.payloads();
        let mut handle = StorageHandle::new(&base);
        let result = body(&mut handle)?;

        let staged = handle.into_staged();
        if staged.is_empty() {
            return Ok(result);
        }
        // A detached doc rejects every edit; refuse before the first write
        // so a transaction never lands half applied.
        if self.doc.is_detached() {
            return Err(StoreError::Aborted("document is checked out at an old version".to_string()));
        }
        let touched = apply_staged(&self.shapes_map(), staged)?;
        self.doc.commit();
        self.pending.push(ChangeNotification::local());
        log::trace!("Committed transaction touching {} entries", touched);
        Ok(result)
    }

    fn take_notifications(&mut self) -> Vec<ChangeNotification> {
        std::mem::take(&mut self.pending)
    }

    fn undo(&mut self) -> bool {
        match self.undo_manager.undo() {
            Ok(true) => {
                self.doc.commit();
                self.pending.push(ChangeNotification::local());
                true
            }
            Ok(false) => false,
            Err(e) => {
                log::warn!("Undo failed: {}", e);
                false
            }
        }
    }

    fn redo(&mut self) -> bool {
        match self.undo_manager.redo() {
            Ok(true) => {
                self.doc.commit();
                self.pending.push(ChangeNotification::local());
                true
            }
            Ok(false) => false,
            Err(e) => {
                log::warn!("Redo failed: {}", e);
                false
            }
        }
    }

    fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape};
    use kurbo::Point;

    fn record_at(x: f64) -> ShapeRecord {
        ShapeRecord::from_shape(&Shape::Rectangle(Rectangle::new(Point::new(x, 0.0), 10.0, 10.0))).unwrap()
    }

    #[test]
    fn test_detached_doc_rejects_whole_transaction() {
        let mut store = LoroStore::new();
        let (a, b, c) = (record_at(0.0), record_at(20.0), record_at(40.0));
        store.mutate(|storage| storage.set(&a)).unwrap();
        let before_b = store.doc.state_frontiers();
        store.mutate(|storage| storage.set(&b)).unwrap();
        store.take_notifications();

        store.doc.checkout(&before_b).unwrap();
        assert!(store.doc.is_detached());

        let result = store.mutate(|storage| {
            storage.set(&c)?;
            storage.delete(&a.object_id);
            Ok(())
        });
        assert!(matches!(result, Err(StoreError::Aborted(_))));
        assert!(store.take_notifications().is_empty());

        store.doc.checkout_to_latest();
        let ids: Vec<ObjectId> = store.canvas_objects().into_keys().collect();
        let mut expected = vec![a.object_id.clone(), b.object_id.clone()];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_empty_transaction_on_detached_doc() {
        let mut store = LoroStore::new();
        store.mutate(|storage| storage.set(&record_at(0.0))).unwrap();
        let frontiers = store.doc.state_frontiers();
        store.doc.checkout(&frontiers).unwrap();

        // Reads and no-op transactions still work
        assert_eq!(store.mutate(|storage| Ok(storage.len())).unwrap(), 1);
    }
}
