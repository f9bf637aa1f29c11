//! Shared canvas store contract.
//!
//! The store is the replicated `objectId -> ShapeRecord` mapping every
//! participant reads from and writes to. The sync adapter is a client of this
//! trait; conflict resolution and transport live behind it.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::record::{RecordError, ShapeRecord};
use crate::shapes::ObjectId;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CRDT error: {0}")]
    Crdt(#[from] loro::LoroError),
    #[error("Transaction aborted: {0}")]
    Aborted(String),
    #[error("Encode error: {0}")]
    Encode(String),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Where a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Committed by this client (including undo/redo).
    Local,
    /// Merged from another participant.
    Remote,
}

/// Notification that the shared document changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotification {
    pub origin: Origin,
}

impl ChangeNotification {
    pub fn local() -> Self {
        Self { origin: Origin::Local }
    }

    pub fn remote() -> Self {
        Self { origin: Origin::Remote }
    }
}

/// Raw payloads as read from the store. `None` marks an entry whose value is
/// not a JSON string (written by an incompatible client); it is never parsed
/// but still counts as an entry.
pub type Payloads = BTreeMap<ObjectId, Option<String>>;

/// Staged view of the mapping handed to a transaction body.
///
/// Reads see the body's own writes. Nothing reaches the store unless the body
/// returns `Ok`, and then every staged write is committed together.
pub struct StorageHandle<'a> {
    base: &'a Payloads,
    staged: BTreeMap<ObjectId, Option<String>>,
}

impl<'a> StorageHandle<'a> {
    pub fn new(base: &'a Payloads) -> Self {
        Self {
            base,
            staged: BTreeMap::new(),
        }
    }

    fn payload(&self, id: &ObjectId) -> Option<Option<&str>> {
        match self.staged.get(id) {
            Some(Some(json)) => Some(Some(json.as_str())),
            Some(None) => None,
            None => self.base.get(id).map(|p| p.as_deref()),
        }
    }

    /// Whether an entry exists under `id`.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.payload(id).is_some()
    }

    /// Read the record under `id`; unparsable entries read as `None`.
    pub fn get(&self, id: &ObjectId) -> Option<ShapeRecord> {
        let json = self.payload(id)??;
        ShapeRecord::from_json(json).ok()
    }

    /// Upsert a record. Writing a record equal to the current one stages
    /// nothing, so an unchanged upsert is not observable.
    pub fn set(&mut self, record: &ShapeRecord) -> StoreResult<bool> {
        if self.get(&record.object_id).as_ref() == Some(record) {
            return Ok(false);
        }
        let json = record.to_json()?;
        self.staged.insert(record.object_id.clone(), Some(json));
        Ok(true)
    }

    /// Remove the entry under `id`. Returns whether it existed.
    pub fn delete(&mut self, id: &ObjectId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.staged.insert(id.clone(), None);
        true
    }

    /// All ids currently visible through this handle.
    pub fn keys(&self) -> Vec<ObjectId> {
        let mut keys: Vec<ObjectId> = self
            .base
            .keys()
            .filter(|id| !matches!(self.staged.get(*id), Some(None)))
            .cloned()
            .collect();
        for (id, op) in &self.staged {
            if op.is_some() && !self.base.contains_key(id) {
                keys.push(id.clone());
            }
        }
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let keys = self.keys();
        for id in &keys {
            self.staged.insert(id.clone(), None);
        }
        keys.len()
    }

    /// Staged writes, in id order (`None` = delete).
    pub fn into_staged(self) -> BTreeMap<ObjectId, Option<String>> {
        self.staged
    }
}

/// Decode payloads into records, skipping (and logging) entries that are not
/// records. Skipped entries are left untouched in the store.
pub fn decode_payloads(payloads: &Payloads) -> BTreeMap<ObjectId, ShapeRecord> {
    let mut records = BTreeMap::new();
    for (id, payload) in payloads {
        let Some(json) = payload else {
            log::warn!("Skipping non-record entry {}", id);
            continue;
        };
        match ShapeRecord::from_json(json) {
            Ok(record) if &record.object_id == id => {
                records.insert(id.clone(), record);
            }
            Ok(record) => {
                log::warn!(
                    "Skipping entry {} whose record claims id {}",
                    id,
                    record.object_id
                );
            }
            Err(e) => log::warn!("Skipping entry {}: {}", id, e),
        }
    }
    records
}

/// The replicated shape mapping consumed by the sync adapter.
pub trait SharedStore {
    /// Current records keyed by id.
    fn canvas_objects(&self) -> BTreeMap<ObjectId, ShapeRecord>;

    /// Run `body` against a staged view and commit its writes atomically.
    /// An `Err` from the body discards every staged write.
    fn mutate<R, F>(&mut self, body: F) -> StoreResult<R>
    where
        F: FnOnce(&mut StorageHandle<'_>) -> StoreResult<R>;

    /// Drain pending change notifications.
    fn take_notifications(&mut self) -> Vec<ChangeNotification>;

    /// Undo the last local change.
    fn undo(&mut self) -> bool;

    /// Redo the last undone change.
    fn redo(&mut self) -> bool;

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;
}
