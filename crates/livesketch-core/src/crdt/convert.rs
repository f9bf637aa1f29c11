//! Conversion between store payloads and Loro values.

use std::collections::BTreeMap;

use loro::{LoroMap, LoroResult, LoroValue};

use crate::shapes::ObjectId;
use crate::store::Payloads;

/// Read every entry of the shapes map as a raw payload.
///
/// Entries written as anything other than a string (older clients kept
/// nested maps) come back as `None`.
pub fn payloads_from_loro(shapes: &LoroMap) -> Payloads {
    let mut payloads = Payloads::new();
    let LoroValue::Map(map) = shapes.get_deep_value() else {
        return payloads;
    };
    for (key, value) in map.iter() {
        let payload = match value {
            LoroValue::String(json) => Some(json.to_string()),
            _ => None,
        };
        payloads.insert(ObjectId::from(key.as_str()), payload);
    }
    payloads
}

/// Apply staged writes to the shapes map. `None` deletes the entry.
/// Returns the number of entries touched.
///
/// Writes are not rolled back on error, so callers only apply to an
/// attached document (see `LoroStore::mutate`).
pub fn apply_staged(shapes: &LoroMap, staged: BTreeMap<ObjectId, Option<String>>) -> LoroResult<usize> {
    let mut touched = 0;
    for (id, op) in staged {
        match op {
            Some(json) => shapes.insert(id.as_str(), json)?,
            None => shapes.delete(id.as_str())?,
        }
        touched += 1;
    }
    Ok(touched)
}
