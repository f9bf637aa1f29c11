//! Shared canvas store backed by the Loro CRDT.
//!
//! # Schema
//!
//! ```text
//! LoroDoc
//! └── "shapes": LoroMap<objectId, String>
//! ```
//!
//! Each value is the JSON payload of one [`ShapeRecord`](crate::record::ShapeRecord).
//! Records are replaced whole, so concurrent edits to the same object
//! resolve last-writer-wins per record, not per attribute.

mod convert;
mod schema;

pub use schema::{LoroStore, SHAPES_KEY};

// Re-export Loro types needed to drive replication
pub use loro::{PeerID, VersionVector};
