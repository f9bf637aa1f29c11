//! livesketch core library
//!
//! Shape model, shared-store abstraction and the sync adapter that keeps a
//! local canvas object graph and a collaborative document in step.

pub mod attributes;
pub mod canvas;
pub mod config;
pub mod crdt;
pub mod engine;
pub mod keys;
pub mod presence;
pub mod record;
pub mod session;
pub mod shapes;
pub mod store;
pub mod sync;
pub mod tools;

pub use attributes::{AttributeEdit, AttributeError, ElementAttributes};
pub use canvas::SceneGraph;
pub use config::{BoardConfig, ConfigError, UndoConfig};
pub use crdt::LoroStore;
pub use engine::{CanvasEngine, CanvasEvent, EventEmitter, EventSubscription};
pub use keys::{KeyCommand, KeyInput, ShortcutRegistry};
pub use presence::{PresenceMessage, PresenceTracker};
pub use record::{RecordError, ShapeRecord};
pub use session::BoardSession;
pub use shapes::{ObjectId, Shape, ShapeKind};
pub use store::{ChangeNotification, Origin, SharedStore, StorageHandle, StoreError, StoreResult};
pub use sync::{Protected, ReconcileReport, SyncAdapter};
pub use tools::{Interaction, ToolKind};
