//! Live cursor presence.
//!
//! Presence is ephemeral and travels outside the shared document: each client
//! broadcasts [`PresenceMessage`]s and folds the ones it receives into a
//! [`PresenceTracker`].

use std::collections::BTreeMap;

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Cursor colours, picked by connection id.
pub const CURSOR_COLORS: [&str; 6] = ["#DC2626", "#D97706", "#059669", "#7C3AED", "#DB2777", "#2563EB"];

/// Cursor position relative to the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

/// Presence state for one client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceState {
    #[serde(default)]
    pub cursor: Option<CursorPosition>,
    /// Chat bubble shown next to the cursor.
    #[serde(default)]
    pub message: Option<String>,
}

/// Broadcast presence messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresenceMessage {
    Update {
        connection_id: u64,
        #[serde(flatten)]
        state: PresenceState,
    },
    Left {
        connection_id: u64,
    },
}

/// Local presence plus the last known presence of every other client.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    connection_id: u64,
    local: PresenceState,
    others: BTreeMap<u64, PresenceState>,
}

impl PresenceTracker {
    pub fn new(connection_id: u64) -> Self {
        Self {
            connection_id,
            local: PresenceState::default(),
            others: BTreeMap::new(),
        }
    }

    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    pub fn local(&self) -> &PresenceState {
        &self.local
    }

    /// Track the pointer. `client` is in window coordinates, `canvas_origin`
    /// is the canvas element's top-left corner in the same space.
    pub fn pointer_move(&mut self, client: Point, canvas_origin: Point) -> PresenceMessage {
        self.local.cursor = Some(CursorPosition {
            x: client.x - canvas_origin.x,
            y: client.y - canvas_origin.y,
        });
        self.update()
    }

    pub fn pointer_down(&mut self, client: Point, canvas_origin: Point) -> PresenceMessage {
        self.pointer_move(client, canvas_origin)
    }

    /// The pointer left the canvas: hide the cursor and its message.
    pub fn pointer_leave(&mut self) -> PresenceMessage {
        self.local = PresenceState::default();
        self.update()
    }

    pub fn set_message(&mut self, message: Option<String>) -> PresenceMessage {
        self.local.message = message;
        self.update()
    }

    /// Message announcing that this client is going away.
    pub fn leave(&self) -> PresenceMessage {
        PresenceMessage::Left {
            connection_id: self.connection_id,
        }
    }

    fn update(&self) -> PresenceMessage {
        PresenceMessage::Update {
            connection_id: self.connection_id,
            state: self.local.clone(),
        }
    }

    /// Fold in a message from another client. Echoes of our own are ignored.
    pub fn apply(&mut self, message: PresenceMessage) {
        match message {
            PresenceMessage::Update { connection_id, .. } | PresenceMessage::Left { connection_id }
                if connection_id == self.connection_id => {}
            PresenceMessage::Update { connection_id, state } => {
                self.others.insert(connection_id, state);
            }
            PresenceMessage::Left { connection_id } => {
                self.others.remove(&connection_id);
            }
        }
    }

    /// Every other connected client.
    pub fn others(&self) -> impl Iterator<Item = (u64, &PresenceState)> {
        self.others.iter().map(|(id, state)| (*id, state))
    }

    /// Other clients whose cursor is on the canvas, with their colour.
    pub fn visible_cursors(&self) -> Vec<(u64, CursorPosition, &'static str)> {
        self.others
            .iter()
            .filter_map(|(id, state)| state.cursor.map(|cursor| (*id, cursor, cursor_color(*id))))
            .collect()
    }
}

pub fn cursor_color(connection_id: u64) -> &'static str {
    CURSOR_COLORS[(connection_id % CURSOR_COLORS.len() as u64) as usize]
}
