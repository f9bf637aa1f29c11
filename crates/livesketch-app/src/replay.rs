//! Scripted multi-peer replay.
//!
//! A script is a JSON list of steps, each addressed to one peer:
//!
//! ```json
//! [
//!   { "peer": 0, "action": "tool", "tool": "rectangle" },
//!   { "peer": 0, "action": "event", "event": { "type": "pointerDown", "point": { "x": 10, "y": 10 } } },
//!   { "peer": 0, "action": "event", "event": { "type": "pointerUp", "point": { "x": 100, "y": 100 } } },
//!   { "peer": 1, "action": "sync" }
//! ]
//! ```
//!
//! `sync` exchanges updates between every pair of peers and lets each one
//! reconcile, whichever peer it is addressed to.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use kurbo::Point;
use livesketch_core::{
    BoardConfig, BoardSession, CanvasEvent, KeyInput, LoroStore, SceneGraph, SharedStore, ToolKind,
};
use serde::Deserialize;
use serde_json::{Value, json};

pub type Peer = BoardSession<LoroStore, SceneGraph>;

/// What a step does to its peer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    Tool { tool: ToolKind },
    Event { event: CanvasEvent },
    Key(KeyInput),
    Attribute { property: String, value: String },
    /// Insert an image by URL at `(x, y)`.
    Image {
        x: f64,
        y: f64,
        src: String,
        width: f64,
        height: f64,
    },
    Reset,
    Sync,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub peer: usize,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid script {}", path.display()))
    }
}

/// A set of peers sharing one board.
pub struct Replay {
    peers: Vec<Peer>,
}

impl Replay {
    pub fn new(count: usize, config: &BoardConfig) -> Result<Self> {
        if count == 0 {
            bail!("A replay needs at least one peer");
        }
        let peers = (0..count)
            .map(|_| BoardSession::new(LoroStore::with_config(&config.undo), SceneGraph::new(), config.clone()))
            .collect();
        Ok(Self { peers })
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn run(&mut self, script: &Script) -> Result<()> {
        for (index, step) in script.steps.iter().enumerate() {
            self.apply(step)
                .with_context(|| format!("Step {} failed", index))?;
        }
        Ok(())
    }

    pub fn apply(&mut self, step: &Step) -> Result<()> {
        let count = self.peers.len();
        let Some(peer) = self.peers.get_mut(step.peer) else {
            bail!("No peer {} (replay has {})", step.peer, count);
        };
        log::debug!("Peer {}: {:?}", step.peer, step.action);

        match &step.action {
            Action::Tool { tool } => peer.set_tool(*tool),
            Action::Event { event } => {
                peer.engine_mut().emit(event.clone());
                peer.process_events();
            }
            Action::Key(input) => {
                if peer.handle_key(input).is_none() {
                    log::debug!("Key {:?} is not bound", input.key);
                }
            }
            Action::Attribute { property, value } => {
                if let Err(e) = peer.modify_active(property, value) {
                    log::warn!("Peer {}: {}", step.peer, e);
                }
            }
            Action::Image {
                x,
                y,
                src,
                width,
                height,
            } => {
                peer.insert_image_url(Point::new(*x, *y), src, *width, *height);
            }
            Action::Reset => {
                peer.reset();
            }
            Action::Sync => self.sync_all()?,
        }
        Ok(())
    }

    /// Exchange missing updates between every pair of peers, then reconcile each.
    pub fn sync_all(&mut self) -> Result<()> {
        for from in 0..self.peers.len() {
            for to in 0..self.peers.len() {
                if from == to {
                    continue;
                }
                let since = self.peers[to].store().version();
                let bytes = self.peers[from].store().export_updates(&since)?;
                self.peers[to].store_mut().import(&bytes)?;
            }
        }
        for peer in &mut self.peers {
            peer.sync();
        }
        Ok(())
    }

    /// Whether every peer holds the same shared document.
    pub fn converged(&self) -> bool {
        let mut documents = self.peers.iter().map(|peer| peer.store().canvas_objects());
        match documents.next() {
            Some(first) => documents.all(|doc| doc == first),
            None => true,
        }
    }

    /// Every peer's shared document as JSON.
    pub fn documents(&self) -> Value {
        let peers: Vec<Value> = self
            .peers
            .iter()
            .enumerate()
            .map(|(index, peer)| {
                let objects: Vec<Value> = peer
                    .store()
                    .canvas_objects()
                    .values()
                    .filter_map(|record| serde_json::to_value(record).ok())
                    .collect();
                json!({
                    "peer": index,
                    "peerId": peer.store().peer_id(),
                    "objects": objects,
                })
            })
            .collect();
        Value::Array(peers)
    }
}
