//! livesketch replay driver
//!
//! Drives several in-process peers through a scripted session and reports
//! their shared documents.

mod replay;

pub use replay::{Action, Peer, Replay, Script, Step};
