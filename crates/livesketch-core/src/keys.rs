//! Keyboard commands and the shortcut registry.

use serde::{Deserialize, Serialize};

/// A key press as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: String,
    /// Ctrl, or Cmd on macOS.
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool, shift: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
            shift,
        }
    }
}

/// Board commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Copy,
    Paste,
    Cut,
    Delete,
    Undo,
    Redo,
    Escape,
}

impl KeyCommand {
    /// Resolve a key press; `None` for keys the board does not handle.
    pub fn resolve(input: &KeyInput) -> Option<Self> {
        let key = input.key.to_ascii_lowercase();
        match (key.as_str(), input.ctrl, input.shift) {
            ("c", true, false) => Some(KeyCommand::Copy),
            ("v", true, false) => Some(KeyCommand::Paste),
            ("x", true, false) => Some(KeyCommand::Cut),
            ("z", true, false) => Some(KeyCommand::Undo),
            ("z", true, true) | ("y", true, false) => Some(KeyCommand::Redo),
            ("delete" | "backspace", false, _) => Some(KeyCommand::Delete),
            ("escape", _, _) => Some(KeyCommand::Escape),
            _ => None,
        }
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: KeyCommand,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: KeyCommand,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("C", true, false, KeyCommand::Copy, "Copy selected shape"),
            Shortcut::new("V", true, false, KeyCommand::Paste, "Paste copied shape"),
            Shortcut::new("X", true, false, KeyCommand::Cut, "Cut selected shape"),
            Shortcut::new("Z", true, false, KeyCommand::Undo, "Undo"),
            Shortcut::new("Z", true, true, KeyCommand::Redo, "Redo"),
            Shortcut::new("Y", true, false, KeyCommand::Redo, "Redo"),
            Shortcut::new("Delete", false, false, KeyCommand::Delete, "Delete selected shape"),
            Shortcut::new("Backspace", false, false, KeyCommand::Delete, "Delete selected shape"),
            Shortcut::new("Escape", false, false, KeyCommand::Escape, "Cancel current action"),
        ]
    }

    /// Shortcut table for help output.
    pub fn help_text() -> String {
        let mut text = String::from("=== Keyboard Shortcuts ===\n");
        for shortcut in Self::all() {
            text.push_str(&format!("  {:20} {}\n", shortcut.format(), shortcut.description));
        }
        text
    }
}
