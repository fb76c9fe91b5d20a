//! Typed log entries returned by the turn engine.
//!
//! The presentation layer renders these as console lines and parses
//! the text for cues (audio layers, transitions), so entries are plain
//! `(text, kind)` pairs rather than structured events.

use serde::{Deserialize, Serialize};

/// Rendering category of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    System,
    Error,
    Success,
    Info,
    Input,
    Warning,
}

/// One line of game output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub text: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(text: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(text, EntryKind::System)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, EntryKind::Error)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, EntryKind::Success)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, EntryKind::Info)
    }

    pub fn input(text: impl Into<String>) -> Self {
        Self::new(text, EntryKind::Input)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, EntryKind::Warning)
    }
}
