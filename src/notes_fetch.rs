use serde::Serialize;

use crate::http_client::{CacheMode, Fetch, FetchError, FetchResponse};
use crate::platform::Platform;

pub const DEFAULT_NOTE_TEXT: &str = "• No sizing notes have been published for this platform yet.\n\
• Contact the infrastructure team for guidance on this configuration.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoteStatus {
    Idle,
    Loading,
    Loaded,
    Fallback,
    Error,
}

impl NoteStatus {
    fn rank(self) -> u8 {
        match self {
            NoteStatus::Idle => 0,
            NoteStatus::Loading => 1,
            NoteStatus::Loaded | NoteStatus::Fallback | NoteStatus::Error => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// Statuses only move forward: idle, loading, then one terminal state.
    pub fn can_advance_to(self, next: NoteStatus) -> bool {
        next.rank() > self.rank()
    }
}

pub fn note_status_label(status: NoteStatus) -> &'static str {
    match status {
        NoteStatus::Idle => "idle",
        NoteStatus::Loading => "loading",
        NoteStatus::Loaded => "loaded",
        NoteStatus::Fallback => "fallback",
        NoteStatus::Error => "error",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub content: String,
    pub status: NoteStatus,
}

impl Default for NoteEntry {
    fn default() -> Self {
        Self {
            content: String::new(),
            status: NoteStatus::Idle,
        }
    }
}

impl NoteEntry {
    pub fn fallback(status: NoteStatus) -> Self {
        Self {
            content: DEFAULT_NOTE_TEXT.to_string(),
            status,
        }
    }

    /// One-line hint shown under the notes panel.
    pub fn hint(&self) -> Option<&'static str> {
        match self.status {
            NoteStatus::Idle | NoteStatus::Loading => Some("Loading notes..."),
            NoteStatus::Fallback => Some("Notes file not found, showing defaults"),
            NoteStatus::Error => Some("Notes could not be loaded, showing defaults"),
            NoteStatus::Loaded => None,
        }
    }
}

/// Maps a fetch result to the stored note.
///
/// An empty or whitespace-only body falls back to the default text but keeps
/// the `Loaded` status.
pub fn resolve_note(outcome: Result<FetchResponse, FetchError>) -> NoteEntry {
    let resp = match outcome {
        Ok(resp) => resp,
        Err(_) => return NoteEntry::fallback(NoteStatus::Error),
    };
    if !resp.is_success() {
        return NoteEntry::fallback(NoteStatus::Fallback);
    }
    let Ok(text) = String::from_utf8(resp.body) else {
        return NoteEntry::fallback(NoteStatus::Error);
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return NoteEntry::fallback(NoteStatus::Loaded);
    }
    NoteEntry {
        content: trimmed.to_string(),
        status: NoteStatus::Loaded,
    }
}

pub fn load_note(fetcher: &dyn Fetch, platform: Platform) -> NoteEntry {
    let path = platform.notes_path();
    let outcome = fetcher.fetch(path, CacheMode::Bypass);
    match &outcome {
        Ok(resp) if !resp.is_success() => {
            tracing::warn!(
                platform = platform.slug(),
                status = resp.status,
                url = %fetcher.describe(path),
                "notes not available"
            );
        }
        Err(err) => {
            tracing::warn!(platform = platform.slug(), error = %err, "notes fetch failed");
        }
        Ok(_) => {}
    }
    resolve_note(outcome)
}
