//! Append-only transcript of a negotiation session.
//!
//! ## Design
//! - Entries are stored in append order; display order is arrival order.
//! - `append` is the only mutation. There is no edit, delete or reorder.
//! - Appends happen from one task (the chat loop), so inbound frames and
//!   local sends are serialized by the order that task sees them. No lock.
//! - Renderers subscribe and receive each entry as it is appended.

use serde::Serialize;
use tokio::sync::mpsc;

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Pushed by the server over the channel.
    Remote,
    /// Typed by the user and echoed locally before any server reply.
    Local,
}

/// The speaker an inbound payload announces through its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    You,
    Recruiter,
    JobSeeker,
    Error,
    Unlabelled,
}

/// Classify a payload by the prefix the backend puts on it.
pub fn classify(origin: Origin, text: &str) -> Speaker {
    if origin == Origin::Local {
        return Speaker::You;
    }
    if text.starts_with("Recruiter: ") {
        Speaker::Recruiter
    } else if text.starts_with("Job Seeker: ") {
        Speaker::JobSeeker
    } else if text.starts_with("Error: ") || text.starts_with("AI Error: ") {
        Speaker::Error
    } else {
        Speaker::Unlabelled
    }
}

/// One immutable message record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub origin: Origin,
    /// The payload exactly as sent or received.
    pub text: String,
}

impl TranscriptEntry {
    pub fn speaker(&self) -> Speaker {
        classify(self.origin, &self.text)
    }

    /// Display form: remote payloads verbatim, local ones tagged `You: `.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.origin {
            Origin::Remote => f.write_str(&self.text),
            Origin::Local => write!(f, "You: {}", self.text),
        }
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    subscribers: Vec<mpsc::UnboundedSender<TranscriptEntry>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and notify live subscribers. Returns its index.
    pub fn append(&mut self, origin: Origin, text: impl Into<String>) -> usize {
        let entry = TranscriptEntry {
            origin,
            text: text.into(),
        };
        self.subscribers.retain(|tx| tx.send(entry.clone()).is_ok());
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn append_remote(&mut self, text: impl Into<String>) -> usize {
        self.append(Origin::Remote, text)
    }

    pub fn append_local(&mut self, text: impl Into<String>) -> usize {
        self.append(Origin::Local, text)
    }

    /// Receive every entry appended from now on, in append order.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TranscriptEntry> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TranscriptEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered lines in display order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(TranscriptEntry::render).collect()
    }
}
