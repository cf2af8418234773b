//! Bounded, session-scoped buffer for traffic not yet flushed to disk.
//!
//! The external recorder feeds entries in through a per-exchange callback;
//! query calls read the same buffer through the summary/search surface a
//! parsed file gets. The tracker is an explicitly constructed value owned by
//! the engine, not a module-level singleton, so tests can run independent
//! sessions side by side.

use std::collections::VecDeque;

use crate::har::model::{Creator, Entry, Har, Log};
use crate::stats::{self, Summary};

pub const DEFAULT_CAPACITY: usize = 10_000;

/// Live capture session: Idle until `start_session`, Active until
/// `stop_session`. `add` outside an active session is a deliberate no-op;
/// the recorder callback must never crash its host.
#[derive(Debug)]
pub struct LiveTracker {
    session_id: Option<String>,
    buffer: VecDeque<Entry>,
    capacity: usize,
}

impl Default for LiveTracker {
    fn default() -> Self {
        LiveTracker::new(DEFAULT_CAPACITY)
    }
}

impl LiveTracker {
    pub fn new(capacity: usize) -> Self {
        LiveTracker {
            session_id: None,
            buffer: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Begin a session. Starting over an already-active session replaces it
    /// and drops the previous buffer.
    pub fn start_session(&mut self, id: &str) {
        self.session_id = Some(id.to_string());
        self.buffer.clear();
    }

    /// End the session, drop its buffer, and return to Idle.
    pub fn stop_session(&mut self) {
        self.session_id = None;
        self.buffer.clear();
    }

    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Append one captured exchange. FIFO eviction keeps the buffer at the
    /// most recent `capacity` entries.
    pub fn add(&mut self, entry: Entry) {
        if self.session_id.is_none() {
            return;
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered entries in arrival order. Safe in any state; Idle with an
    /// empty buffer is just an empty result.
    pub fn get_all(&self) -> Vec<Entry> {
        self.buffer.iter().cloned().collect()
    }

    /// The most recent `k` entries, oldest of those first.
    pub fn get_latest(&self, k: usize) -> Vec<Entry> {
        let skip = self.buffer.len().saturating_sub(k);
        self.buffer.iter().skip(skip).cloned().collect()
    }

    /// Wrap the buffer in a HAR document, same shape a flushed file has.
    pub fn to_har(&self) -> Har {
        Har {
            log: Log {
                version: Some("1.2".to_string()),
                creator: Some(Creator {
                    name: "harlens-live".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                }),
                entries: self.get_all(),
            },
        }
    }

    pub fn summary(&self) -> Summary {
        let entries = self.get_all();
        stats::summarize(&entries)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
