use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::DfmRecord;

/// Lifecycle of a session timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Nothing has been started yet
    Idle,
    /// Ticking
    Running,
    /// Ticking cancelled; elapsed seconds frozen until the next start
    Stopped,
}

/// Point-in-time view of a session timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: TimerState,

    /// Whether the tick is active
    pub is_running: bool,

    /// Last computed elapsed seconds
    pub elapsed_seconds: u64,

    /// Start of the session that can still be saved, if any
    pub started_at: Option<DateTime<Utc>>,
}

/// Result of `SessionTimer::save`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Persisted; the timer has been stopped
    Saved(DfmRecord),
    /// No session has been started (or it was discarded or already saved)
    NotStarted,
    /// Shorter than the configured minimum; nothing persisted
    TooShort { elapsed_seconds: u64, minimum_seconds: u64 },
    /// The store rejected the write; the timer keeps running so the caller can retry
    PersistFailed,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    pub fn record(&self) -> Option<&DfmRecord> {
        match self {
            SaveOutcome::Saved(record) => Some(record),
            _ => None,
        }
    }
}
