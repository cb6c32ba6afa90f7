use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// A completed, saved kick-count session
///
/// Field names are serialized in camelCase so records written by earlier
/// versions of the app decode unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DfmRecord {
    /// Unique record identifier, assigned at save time
    pub id: String,

    /// Session start, milliseconds since the Unix epoch
    pub started_at: i64,

    /// Elapsed seconds at save time
    pub duration_seconds: u64,
}

impl DfmRecord {
    pub fn new(id: impl Into<String>, started_at: i64, duration_seconds: u64) -> Self {
        Self {
            id: id.into(),
            started_at,
            duration_seconds,
        }
    }

    /// Session start as a UTC timestamp, if in range
    pub fn started_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.started_at)
    }

    /// Session start in the local timezone, if in range
    pub fn started_at_local(&self) -> Option<DateTime<Local>> {
        self.started_at_utc().map(|t| t.with_timezone(&Local))
    }
}
