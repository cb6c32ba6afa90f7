use std::time::Duration;

/// Configuration for a kick-count session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sessions shorter than this are rejected on save
    /// Default: 60 seconds
    pub min_session_secs: u64,

    /// How often elapsed time is recomputed
    /// Default: 1 second
    pub tick_interval: Duration,

    /// Kicks the user counts to before stopping (display only)
    pub kick_target: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_session_secs: 60,
            tick_interval: Duration::from_secs(1),
            kick_target: 10,
        }
    }
}
