//! Kick-count session timing
//!
//! This module provides the `SessionTimer` that manages:
//! - The Idle / Running / Stopped lifecycle of one session
//! - A cancellable once-per-second tick deriving elapsed time from the start instant
//! - The minimum-duration gate and hand-off to the record store on save

mod config;
mod state;
mod timer;

pub use config::SessionConfig;
pub use state::{SaveOutcome, SessionSnapshot, TimerState};
pub use timer::SessionTimer;
