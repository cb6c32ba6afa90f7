use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::config::SessionConfig;
use super::state::{SaveOutcome, SessionSnapshot, TimerState};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::record::DfmRecord;
use crate::storage::RecordStore;

/// The session that `save` would persist
#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    /// Wall-clock start, milliseconds since the Unix epoch
    started_at_ms: i64,

    /// Monotonic start used to derive elapsed seconds
    origin: Instant,
}

/// Owns the periodic tick task
///
/// Dropping the ticker closes the gate before aborting the task, so no
/// tick can publish after the drop returns.
struct Ticker {
    live: Arc<Mutex<bool>>,
    handle: JoinHandle<()>,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        *live = false;
        drop(live);
        self.handle.abort();
    }
}

/// Times one kick-count session and gates whether it may be persisted
///
/// Operations are expected to be serialized by the caller.
pub struct SessionTimer {
    config: SessionConfig,

    /// Destination for saved sessions
    store: Arc<RecordStore>,

    /// Mints record identifiers
    ids: Arc<dyn IdGenerator>,

    state: TimerState,

    session: Option<ActiveSession>,

    /// Last computed elapsed seconds, observable by the display
    elapsed: Arc<watch::Sender<u64>>,

    /// Present only while Running
    ticker: Option<Ticker>,
}

impl SessionTimer {
    pub fn new(config: SessionConfig, store: Arc<RecordStore>) -> Self {
        Self::with_id_generator(config, store, Arc::new(UuidGenerator))
    }

    pub fn with_id_generator(
        config: SessionConfig,
        store: Arc<RecordStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let (elapsed, _) = watch::channel(0);

        Self {
            config,
            store,
            ids,
            state: TimerState::Idle,
            session: None,
            elapsed: Arc::new(elapsed),
            ticker: None,
        }
    }

    /// Start timing a new session
    ///
    /// No-op while already running. Must be called from within a tokio
    /// runtime, which hosts the tick task.
    pub fn start(&mut self) -> Result<()> {
        if self.state == TimerState::Running {
            warn!("Session already running");
            return Ok(());
        }

        let period = self.config.tick_interval;
        if period.is_zero() {
            anyhow::bail!("Tick interval must be greater than zero");
        }

        let runtime = tokio::runtime::Handle::try_current()
            .context("Session timer must be started inside a tokio runtime")?;

        let session = ActiveSession {
            started_at_ms: Utc::now().timestamp_millis(),
            origin: Instant::now(),
        };

        self.elapsed.send_replace(0);

        let live = Arc::new(Mutex::new(true));
        let handle = runtime.spawn(Self::tick(
            session.origin,
            period,
            Arc::clone(&self.elapsed),
            Arc::clone(&live),
        ));

        self.session = Some(session);
        self.ticker = Some(Ticker { live, handle });
        self.state = TimerState::Running;

        info!("Session started at {}", session.started_at_ms);

        Ok(())
    }

    /// Recompute elapsed seconds from the start instant once per period
    async fn tick(
        origin: Instant,
        period: std::time::Duration,
        elapsed: Arc<watch::Sender<u64>>,
        live: Arc<Mutex<bool>>,
    ) {
        let mut interval = time::interval_at(origin + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let secs = origin.elapsed().as_secs();
            let gate = live.lock().unwrap_or_else(|e| e.into_inner());
            if !*gate {
                break;
            }
            elapsed.send_replace(secs);
        }
    }

    /// Cancel the tick; elapsed seconds stay at their last value
    pub fn stop(&mut self) {
        self.ticker = None;

        if self.state == TimerState::Running {
            self.state = TimerState::Stopped;
            info!("Session stopped at {}s", self.elapsed_seconds());
        }
    }

    /// Persist the current session
    ///
    /// On success the timer is stopped and the session can no longer be
    /// saved again. A failed write leaves the timer untouched.
    pub async fn save(&mut self) -> SaveOutcome {
        let Some(session) = self.session else {
            warn!("Save requested with no session");
            return SaveOutcome::NotStarted;
        };

        let elapsed_seconds = self.elapsed_seconds();
        if elapsed_seconds < self.config.min_session_secs {
            info!(
                "Session too short to save: {}s < {}s",
                elapsed_seconds, self.config.min_session_secs
            );
            return SaveOutcome::TooShort {
                elapsed_seconds,
                minimum_seconds: self.config.min_session_secs,
            };
        }

        let record = DfmRecord::new(self.ids.generate(), session.started_at_ms, elapsed_seconds);

        match self.store.save(record.clone()).await {
            Ok(()) => {
                self.stop();
                self.session = None;
                info!("Session saved as {} ({}s)", record.id, record.duration_seconds);
                SaveOutcome::Saved(record)
            }
            Err(e) => {
                warn!("Save failed: {:#}", e);
                SaveOutcome::PersistFailed
            }
        }
    }

    /// Stop without persisting; the session can no longer be saved
    pub fn discard(&mut self) {
        self.stop();

        if self.session.take().is_some() {
            info!("Session discarded");
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        *self.elapsed.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Receive elapsed-seconds updates for a live display
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            is_running: self.is_running(),
            elapsed_seconds: self.elapsed_seconds(),
            started_at: self
                .session
                .and_then(|s| DateTime::from_timestamp_millis(s.started_at_ms)),
        }
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        if self.ticker.is_some() {
            info!("Session torn down while running");
        }
    }
}
