// Tests for the session timer state machine
//
// These run on tokio's paused clock: sleeping auto-advances virtual time,
// so tick timing is deterministic.

use anyhow::Result;
use kickcount::{
    DfmRecord, IdGenerator, KeyValueStore, MemoryStore, RecordStore, SaveOutcome, SessionConfig,
    SessionTimer, TimerState,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const KEY: &str = "dfm_records";

/// Hands out rec-1, rec-2, ...
#[derive(Default)]
struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        format!("rec-{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Accepts reads, rejects every write
struct ReadOnlyStore;

#[async_trait::async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String) -> Result<()> {
        anyhow::bail!("storage is read-only")
    }

    fn name(&self) -> &str {
        "read-only"
    }
}

fn memory_timer() -> (SessionTimer, Arc<RecordStore>) {
    let store = Arc::new(RecordStore::new(Arc::new(MemoryStore::new()), KEY));
    let timer = SessionTimer::with_id_generator(
        SessionConfig::default(),
        Arc::clone(&store),
        Arc::new(SequentialIds::default()),
    );
    (timer, store)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn test_new_timer_is_idle() {
    let (timer, _) = memory_timer();

    assert_eq!(timer.state(), TimerState::Idle);
    assert!(!timer.is_running());
    assert_eq!(timer.elapsed_seconds(), 0);
    assert_eq!(timer.snapshot().started_at, None);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_reads_one_after_1005ms() -> Result<()> {
    let (mut timer, _) = memory_timer();

    timer.start()?;
    assert!(timer.is_running());

    sleep(ms(1005)).await;
    assert_eq!(timer.elapsed_seconds(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_tracks_start_instant_over_many_ticks() -> Result<()> {
    let (mut timer, _) = memory_timer();

    timer.start()?;
    sleep(ms(3_500)).await;
    assert_eq!(timer.elapsed_seconds(), 3);

    sleep(ms(120_000)).await;
    assert_eq!(timer.elapsed_seconds(), 123);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_ticks() -> Result<()> {
    let (mut timer, _) = memory_timer();
    let mut rx = timer.subscribe();

    timer.start()?;
    sleep(ms(2_100)).await;

    assert!(rx.has_changed()?);
    assert_eq!(*rx.borrow_and_update(), 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_save_below_minimum_is_rejected_then_accepted_at_minimum() -> Result<()> {
    let (mut timer, store) = memory_timer();

    timer.start()?;
    sleep(ms(59_500)).await;
    assert_eq!(timer.elapsed_seconds(), 59);

    let outcome = timer.save().await;
    assert_eq!(
        outcome,
        SaveOutcome::TooShort {
            elapsed_seconds: 59,
            minimum_seconds: 60
        }
    );
    assert!(!outcome.is_saved());
    assert!(store.load().await.is_empty(), "Nothing should be persisted");
    assert!(timer.is_running(), "Rejected save keeps timing");

    sleep(ms(1_000)).await;
    assert_eq!(timer.elapsed_seconds(), 60);

    let outcome = timer.save().await;
    assert!(outcome.is_saved());

    let records = store.load().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "rec-1");
    assert_eq!(records[0].duration_seconds, 60);

    assert_eq!(timer.state(), TimerState::Stopped);
    assert!(!timer.is_running());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_save_before_start_fails_cleanly() {
    let (mut timer, store) = memory_timer();

    assert_eq!(timer.save().await, SaveOutcome::NotStarted);
    assert!(store.load().await.is_empty());
    assert_eq!(timer.state(), TimerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_saved_record_carries_start_timestamp() -> Result<()> {
    let (mut timer, store) = memory_timer();

    let before = chrono::Utc::now().timestamp_millis();
    timer.start()?;
    let after = chrono::Utc::now().timestamp_millis();

    sleep(ms(75_200)).await;

    let record: DfmRecord = match timer.save().await {
        SaveOutcome::Saved(record) => record,
        other => panic!("Expected a saved record, got {:?}", other),
    };

    assert!(record.started_at >= before && record.started_at <= after);
    assert_eq!(record.duration_seconds, 75);
    assert_eq!(store.load().await, vec![record]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_session_cannot_be_saved_twice() -> Result<()> {
    let (mut timer, store) = memory_timer();

    timer.start()?;
    sleep(ms(61_000)).await;

    assert!(timer.save().await.is_saved());
    assert_eq!(timer.save().await, SaveOutcome::NotStarted);
    assert_eq!(store.load().await.len(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_persist_failure_keeps_timer_running() -> Result<()> {
    let store = Arc::new(RecordStore::new(Arc::new(ReadOnlyStore), KEY));
    let mut timer = SessionTimer::new(SessionConfig::default(), Arc::clone(&store));

    timer.start()?;
    sleep(ms(61_500)).await;

    assert_eq!(timer.save().await, SaveOutcome::PersistFailed);
    assert!(timer.is_running());

    sleep(ms(1_000)).await;
    assert_eq!(timer.elapsed_seconds(), 62, "Timer keeps ticking for a retry");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_freezes_elapsed_and_is_idempotent() -> Result<()> {
    let (mut timer, _) = memory_timer();

    timer.start()?;
    sleep(ms(3_500)).await;

    timer.stop();
    assert_eq!(timer.state(), TimerState::Stopped);
    assert_eq!(timer.elapsed_seconds(), 3);

    timer.stop();
    assert_eq!(timer.state(), TimerState::Stopped);
    assert_eq!(timer.elapsed_seconds(), 3);

    sleep(ms(10_000)).await;
    assert_eq!(timer.elapsed_seconds(), 3, "No tick may fire after stop");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_discard_after_stop_keeps_elapsed_and_blocks_save() -> Result<()> {
    let (mut timer, store) = memory_timer();

    timer.start()?;
    sleep(ms(65_500)).await;
    timer.stop();

    timer.discard();
    assert_eq!(timer.elapsed_seconds(), 65);
    assert!(!timer.is_running());

    assert_eq!(timer.save().await, SaveOutcome::NotStarted);
    assert!(store.load().await.is_empty());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_on_idle_is_noop() {
    let (mut timer, _) = memory_timer();

    timer.stop();
    timer.discard();

    assert_eq!(timer.state(), TimerState::Idle);
    assert_eq!(timer.elapsed_seconds(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_save_after_stop_uses_frozen_elapsed() -> Result<()> {
    let (mut timer, store) = memory_timer();

    timer.start()?;
    sleep(ms(61_500)).await;
    timer.stop();
    sleep(ms(30_000)).await;

    assert!(timer.save().await.is_saved());
    assert_eq!(store.load().await[0].duration_seconds, 61);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_start_while_running_is_noop() -> Result<()> {
    let (mut timer, _) = memory_timer();

    timer.start()?;
    let started_at = timer.snapshot().started_at;
    sleep(ms(2_500)).await;

    timer.start()?;
    assert_eq!(timer.elapsed_seconds(), 2);
    assert_eq!(timer.snapshot().started_at, started_at);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_begins_new_session() -> Result<()> {
    let (mut timer, _) = memory_timer();

    timer.start()?;
    sleep(ms(5_500)).await;
    timer.stop();

    timer.start()?;
    assert_eq!(timer.elapsed_seconds(), 0);
    assert_eq!(timer.state(), TimerState::Running);

    sleep(ms(1_500)).await;
    assert_eq!(timer.elapsed_seconds(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_tick() -> Result<()> {
    let (mut timer, _) = memory_timer();
    let rx = timer.subscribe();

    timer.start()?;
    sleep(ms(2_500)).await;
    drop(timer);

    sleep(ms(10_000)).await;
    assert_eq!(*rx.borrow(), 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_reflects_running_session() -> Result<()> {
    let (mut timer, _) = memory_timer();

    timer.start()?;
    sleep(ms(4_200)).await;

    let snapshot = timer.snapshot();
    assert_eq!(snapshot.state, TimerState::Running);
    assert!(snapshot.is_running);
    assert_eq!(snapshot.elapsed_seconds, 4);
    assert!(snapshot.started_at.is_some());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_custom_minimum_duration() -> Result<()> {
    let store = Arc::new(RecordStore::new(Arc::new(MemoryStore::new()), KEY));
    let config = SessionConfig {
        min_session_secs: 5,
        ..SessionConfig::default()
    };
    let mut timer = SessionTimer::new(config, Arc::clone(&store));

    timer.start()?;
    sleep(ms(5_100)).await;

    assert!(timer.save().await.is_saved());
    assert_eq!(store.load().await.len(), 1);

    Ok(())
}

#[test]
fn test_start_outside_runtime_fails() {
    let (mut timer, _) = memory_timer();

    assert!(timer.start().is_err());
    assert_eq!(timer.state(), TimerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_zero_tick_interval_is_rejected() {
    let store = Arc::new(RecordStore::new(Arc::new(MemoryStore::new()), KEY));
    let config = SessionConfig {
        tick_interval: Duration::ZERO,
        ..SessionConfig::default()
    };
    let mut timer = SessionTimer::new(config, store);

    assert!(timer.start().is_err());
    assert!(!timer.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_discard_while_running_cancels_tick() -> Result<()> {
    let (mut timer, _) = memory_timer();

    timer.start()?;
    sleep(ms(4_500)).await;

    timer.discard();
    assert_eq!(timer.state(), TimerState::Stopped);
    assert_eq!(timer.elapsed_seconds(), 4);

    sleep(ms(10_000)).await;
    assert_eq!(timer.elapsed_seconds(), 4, "No tick may fire after discard");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_successful_save_cancels_tick() -> Result<()> {
    let (mut timer, _) = memory_timer();
    let mut rx = timer.subscribe();

    timer.start()?;
    sleep(ms(60_500)).await;

    assert!(timer.save().await.is_saved());
    assert_eq!(*rx.borrow_and_update(), 60);

    sleep(ms(10_000)).await;
    assert_eq!(timer.elapsed_seconds(), 60, "No tick may fire after save");
    assert!(!rx.has_changed()?, "Subscribers see no update after save");

    Ok(())
}
