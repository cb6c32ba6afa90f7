use tracing::info;

use crate::record::DfmRecord;
use crate::storage::RecordStore;

/// Order records for display: most recent session first
///
/// Stable, so records sharing a start time keep their stored order.
pub fn sort_by_recency(mut records: Vec<DfmRecord>) -> Vec<DfmRecord> {
    records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    records
}

/// Reload the store and sort for display
///
/// Not cached; call again whenever the list becomes visible.
pub async fn load_sorted(store: &RecordStore) -> Vec<DfmRecord> {
    let records = sort_by_recency(store.load().await);
    info!("Loaded {} past records", records.len());
    records
}
