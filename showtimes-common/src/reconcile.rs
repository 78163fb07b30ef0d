//! Reconciliation of detected showings against stored state
//!
//! A pass loads the stored showings for one theater and date window, archives
//! and removes those no longer detected, then upserts everything detected.
//! Identity is [`ShowingKey`]; end and creation timestamps never take part in
//! the comparison.

use crate::db::models::{InsertedRecord, PersistedShowing, ShowingKey, ShowtimeRecord};
use crate::db::showtimes::SqliteShowtimeStore;
use crate::schedule::FullSchedule;
use crate::time::DateRange;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{info, warn};

/// Storage used by a reconciliation pass
#[async_trait]
pub trait ShowtimeStore: Send {
    /// Stored showings for `theater` starting within `start..=end`
    async fn load(
        &mut self,
        theater: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PersistedShowing>>;

    /// Insert records whose key is not stored yet
    ///
    /// Returns one entry per input record, including skipped duplicates.
    async fn upsert(&mut self, records: &[ShowtimeRecord]) -> Result<Vec<InsertedRecord>>;

    /// Append each record to the audit trail, then remove it
    async fn delete(&mut self, stale: &[PersistedShowing]) -> Result<()>;
}

/// What a reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub skipped: usize,
    pub deleted: Vec<PersistedShowing>,
}

/// Stored records whose identity is absent from `detected`
pub fn stale_records(
    loaded: Vec<PersistedShowing>,
    detected: &[ShowtimeRecord],
) -> Vec<PersistedShowing> {
    let detected_keys: HashSet<ShowingKey> = detected.iter().map(ShowtimeRecord::key).collect();
    loaded
        .into_iter()
        .filter(|showing| !detected_keys.contains(&showing.key()))
        .collect()
}

/// Reconcile a detected record set for one theater and window
///
/// An empty `detected` set is reconciled like any other: every stored record
/// in the window becomes stale.
pub async fn reconcile_records<S: ShowtimeStore + ?Sized>(
    store: &mut S,
    theater: &str,
    window: DateRange,
    detected: &[ShowtimeRecord],
) -> Result<ReconcileReport> {
    let loaded = store.load(theater, window.start, window.end).await?;
    let loaded_count = loaded.len();

    let deleted = stale_records(loaded, detected);
    if !deleted.is_empty() {
        store.delete(&deleted).await?;
    }

    let outcome = store.upsert(detected).await?;
    let inserted = outcome.iter().filter(|r| r.inserted).count();

    let report = ReconcileReport {
        inserted,
        skipped: outcome.len() - inserted,
        deleted,
    };

    info!(
        theater,
        start = %window.start,
        end = %window.end,
        loaded = loaded_count,
        inserted = report.inserted,
        skipped = report.skipped,
        deleted = report.deleted.len(),
        "Reconciled showtimes"
    );

    Ok(report)
}

/// Reconcile every showing in `schedule`
pub async fn reconcile<S: ShowtimeStore + ?Sized>(
    store: &mut S,
    theater: &str,
    window: DateRange,
    schedule: &FullSchedule,
) -> Result<ReconcileReport> {
    let detected = ShowtimeRecord::from_schedule(theater, schedule);
    reconcile_records(store, theater, window, &detected).await
}

/// Run one pass inside a single SQLite transaction
///
/// Any failure rolls back the whole pass, so deletions and their audit rows
/// are committed together or not at all.
pub async fn reconcile_in_transaction(
    pool: &SqlitePool,
    theater: &str,
    window: DateRange,
    schedule: &FullSchedule,
) -> Result<ReconcileReport> {
    let mut store = SqliteShowtimeStore::begin(pool).await?;

    match reconcile(&mut store, theater, window, schedule).await {
        Ok(report) => {
            store.commit().await?;
            Ok(report)
        }
        Err(e) => {
            warn!(theater, error = %e, "Reconciliation failed, rolling back");
            store.rollback().await?;
            Err(e)
        }
    }
}
