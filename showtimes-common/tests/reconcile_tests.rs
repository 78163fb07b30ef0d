//! Reconciliation against a real SQLite database

use chrono::NaiveDate;
use showtimes_common::db::init::init_database;
use showtimes_common::db::showtimes::{load_deleted, SqliteShowtimeStore};
use showtimes_common::reconcile::{reconcile_in_transaction, ShowtimeStore};
use showtimes_common::schedule::RawRuntime;
use showtimes_common::time::DateRange;
use showtimes_common::{DaySchedule, FullSchedule};
use sqlx::SqlitePool;
use tempfile::TempDir;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

async fn setup() -> (TempDir, SqlitePool) {
    let temp = TempDir::new().unwrap();
    let pool = init_database(&temp.path().join("showtimes.db")).await.unwrap();
    (temp, pool)
}

/// One day with `(title, runtime, attribute, start)` showings; "" means no attribute
fn day(date: NaiveDate, showings: &[(&str, u32, &str, &str)]) -> DaySchedule {
    let mut schedule = DaySchedule::new(date);
    for (title, runtime, attribute, start) in showings {
        let attributes: Vec<&str> = if attribute.is_empty() { vec![] } else { vec![*attribute] };
        schedule
            .add_raw_movie(title, &RawRuntime::Minutes(*runtime))
            .add_showing(&attributes, start, date)
            .unwrap();
    }
    schedule
}

async fn count_showtimes(pool: &SqlitePool, theater: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM showtimes WHERE theater = ?")
        .bind(theater)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_vanished_showing_is_archived() {
    let (_temp, pool) = setup().await;
    let window = DateRange::single(d(5));

    let detected = FullSchedule::create(vec![day(d(5), &[("Movie X", 0, "", "7:00p")])]).unwrap();
    let report = reconcile_in_transaction(&pool, "TheaterA", window, &detected)
        .await
        .unwrap();
    assert_eq!(report.inserted, 1);

    let nothing = FullSchedule::create(vec![DaySchedule::new(d(5))]).unwrap();
    let report = reconcile_in_transaction(&pool, "TheaterA", window, &nothing)
        .await
        .unwrap();

    assert_eq!(report.deleted.len(), 1);
    let gone = &report.deleted[0].record;
    assert_eq!(gone.title, "Movie X");
    assert_eq!(gone.format, "Standard");
    assert!(!gone.is_open_caption);
    assert!(!gone.no_pass);
    assert_eq!(gone.start, d(5).and_hms_opt(19, 0, 0).unwrap());

    let audit = load_deleted(&pool, "TheaterA").await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(&audit[0].record, gone);
    assert!(audit[0].deleted_at >= audit[0].created_at);

    assert_eq!(count_showtimes(&pool, "TheaterA").await, 0);
}

#[tokio::test]
async fn test_repeated_pass_is_idempotent() {
    let (_temp, pool) = setup().await;
    let window = DateRange::new(d(5), d(6)).unwrap();
    let schedule = FullSchedule::create(vec![
        day(
            d(5),
            &[
                ("Wonka", 116, "RealD 3D", "7:00p"),
                ("Wonka", 116, "Open Caption", "1:00p"),
            ],
        ),
        day(d(6), &[("Migration", 83, "Dolby Cinema @ AMC", "11:30a")]),
    ])
    .unwrap();

    let first = reconcile_in_transaction(&pool, "AMC Methuen", window, &schedule)
        .await
        .unwrap();
    let created: Vec<i64> = sqlx::query_scalar("SELECT created_at FROM showtimes ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();

    let second = reconcile_in_transaction(&pool, "AMC Methuen", window, &schedule)
        .await
        .unwrap();
    let created_again: Vec<i64> =
        sqlx::query_scalar("SELECT created_at FROM showtimes ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(first.inserted, 3);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 3);
    assert!(second.deleted.is_empty());
    assert_eq!(created, created_again);
    assert!(load_deleted(&pool, "AMC Methuen").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_changed_format_replaces_row() {
    let (_temp, pool) = setup().await;
    let window = DateRange::single(d(5));

    let before = FullSchedule::create(vec![day(d(5), &[("Wonka", 116, "RealD 3D", "7:00p")])])
        .unwrap();
    let after = FullSchedule::create(vec![day(d(5), &[("Wonka", 116, "IMAX", "7:00p")])])
        .unwrap();

    reconcile_in_transaction(&pool, "AMC Methuen", window, &before)
        .await
        .unwrap();
    let report = reconcile_in_transaction(&pool, "AMC Methuen", window, &after)
        .await
        .unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.deleted.len(), 1);
    assert_eq!(report.deleted[0].record.format, "3D");

    let formats: Vec<String> = sqlx::query_scalar("SELECT format FROM showtimes")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(formats, vec!["IMAX"]);
}

#[tokio::test]
async fn test_window_limits_deletions() {
    let (_temp, pool) = setup().await;

    let two_days = FullSchedule::create(vec![
        day(d(5), &[("Wonka", 116, "", "7:00p")]),
        day(d(6), &[("Wonka", 116, "", "7:00p")]),
    ])
    .unwrap();
    reconcile_in_transaction(&pool, "AMC Methuen", DateRange::new(d(5), d(6)).unwrap(), &two_days)
        .await
        .unwrap();
    reconcile_in_transaction(&pool, "AMC Tyngsboro", DateRange::single(d(5)), &two_days)
        .await
        .unwrap();

    let empty_sixth = FullSchedule::create(vec![DaySchedule::new(d(6))]).unwrap();
    let report =
        reconcile_in_transaction(&pool, "AMC Methuen", DateRange::single(d(6)), &empty_sixth)
            .await
            .unwrap();

    assert_eq!(report.deleted.len(), 1);
    assert_eq!(report.deleted[0].record.start.date(), d(6));
    assert_eq!(count_showtimes(&pool, "AMC Methuen").await, 1);
    assert_eq!(count_showtimes(&pool, "AMC Tyngsboro").await, 2);
}

#[tokio::test]
async fn test_rolled_back_store_leaves_no_trace() {
    let (_temp, pool) = setup().await;
    let schedule = FullSchedule::create(vec![day(d(5), &[("Wonka", 116, "", "7:00p")])]).unwrap();
    reconcile_in_transaction(&pool, "AMC Methuen", DateRange::single(d(5)), &schedule)
        .await
        .unwrap();

    let mut store = SqliteShowtimeStore::begin(&pool).await.unwrap();
    let loaded = store.load("AMC Methuen", d(5), d(5)).await.unwrap();
    store.delete(&loaded).await.unwrap();
    store.rollback().await.unwrap();

    assert_eq!(count_showtimes(&pool, "AMC Methuen").await, 1);
    assert!(load_deleted(&pool, "AMC Methuen").await.unwrap().is_empty());
}
