//! SQLite showtime store
//!
//! Every operation of one store runs inside a single transaction; nothing is
//! visible to other connections until [`SqliteShowtimeStore::commit`].

use crate::db::models::{DeletedShowing, InsertedRecord, PersistedShowing, ShowtimeRecord};
use crate::reconcile::ShowtimeStore;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

pub struct SqliteShowtimeStore {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteShowtimeStore {
    /// Open a store over a fresh transaction
    pub async fn begin(pool: &SqlitePool) -> Result<Self> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl ShowtimeStore for SqliteShowtimeStore {
    async fn load(
        &mut self,
        theater: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PersistedShowing>> {
        let rows = sqlx::query(
            r#"
            SELECT id, theater, title, format, is_open_caption, no_pass,
                   start_date, start_time, end_date, end_time, created_at
            FROM showtimes
            WHERE theater = ? AND start_date >= ? AND start_date <= ?
            ORDER BY title, start_date, start_time
            "#,
        )
        .bind(theater)
        .bind(start.format(DATE_FMT).to_string())
        .bind(end.format(DATE_FMT).to_string())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PersistedShowing {
                    id: row.get("id"),
                    record: record_from_row(row)?,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    async fn upsert(&mut self, records: &[ShowtimeRecord]) -> Result<Vec<InsertedRecord>> {
        let created_at = crate::time::now().timestamp();
        let mut results = Vec::with_capacity(records.len());

        for record in records {
            let affected = sqlx::query(
                r#"
                INSERT OR IGNORE INTO showtimes (
                    theater, title, format, is_open_caption, no_pass,
                    start_date, start_time, end_date, end_time, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.theater)
            .bind(&record.title)
            .bind(&record.format)
            .bind(record.is_open_caption)
            .bind(record.no_pass)
            .bind(record.start.format(DATE_FMT).to_string())
            .bind(record.start.format(TIME_FMT).to_string())
            .bind(record.end.format(DATE_FMT).to_string())
            .bind(record.end.format(TIME_FMT).to_string())
            .bind(created_at)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

            results.push(InsertedRecord {
                record: record.clone(),
                inserted: affected > 0,
            });
        }

        Ok(results)
    }

    async fn delete(&mut self, stale: &[PersistedShowing]) -> Result<()> {
        let deleted_at = crate::time::now().timestamp();

        for showing in stale {
            let record = &showing.record;
            sqlx::query(
                r#"
                INSERT INTO deleted_showtimes (
                    theater, title, format, is_open_caption, no_pass,
                    start_date, start_time, end_date, end_time, created_at, deleted_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.theater)
            .bind(&record.title)
            .bind(&record.format)
            .bind(record.is_open_caption)
            .bind(record.no_pass)
            .bind(record.start.format(DATE_FMT).to_string())
            .bind(record.start.format(TIME_FMT).to_string())
            .bind(record.end.format(DATE_FMT).to_string())
            .bind(record.end.format(TIME_FMT).to_string())
            .bind(showing.created_at)
            .bind(deleted_at)
            .execute(&mut *self.tx)
            .await?;

            sqlx::query("DELETE FROM showtimes WHERE id = ?")
                .bind(showing.id)
                .execute(&mut *self.tx)
                .await?;

            debug!(title = %record.title, start = %record.start, "Archived stale showing");
        }

        Ok(())
    }
}

/// Audit rows for `theater`, oldest deletion first
pub async fn load_deleted(pool: &SqlitePool, theater: &str) -> Result<Vec<DeletedShowing>> {
    let rows = sqlx::query(
        r#"
        SELECT theater, title, format, is_open_caption, no_pass,
               start_date, start_time, end_date, end_time, created_at, deleted_at
        FROM deleted_showtimes
        WHERE theater = ?
        ORDER BY deleted_at, id
        "#,
    )
    .bind(theater)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(DeletedShowing {
                record: record_from_row(row)?,
                created_at: row.get("created_at"),
                deleted_at: row.get("deleted_at"),
            })
        })
        .collect()
}

fn record_from_row(row: &SqliteRow) -> Result<ShowtimeRecord> {
    Ok(ShowtimeRecord {
        theater: row.get("theater"),
        title: row.get("title"),
        format: row.get("format"),
        is_open_caption: row.get("is_open_caption"),
        no_pass: row.get("no_pass"),
        start: parse_timestamp(row.get("start_date"), row.get("start_time"))?,
        end: parse_timestamp(row.get("end_date"), row.get("end_time"))?,
    })
}

fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime> {
    let day = NaiveDate::parse_from_str(date, DATE_FMT)
        .map_err(|e| Error::Internal(format!("stored date {:?}: {}", date, e)))?;
    let time = NaiveTime::parse_from_str(time, TIME_FMT)
        .map_err(|e| Error::Internal(format!("stored time {:?}: {}", time, e)))?;
    Ok(day.and_time(time))
}
