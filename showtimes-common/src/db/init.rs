//! Database initialization
//!
//! Opens (creating on first run) the showtimes database, applies connection
//! pragmas, creates tables and runs pending migrations.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Applied to every pooled connection; WAL lets readers proceed while a
    // reconciliation pass holds the writer
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_tables(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;
    create_indexes(&pool).await?;

    Ok(pool)
}

/// Create every table (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_showtimes_table(pool).await?;
    create_deleted_showtimes_table(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Live showings, unique on the identity columns
async fn create_showtimes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS showtimes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            theater TEXT NOT NULL,
            title TEXT NOT NULL,
            format TEXT NOT NULL,
            is_open_caption INTEGER NOT NULL,
            no_pass INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_date TEXT NOT NULL,
            end_time TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(theater, title, format, is_open_caption, no_pass, start_date, start_time)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Indexes over current-layout columns; runs after migrations
async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_showtimes_theater_date ON showtimes(theater, start_date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Append-only audit trail of removed showings
async fn create_deleted_showtimes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deleted_showtimes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            theater TEXT NOT NULL,
            title TEXT NOT NULL,
            format TEXT NOT NULL,
            is_open_caption INTEGER NOT NULL,
            no_pass INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_date TEXT NOT NULL,
            end_time TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            deleted_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
