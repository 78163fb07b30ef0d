//! Database schema migrations
//!
//! Versioned, idempotent upgrades tracked in the `schema_version` table.
//! Existing migrations must never change; add a new one for each schema
//! change and bump `CURRENT_SCHEMA_VERSION`.

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Latest applied version, 0 when nothing has been recorded
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let sql = format!(
        "SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = ?",
        table
    );
    let count: i64 = sqlx::query_scalar(&sql).bind(column).fetch_one(pool).await?;
    Ok(count > 0)
}

/// Migration v1: convert a legacy `showtimes` table
///
/// Legacy tables use camelCase columns, store `isAList` (the inverse of
/// `no_pass`), have no creation timestamp and are unique on only four
/// columns. Rows are copied into the current layout with `created_at` set to
/// the migration time. Fresh databases are left untouched.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    if !has_column(pool, "showtimes", "isAList").await? {
        info!("Migration v1: showtimes table already in current layout");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    sqlx::query("ALTER TABLE showtimes RENAME TO showtimes_legacy")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE showtimes (
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
    .execute(&mut *tx)
    .await?;

    let copied = sqlx::query(
        r#"
        INSERT OR IGNORE INTO showtimes (
            theater, title, format, is_open_caption, no_pass,
            start_date, start_time, end_date, end_time, created_at
        )
        SELECT theater, title, COALESCE(format, 'Standard'), isOpenCaption, NOT isAList,
               startDate, startTime, endDate, endTime, CAST(strftime('%s', 'now') AS INTEGER)
        FROM showtimes_legacy
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query("DROP TABLE showtimes_legacy")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Migration v1: converted {} legacy showtimes rows", copied);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn create_legacy_table(pool: &SqlitePool) {
        sqlx::query(
            r#"
            CREATE TABLE showtimes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                theater TEXT NOT NULL,
                title TEXT NOT NULL,
                format TEXT,
                isOpenCaption INT NOT NULL,
                isAList INT NOT NULL,
                startDate TEXT NOT NULL,
                endDate TEXT NOT NULL,
                startTime TEXT NOT NULL,
                endTime TEXT NOT NULL,
                UNIQUE(theater, title, startDate, startTime)
            )
            "#,
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_get_schema_version_no_table() {
        let pool = setup_test_db().await;
        assert_eq!(get_schema_version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_and_get_schema_version() {
        let pool = setup_test_db().await;
        create_tables(&pool).await.unwrap();

        set_schema_version(&pool, 1).await.unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_migrate_v1_fresh_database_is_noop() {
        let pool = setup_test_db().await;
        create_tables(&pool).await.unwrap();

        run_migrations(&pool).await.unwrap();

        assert_eq!(get_schema_version(&pool).await.unwrap(), 1);
        assert!(has_column(&pool, "showtimes", "created_at").await.unwrap());
    }

    #[tokio::test]
    async fn test_migrate_v1_converts_legacy_rows() {
        let pool = setup_test_db().await;
        create_legacy_table(&pool).await;
        sqlx::query(
            r#"
            INSERT INTO showtimes (theater, title, format, isOpenCaption, isAList,
                                   startDate, endDate, startTime, endTime)
            VALUES ('AMC Methuen', 'Wonka', '3D', 0, 1,
                    '2024-01-05', '2024-01-05', '19:00:00', '20:56:00'),
                   ('AMC Methuen', 'Migration', NULL, 1, 0,
                    '2024-01-05', '2024-01-05', '13:00:00', '14:23:00')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        create_tables(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        assert!(!has_column(&pool, "showtimes", "isAList").await.unwrap());

        let rows: Vec<(String, String, bool, bool, i64)> = sqlx::query_as(
            "SELECT title, format, is_open_caption, no_pass, created_at FROM showtimes ORDER BY title",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "Migration");
        assert_eq!(rows[0].1, "Standard");
        assert!(rows[0].2);
        assert!(rows[0].3, "isAList = 0 becomes no_pass");
        assert_eq!(rows[1].0, "Wonka");
        assert!(!rows[1].3);
        assert!(rows[1].4 > 0);
    }

    #[tokio::test]
    async fn test_run_migrations_idempotent() {
        let pool = setup_test_db().await;
        create_legacy_table(&pool).await;
        create_tables(&pool).await.unwrap();

        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(versions, 1);
    }
}
