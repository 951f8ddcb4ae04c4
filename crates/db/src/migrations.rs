use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables the economy migrations manage.
pub const MANAGED_TABLES: &[&str] = &["coin_movement", "inventory_item", "jackpot_day"];

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Whether every managed table exists; `false` means the schema needs
/// `run_pending`.
pub async fn schema_ready(pool: &DbPool) -> Result<bool, sqlx::Error> {
    use sqlx::Row;

    let count = sqlx::query(
        "SELECT COUNT(*) AS count FROM sqlite_master
         WHERE type = 'table' AND name IN ('coin_movement', 'inventory_item', 'jackpot_day')",
    )
    .fetch_one(pool)
    .await?
    .try_get::<i64, _>("count")?;

    Ok(count == MANAGED_TABLES.len() as i64)
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::{run_pending, schema_ready, MANAGED_TABLES, MIGRATOR};
    use crate::connect_with_settings;

    #[tokio::test]
    async fn migrations_create_economy_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        assert!(!schema_ready(&pool).await.expect("schema probe"));
        run_pending(&pool).await.expect("run migrations");
        assert!(schema_ready(&pool).await.expect("schema probe"));

        for table in MANAGED_TABLES {
            let count = sqlx::query(
                "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .expect("check table")
            .get::<i64, _>("count");
            assert_eq!(count, 1, "table {table} should exist after migration");
        }
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        for table in MANAGED_TABLES {
            let count = sqlx::query(
                "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .expect("check table removed")
            .get::<i64, _>("count");
            assert_eq!(count, 0, "table {table} should be gone after undo");
        }
    }
}
