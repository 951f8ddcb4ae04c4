use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use usagi_core::domain::movement::{ChangeType, CoinMovement};

use super::{decode_day, decode_timestamp, encode_day, LedgerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlLedgerRepository {
    pool: DbPool,
}

impl SqlLedgerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Appends one movement on an open connection. Mergeable movements
/// fold into an existing same-day same-type row when one is present.
pub(crate) async fn append_movement(
    conn: &mut SqliteConnection,
    movement: &CoinMovement,
) -> Result<(), RepositoryError> {
    if movement.is_mergeable() {
        let merged = sqlx::query(
            "UPDATE coin_movement
             SET amount = amount + ?, recorded_at = ?
             WHERE user_id = ? AND change_type = ? AND day = ? AND related_user IS NULL",
        )
        .bind(movement.amount)
        .bind(movement.recorded_at.to_rfc3339())
        .bind(&movement.user_id)
        .bind(movement.change_type.as_key())
        .bind(encode_day(movement.day))
        .execute(&mut *conn)
        .await?;

        if merged.rows_affected() > 0 {
            return Ok(());
        }
    }

    sqlx::query(
        "INSERT INTO coin_movement (id, user_id, change_type, day, amount, related_user, recorded_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&movement.id)
    .bind(&movement.user_id)
    .bind(movement.change_type.as_key())
    .bind(encode_day(movement.day))
    .bind(movement.amount)
    .bind(movement.related_user.as_deref())
    .bind(movement.recorded_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn movement_from_row(row: SqliteRow) -> Result<CoinMovement, RepositoryError> {
    Ok(CoinMovement {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        change_type: ChangeType::from_key(row.try_get::<String, _>("change_type")?.as_str()),
        day: decode_day(row.try_get::<String, _>("day")?.as_str())?,
        amount: row.try_get("amount")?,
        related_user: row.try_get("related_user")?,
        recorded_at: decode_timestamp(row.try_get::<String, _>("recorded_at")?.as_str())?,
    })
}

#[async_trait::async_trait]
impl LedgerRepository for SqlLedgerRepository {
    async fn balance(&self, user_id: &str) -> Result<i64, RepositoryError> {
        let balance = sqlx::query(
            "SELECT IFNULL(SUM(amount), 0) AS balance FROM coin_movement WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?
        .try_get::<i64, _>("balance")?;

        Ok(balance)
    }

    async fn append(&self, movement: &CoinMovement) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        append_movement(&mut *tx, movement).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn append_all(&self, movements: &[CoinMovement]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        for movement in movements {
            append_movement(&mut *tx, movement).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn movements_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CoinMovement>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, change_type, day, amount, related_user, recorded_at
             FROM coin_movement
             WHERE user_id = ?
             ORDER BY recorded_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(movement_from_row).collect()
    }

    async fn exists_on_day(
        &self,
        user_id: &str,
        change_type: &ChangeType,
        day: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        let found = sqlx::query(
            "SELECT EXISTS(
                 SELECT 1 FROM coin_movement
                 WHERE user_id = ? AND change_type = ? AND day = ?
             ) AS found",
        )
        .bind(user_id)
        .bind(change_type.as_key())
        .bind(encode_day(day))
        .fetch_one(&self.pool)
        .await?
        .try_get::<i64, _>("found")?;

        Ok(found != 0)
    }
}
