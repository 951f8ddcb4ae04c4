use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use usagi_core::domain::jackpot::JackpotDay;

use super::{decode_day, encode_day, JackpotRepository, RepositoryError};
use crate::DbPool;

pub struct SqlJackpotRepository {
    pool: DbPool,
}

impl SqlJackpotRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn day_from_row(row: SqliteRow) -> Result<JackpotDay, RepositoryError> {
    Ok(JackpotDay {
        day: decode_day(row.try_get::<String, _>("day")?.as_str())?,
        amount: row.try_get("amount")?,
        won_by: row.try_get("won_by")?,
    })
}

#[async_trait::async_trait]
impl JackpotRepository for SqlJackpotRepository {
    async fn day(&self, day: NaiveDate) -> Result<Option<JackpotDay>, RepositoryError> {
        let row = sqlx::query("SELECT day, amount, won_by FROM jackpot_day WHERE day = ?")
            .bind(encode_day(day))
            .fetch_optional(&self.pool)
            .await?;

        row.map(day_from_row).transpose()
    }

    async fn open_day(
        &self,
        day: NaiveDate,
        seed_amount: i64,
    ) -> Result<JackpotDay, RepositoryError> {
        sqlx::query(
            "INSERT INTO jackpot_day (day, amount, won_by) VALUES (?, ?, NULL)
             ON CONFLICT(day) DO NOTHING",
        )
        .bind(encode_day(day))
        .bind(seed_amount)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT day, amount, won_by FROM jackpot_day WHERE day = ?")
            .bind(encode_day(day))
            .fetch_one(&self.pool)
            .await?;

        day_from_row(row)
    }

    async fn grow(&self, day: NaiveDate, delta: i64) -> Result<i64, RepositoryError> {
        let row = sqlx::query(
            "UPDATE jackpot_day SET amount = amount + ? WHERE day = ? RETURNING amount",
        )
        .bind(delta)
        .bind(encode_day(day))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get("amount")?),
            None => Err(RepositoryError::Decode(format!(
                "jackpot day {day} was never opened",
            ))),
        }
    }

    async fn claim_win(
        &self,
        day: NaiveDate,
        winner: &str,
        reset_amount: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        // CAS on `won_by IS NULL`; only the caller whose UPDATE hits a
        // row takes the pot.
        let mut tx = self.pool.begin().await?;

        let pot = sqlx::query(
            "SELECT amount FROM jackpot_day WHERE day = ? AND won_by IS NULL",
        )
        .bind(encode_day(day))
        .fetch_optional(&mut *tx)
        .await?
        .map(|row| row.try_get::<i64, _>("amount"))
        .transpose()?;

        let Some(pot) = pot else {
            tx.rollback().await?;
            return Ok(None);
        };

        let claimed = sqlx::query(
            "UPDATE jackpot_day SET won_by = ?, amount = ?
             WHERE day = ? AND won_by IS NULL",
        )
        .bind(winner)
        .bind(reset_amount)
        .bind(encode_day(day))
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(pot))
    }
}
