use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use usagi_core::domain::inventory::InventoryItem;
use usagi_core::domain::jackpot::JackpotDay;
use usagi_core::domain::movement::{ChangeType, CoinMovement};

pub mod inventory;
pub mod jackpot;
pub mod ledger;
pub mod memory;

pub use inventory::SqlInventoryRepository;
pub use jackpot::SqlJackpotRepository;
pub use ledger::SqlLedgerRepository;
pub use memory::{InMemoryInventoryRepository, InMemoryJackpotRepository, InMemoryLedgerRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Append-only coin ledger. Balance is always derived by summing; no
/// implementation may keep a cached balance column.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn balance(&self, user_id: &str) -> Result<i64, RepositoryError>;

    /// Appends one movement. Same-day same-type movements without a
    /// counterpart reference may be merged into one stored row.
    async fn append(&self, movement: &CoinMovement) -> Result<(), RepositoryError>;

    /// Appends several movements atomically; either all land or none.
    async fn append_all(&self, movements: &[CoinMovement]) -> Result<(), RepositoryError>;

    async fn movements_for_user(&self, user_id: &str)
        -> Result<Vec<CoinMovement>, RepositoryError>;

    async fn exists_on_day(
        &self,
        user_id: &str,
        change_type: &ChangeType,
        day: NaiveDate,
    ) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn insert(&self, item: &InventoryItem) -> Result<(), RepositoryError>;

    /// Stores the purchase debit and the inventory row together;
    /// either both land or neither does.
    async fn record_purchase(
        &self,
        item: &InventoryItem,
        debit: &CoinMovement,
    ) -> Result<(), RepositoryError>;

    async fn items_for_user(&self, user_id: &str) -> Result<Vec<InventoryItem>, RepositoryError>;
}

#[async_trait]
pub trait JackpotRepository: Send + Sync {
    async fn day(&self, day: NaiveDate) -> Result<Option<JackpotDay>, RepositoryError>;

    /// Creates the row for `day` with `seed_amount` unless it already
    /// exists, then returns the current row.
    async fn open_day(&self, day: NaiveDate, seed_amount: i64)
        -> Result<JackpotDay, RepositoryError>;

    /// Atomic pool increment; returns the grown amount.
    async fn grow(&self, day: NaiveDate, delta: i64) -> Result<i64, RepositoryError>;

    /// Compare-and-set winner claim. Returns the claimed pool amount
    /// when this caller won the race, `None` when a winner was already
    /// recorded. On success the pool is reset to `reset_amount`.
    async fn claim_win(
        &self,
        day: NaiveDate,
        winner: &str,
        reset_amount: i64,
    ) -> Result<Option<i64>, RepositoryError>;
}

pub(crate) const DAY_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn encode_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub(crate) fn decode_day(raw: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|error| RepositoryError::Decode(format!("bad day value `{raw}`: {error}")))
}

pub(crate) fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("bad timestamp `{raw}`: {error}")))
}
