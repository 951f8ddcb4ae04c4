use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pool value a freshly-won (or first-ever) day resets to.
pub const POOL_BASE_AMOUNT: i64 = 1_000;

/// Carry-over bonus added when a new day inherits yesterday's pool.
pub const DAILY_POOL_INCREMENT: i64 = 500;

/// Shared lottery pool, one row per calendar day. `won_by` flips from
/// `None` exactly once; after that no play can win until tomorrow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotDay {
    pub day: NaiveDate,
    pub amount: i64,
    pub won_by: Option<String>,
}

/// Opening amount for a new day given yesterday's closing amount.
pub fn seed_amount(yesterday_amount: Option<i64>) -> i64 {
    match yesterday_amount {
        Some(amount) => amount + DAILY_POOL_INCREMENT,
        None => POOL_BASE_AMOUNT,
    }
}
