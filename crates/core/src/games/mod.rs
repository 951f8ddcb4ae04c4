pub mod lottery;
pub mod slot;
pub mod wheel;

/// Smallest stake any game accepts.
pub const MINIMUM_BET: i64 = 10;

/// Stake used when a player gives no amount.
pub const DEFAULT_BET: i64 = 10;
