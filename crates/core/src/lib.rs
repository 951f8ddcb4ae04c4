pub mod config;
pub mod domain;
pub mod games;

pub use chrono;

pub use domain::inventory::{ActiveEffects, Effect, InventoryItem};
pub use domain::jackpot::{JackpotDay, DAILY_POOL_INCREMENT, POOL_BASE_AMOUNT};
pub use domain::movement::{ChangeType, CoinMovement};
pub use domain::shop::{catalog, ShopItem};
pub use games::slot::SlotSymbol;
