//! Orchestration layer for the coin economy: the ledger-backed
//! economy service, the shop, and the three game engines. Everything
//! here is wired over the repository traits so tests run against the
//! in-memory implementations.

pub mod errors;
pub mod locks;
pub mod lottery;
pub mod service;
pub mod shop;
pub mod slot;
pub mod stake;
pub mod wheel;

pub use errors::EconomyError;
pub use lottery::{LotteryGame, LotteryPlay, LotteryResult};
pub use service::{CheckinReceipt, EconomyService, TransferReceipt, CHECKIN_REWARD};
pub use shop::{BagEntry, PurchaseReceipt, ShopService};
pub use slot::{SlotMachine, SlotPlay};
pub use wheel::{WheelGame, WheelPlay};
