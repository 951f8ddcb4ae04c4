pub mod inventory;
pub mod jackpot;
pub mod movement;
pub mod shop;
