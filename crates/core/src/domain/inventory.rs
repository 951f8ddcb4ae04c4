use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shop::ShopItem;
use crate::games::slot::SlotSymbol;

/// Modifier granted by a purchased item. A closed set so that a typo
/// in a lookup key cannot silently drop an effect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Scales the wheel jackpot weight; stacks additively.
    SpinBonus { bonus: f64 },
    /// Raises the lottery win rate; stacks additively.
    LotteryBonus { bonus: f64 },
    /// 50% chance a game stake costs nothing. Presence-only.
    FreeCost,
    /// Multiplies the daily check-in credit. Non-stacking; the largest
    /// active multiplier applies.
    SignInBonus { multiplier: i64 },
    /// Reads the given slot symbol as 7️⃣ on every reel. Presence-only.
    SlotSuppress { symbol: SlotSymbol },
}

/// A purchased, possibly time-limited effect grant. Expired rows stay
/// in storage; they simply stop contributing effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub user_id: String,
    pub item_id: u32,
    pub item_name: String,
    pub price_paid: i64,
    pub purchased_at: DateTime<Utc>,
    pub expire_at: Option<DateTime<Utc>>,
    pub effects: Vec<Effect>,
}

impl InventoryItem {
    pub fn purchase(user_id: impl Into<String>, item: &ShopItem, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            item_id: item.id,
            item_name: item.name.to_string(),
            price_paid: item.price,
            purchased_at: now,
            expire_at: item.expire_at(now),
            effects: item.effects.to_vec(),
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.map_or(true, |expire_at| expire_at > now)
    }
}

/// Effects resolved across a user's currently-active items.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveEffects {
    pub spin_bonus: f64,
    pub lottery_bonus: f64,
    pub free_cost: bool,
    pub sign_in_multiplier: i64,
    pub suppressed: Vec<SlotSymbol>,
}

impl Default for ActiveEffects {
    fn default() -> Self {
        Self {
            spin_bonus: 0.0,
            lottery_bonus: 0.0,
            free_cost: false,
            sign_in_multiplier: 1,
            suppressed: Vec::new(),
        }
    }
}

impl ActiveEffects {
    pub fn resolve(items: &[InventoryItem], now: DateTime<Utc>) -> Self {
        let mut resolved = Self::default();
        for item in items.iter().filter(|item| item.is_active(now)) {
            for effect in &item.effects {
                match effect {
                    Effect::SpinBonus { bonus } => resolved.spin_bonus += bonus,
                    Effect::LotteryBonus { bonus } => resolved.lottery_bonus += bonus,
                    Effect::FreeCost => resolved.free_cost = true,
                    Effect::SignInBonus { multiplier } => {
                        resolved.sign_in_multiplier = resolved.sign_in_multiplier.max(*multiplier);
                    }
                    Effect::SlotSuppress { symbol } => {
                        if !resolved.suppressed.contains(symbol) {
                            resolved.suppressed.push(*symbol);
                        }
                    }
                }
            }
        }
        resolved
    }
}
