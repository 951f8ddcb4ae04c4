use chrono::{DateTime, Duration, Utc};

use crate::domain::inventory::Effect;
use crate::games::slot::SlotSymbol;

/// Catalog entry. Static reference data, never stored per user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShopItem {
    pub id: u32,
    pub name: &'static str,
    pub price: i64,
    pub description: &'static str,
    pub expire_days: Option<i64>,
    pub effects: &'static [Effect],
}

impl ShopItem {
    pub fn expire_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expire_days.map(|days| now + Duration::days(days))
    }
}

const CATALOG: &[ShopItem] = &[
    ShopItem {
        id: 1,
        name: "Lucky Charm",
        price: 5_000,
        description: "Raises the wheel jackpot odds by 5%. Stacks.",
        expire_days: Some(1),
        effects: &[Effect::SpinBonus { bonus: 0.05 }],
    },
    ShopItem {
        id: 2,
        name: "Tycoon Medal",
        price: 100_000_000,
        description: "Owning it proves you are rich. No effect whatsoever.",
        expire_days: None,
        effects: &[],
    },
    ShopItem {
        id: 3,
        name: "Lottery King",
        price: 10_000,
        description: "Raises the lottery win rate by 5%. Stacks.",
        expire_days: Some(7),
        effects: &[Effect::LotteryBonus { bonus: 0.05 }],
    },
    ShopItem {
        id: 4,
        name: "Golden Pocket",
        price: 50_000,
        description: "50% chance that game stakes cost nothing. Shop purchases excluded.",
        expire_days: Some(3),
        effects: &[Effect::FreeCost],
    },
    ShopItem {
        id: 5,
        name: "Check-in Charm",
        price: 50,
        description: "Doubles the daily check-in reward while held.",
        expire_days: Some(3),
        effects: &[Effect::SignInBonus { multiplier: 2 }],
    },
    ShopItem {
        id: 6,
        name: "Cherry Chain",
        price: 200,
        description: "Every 🍒 on the slot reels becomes 7️⃣.",
        expire_days: Some(3),
        effects: &[Effect::SlotSuppress { symbol: SlotSymbol::Cherry }],
    },
    ShopItem {
        id: 7,
        name: "Lemon Chain",
        price: 200,
        description: "Every 🍋 on the slot reels becomes 7️⃣.",
        expire_days: Some(3),
        effects: &[Effect::SlotSuppress { symbol: SlotSymbol::Lemon }],
    },
    ShopItem {
        id: 8,
        name: "Bell Chain",
        price: 200,
        description: "Every 🔔 on the slot reels becomes 7️⃣.",
        expire_days: Some(3),
        effects: &[Effect::SlotSuppress { symbol: SlotSymbol::Bell }],
    },
];

pub fn catalog() -> &'static [ShopItem] {
    CATALOG
}

pub fn find(item_id: u32) -> Option<&'static ShopItem> {
    CATALOG.iter().find(|item| item.id == item_id)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{catalog, find};

    #[test]
    fn catalog_ids_are_unique_and_dense() {
        let items = catalog();
        assert_eq!(items.len(), 8);
        for (index, item) in items.iter().enumerate() {
            assert_eq!(item.id as usize, index + 1);
        }
    }

    #[test]
    fn find_resolves_known_and_unknown_ids() {
        assert_eq!(find(4).map(|item| item.name), Some("Golden Pocket"));
        assert!(find(99).is_none());
    }

    #[test]
    fn expiry_policy_follows_the_catalog() {
        let now = Utc::now();
        let perpetual = find(2).expect("medal");
        let weekly = find(3).expect("lottery king");

        assert_eq!(perpetual.expire_at(now), None);
        assert_eq!(weekly.expire_at(now), Some(now + Duration::days(7)));
    }
}
