use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use usagi_core::domain::inventory::InventoryItem;
use usagi_core::domain::movement::{ChangeType, CoinMovement};
use usagi_core::domain::shop::{self, ShopItem};
use usagi_db::InventoryRepository;

use crate::errors::EconomyError;
use crate::service::EconomyService;

#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseReceipt {
    pub item_name: String,
    pub price: i64,
    pub balance: i64,
}

/// One owned item as shown in the bag. Expired purchases stay listed.
#[derive(Clone, Debug, PartialEq)]
pub struct BagEntry {
    pub item: InventoryItem,
    pub expired: bool,
}

#[derive(Clone)]
pub struct ShopService {
    economy: EconomyService,
    inventory: Arc<dyn InventoryRepository>,
}

impl ShopService {
    pub fn new(economy: EconomyService, inventory: Arc<dyn InventoryRepository>) -> Self {
        Self { economy, inventory }
    }

    pub fn items(&self) -> &'static [ShopItem] {
        shop::catalog()
    }

    /// Buys one catalog item. The debit and the inventory row land in
    /// one storage transaction. `FreeCost` never waives a purchase.
    pub async fn purchase(
        &self,
        user_id: &str,
        item_id: u32,
    ) -> Result<PurchaseReceipt, EconomyError> {
        let item = shop::find(item_id).ok_or(EconomyError::ItemNotFound { item_id })?;

        let _guard = self.economy.user_guard(user_id).await;

        let balance = self.economy.balance(user_id).await?;
        if balance < item.price {
            return Err(EconomyError::InsufficientBalance { balance, required: item.price });
        }

        let now = Utc::now();
        let owned = InventoryItem::purchase(user_id, item, now);
        let debit = CoinMovement::new(user_id, -item.price, ChangeType::ShopBuy, None, now);
        self.inventory.record_purchase(&owned, &debit).await?;

        info!(
            event_name = "economy.shop.purchased",
            user_id,
            item_id,
            item_name = item.name,
            price = item.price,
            "shop item purchased"
        );

        Ok(PurchaseReceipt {
            item_name: item.name.to_string(),
            price: item.price,
            balance: balance - item.price,
        })
    }

    pub async fn bag(&self, user_id: &str) -> Result<Vec<BagEntry>, EconomyError> {
        let now = Utc::now();
        let items = self.inventory.items_for_user(user_id).await?;
        Ok(items
            .into_iter()
            .map(|item| {
                let expired = !item.is_active(now);
                BagEntry { item, expired }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use usagi_core::domain::inventory::{Effect, InventoryItem};
    use usagi_core::domain::movement::ChangeType;
    use usagi_db::{
        InMemoryInventoryRepository, InMemoryLedgerRepository, InventoryRepository,
    };

    use super::ShopService;
    use crate::errors::EconomyError;
    use crate::service::EconomyService;

    fn shop() -> (ShopService, EconomyService, Arc<InMemoryInventoryRepository>) {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let inventory = Arc::new(InMemoryInventoryRepository::new(Arc::clone(&ledger)));
        let economy = EconomyService::new(ledger, inventory.clone());
        (ShopService::new(economy.clone(), inventory.clone()), economy, inventory)
    }

    #[tokio::test]
    async fn purchase_debits_and_grants_the_item() {
        let (shop, economy, _) = shop();
        economy
            .record_movement("U1", 10_000, ChangeType::Checkin, None)
            .await
            .expect("seed");

        // Item 1: Lucky Charm, 5000 coins.
        let receipt = shop.purchase("U1", 1).await.expect("purchase");
        assert_eq!(receipt.item_name, "Lucky Charm");
        assert_eq!(receipt.balance, 5_000);
        assert_eq!(economy.balance("U1").await.expect("balance"), 5_000);

        let effects = economy.active_effects("U1").await.expect("effects");
        assert!((effects.spin_bonus - 0.05).abs() < 1e-9);

        let bag = shop.bag("U1").await.expect("bag");
        assert_eq!(bag.len(), 1);
        assert!(!bag[0].expired);
    }

    #[tokio::test]
    async fn purchase_rejects_unknown_items_and_thin_wallets() {
        let (shop, economy, _) = shop();
        economy
            .record_movement("U1", 100, ChangeType::Checkin, None)
            .await
            .expect("seed");

        assert!(matches!(
            shop.purchase("U1", 42).await,
            Err(EconomyError::ItemNotFound { item_id: 42 })
        ));
        assert!(matches!(
            shop.purchase("U1", 1).await,
            Err(EconomyError::InsufficientBalance { balance: 100, required: 5_000 })
        ));
        assert_eq!(economy.balance("U1").await.expect("balance"), 100);
    }

    #[tokio::test]
    async fn free_cost_never_waives_a_purchase() {
        let (shop, economy, inventory) = shop();
        economy
            .record_movement("U1", 1_000, ChangeType::Checkin, None)
            .await
            .expect("seed");
        inventory
            .insert(&InventoryItem {
                id: "pocket".to_string(),
                user_id: "U1".to_string(),
                item_id: 4,
                item_name: "Golden Pocket".to_string(),
                price_paid: 50_000,
                purchased_at: Utc::now(),
                expire_at: None,
                effects: vec![Effect::FreeCost],
            })
            .await
            .expect("insert pocket");

        // Item 5: Check-in Charm, 50 coins. Always paid in full.
        for _ in 0..4 {
            shop.purchase("U1", 5).await.expect("purchase");
        }
        assert_eq!(economy.balance("U1").await.expect("balance"), 1_000 - 4 * 50);
    }

    #[tokio::test]
    async fn bag_marks_expired_items_but_keeps_them() {
        let (shop, _, inventory) = shop();
        let now = Utc::now();
        let mut item = InventoryItem {
            id: "old".to_string(),
            user_id: "U1".to_string(),
            item_id: 1,
            item_name: "Lucky Charm".to_string(),
            price_paid: 5_000,
            purchased_at: now - chrono::Duration::days(2),
            expire_at: Some(now - chrono::Duration::days(1)),
            effects: vec![Effect::SpinBonus { bonus: 0.05 }],
        };
        inventory.insert(&item).await.expect("insert expired");
        item.id = "fresh".to_string();
        item.expire_at = Some(now + chrono::Duration::days(1));
        inventory.insert(&item).await.expect("insert fresh");

        let bag = shop.bag("U1").await.expect("bag");
        assert_eq!(bag.len(), 2);
        let expired = bag.iter().find(|entry| entry.item.id == "old").expect("old entry");
        let active = bag.iter().find(|entry| entry.item.id == "fresh").expect("fresh entry");
        assert!(expired.expired);
        assert!(!active.expired);
    }
}
