use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use usagi_core::domain::inventory::{Effect, InventoryItem};
use usagi_core::domain::movement::CoinMovement;

use super::ledger::append_movement;
use super::{decode_timestamp, InventoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlInventoryRepository {
    pool: DbPool,
}

impl SqlInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn insert_item(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
) -> Result<(), RepositoryError> {
    let effects = serde_json::to_string(&item.effects)
        .map_err(|error| RepositoryError::Decode(format!("encode effects: {error}")))?;

    sqlx::query(
        "INSERT INTO inventory_item
             (id, user_id, item_id, item_name, price_paid, purchased_at, expire_at, effects)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&item.id)
    .bind(&item.user_id)
    .bind(i64::from(item.item_id))
    .bind(&item.item_name)
    .bind(item.price_paid)
    .bind(item.purchased_at.to_rfc3339())
    .bind(item.expire_at.map(|value| value.to_rfc3339()))
    .bind(effects)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn item_from_row(row: SqliteRow) -> Result<InventoryItem, RepositoryError> {
    let effects_raw: String = row.try_get("effects")?;
    let effects: Vec<Effect> = serde_json::from_str(&effects_raw)
        .map_err(|error| RepositoryError::Decode(format!("decode effects: {error}")))?;
    let item_id: i64 = row.try_get("item_id")?;

    Ok(InventoryItem {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        item_id: u32::try_from(item_id)
            .map_err(|_| RepositoryError::Decode(format!("item_id out of range: {item_id}")))?,
        item_name: row.try_get("item_name")?,
        price_paid: row.try_get("price_paid")?,
        purchased_at: decode_timestamp(row.try_get::<String, _>("purchased_at")?.as_str())?,
        expire_at: row
            .try_get::<Option<String>, _>("expire_at")?
            .map(|raw| decode_timestamp(&raw))
            .transpose()?,
        effects,
    })
}

#[async_trait::async_trait]
impl InventoryRepository for SqlInventoryRepository {
    async fn insert(&self, item: &InventoryItem) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        insert_item(&mut *tx, item).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn record_purchase(
        &self,
        item: &InventoryItem,
        debit: &CoinMovement,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        append_movement(&mut *tx, debit).await?;
        insert_item(&mut *tx, item).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn items_for_user(&self, user_id: &str) -> Result<Vec<InventoryItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, item_id, item_name, price_paid, purchased_at, expire_at, effects
             FROM inventory_item
             WHERE user_id = ?
             ORDER BY purchased_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(item_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use usagi_core::domain::inventory::{Effect, InventoryItem};
    use usagi_core::domain::movement::{ChangeType, CoinMovement};
    use usagi_core::domain::shop;

    use super::SqlInventoryRepository;
    use crate::repositories::{InventoryRepository, LedgerRepository, SqlLedgerRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        pool
    }

    #[tokio::test]
    async fn items_round_trip_with_typed_effects() {
        let repo = SqlInventoryRepository::new(pool().await);
        let now = Utc::now();
        let lucky_charm = shop::find(1).expect("catalog item");
        let item = InventoryItem::purchase("U1", lucky_charm, now);

        repo.insert(&item).await.expect("insert");

        let items = repo.items_for_user("U1").await.expect("list");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].effects, vec![Effect::SpinBonus { bonus: 0.05 }]);
        assert_eq!(items[0].item_name, "Lucky Charm");
        assert!(items[0].expire_at.is_some());
    }

    #[tokio::test]
    async fn record_purchase_stores_debit_and_item_together() {
        let pool = pool().await;
        let inventory = SqlInventoryRepository::new(pool.clone());
        let ledger = SqlLedgerRepository::new(pool);
        let now = Utc::now();

        let golden_pocket = shop::find(4).expect("catalog item");
        let item = InventoryItem::purchase("U1", golden_pocket, now);
        let debit = CoinMovement::new("U1", -golden_pocket.price, ChangeType::ShopBuy, None, now);

        inventory.record_purchase(&item, &debit).await.expect("purchase");

        assert_eq!(ledger.balance("U1").await.expect("balance"), -golden_pocket.price);
        assert_eq!(inventory.items_for_user("U1").await.expect("list").len(), 1);
    }
}
