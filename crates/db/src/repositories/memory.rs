//! In-memory repository implementations for tests and wiring smoke
//! checks. Behavior matches the SQL implementations, including the
//! day-merge and single-winner rules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use usagi_core::domain::inventory::InventoryItem;
use usagi_core::domain::jackpot::JackpotDay;
use usagi_core::domain::movement::{ChangeType, CoinMovement};

use super::{
    InventoryRepository, JackpotRepository, LedgerRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryLedgerRepository {
    movements: Mutex<Vec<CoinMovement>>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn merge_or_push(movements: &mut Vec<CoinMovement>, movement: &CoinMovement) {
    if movement.is_mergeable() {
        let existing = movements.iter_mut().find(|stored| {
            stored.user_id == movement.user_id
                && stored.change_type == movement.change_type
                && stored.day == movement.day
                && stored.related_user.is_none()
        });
        if let Some(stored) = existing {
            stored.amount += movement.amount;
            stored.recorded_at = movement.recorded_at;
            return;
        }
    }
    movements.push(movement.clone());
}

#[async_trait::async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn balance(&self, user_id: &str) -> Result<i64, RepositoryError> {
        let movements = self.movements.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(movements
            .iter()
            .filter(|movement| movement.user_id == user_id)
            .map(|movement| movement.amount)
            .sum())
    }

    async fn append(&self, movement: &CoinMovement) -> Result<(), RepositoryError> {
        let mut movements =
            self.movements.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        merge_or_push(&mut movements, movement);
        Ok(())
    }

    async fn append_all(&self, batch: &[CoinMovement]) -> Result<(), RepositoryError> {
        let mut movements =
            self.movements.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for movement in batch {
            merge_or_push(&mut movements, movement);
        }
        Ok(())
    }

    async fn movements_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CoinMovement>, RepositoryError> {
        let movements = self.movements.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(movements
            .iter()
            .filter(|movement| movement.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn exists_on_day(
        &self,
        user_id: &str,
        change_type: &ChangeType,
        day: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        let movements = self.movements.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(movements.iter().any(|movement| {
            movement.user_id == user_id
                && movement.change_type == *change_type
                && movement.day == day
        }))
    }
}

pub struct InMemoryInventoryRepository {
    items: Mutex<Vec<InventoryItem>>,
    ledger: Arc<InMemoryLedgerRepository>,
}

impl InMemoryInventoryRepository {
    /// Purchase debits land in `ledger`, so callers share one ledger
    /// between the two repositories the way the SQL pool does.
    pub fn new(ledger: Arc<InMemoryLedgerRepository>) -> Self {
        Self { items: Mutex::new(Vec::new()), ledger }
    }
}

#[async_trait::async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn insert(&self, item: &InventoryItem) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.push(item.clone());
        Ok(())
    }

    async fn record_purchase(
        &self,
        item: &InventoryItem,
        debit: &CoinMovement,
    ) -> Result<(), RepositoryError> {
        self.ledger.append(debit).await?;
        self.insert(item).await
    }

    async fn items_for_user(&self, user_id: &str) -> Result<Vec<InventoryItem>, RepositoryError> {
        let items = self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(items.iter().filter(|item| item.user_id == user_id).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryJackpotRepository {
    days: Mutex<HashMap<NaiveDate, JackpotDay>>,
}

impl InMemoryJackpotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl JackpotRepository for InMemoryJackpotRepository {
    async fn day(&self, day: NaiveDate) -> Result<Option<JackpotDay>, RepositoryError> {
        let days = self.days.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(days.get(&day).cloned())
    }

    async fn open_day(
        &self,
        day: NaiveDate,
        seed_amount: i64,
    ) -> Result<JackpotDay, RepositoryError> {
        let mut days = self.days.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(days
            .entry(day)
            .or_insert_with(|| JackpotDay { day, amount: seed_amount, won_by: None })
            .clone())
    }

    async fn grow(&self, day: NaiveDate, delta: i64) -> Result<i64, RepositoryError> {
        let mut days = self.days.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match days.get_mut(&day) {
            Some(entry) => {
                entry.amount += delta;
                Ok(entry.amount)
            }
            None => Err(RepositoryError::Decode(format!("jackpot day {day} was never opened"))),
        }
    }

    async fn claim_win(
        &self,
        day: NaiveDate,
        winner: &str,
        reset_amount: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        let mut days = self.days.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match days.get_mut(&day) {
            Some(entry) if entry.won_by.is_none() => {
                let pot = entry.amount;
                entry.won_by = Some(winner.to_string());
                entry.amount = reset_amount;
                Ok(Some(pot))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use usagi_core::domain::movement::{ChangeType, CoinMovement};

    use super::{InMemoryJackpotRepository, InMemoryLedgerRepository};
    use crate::repositories::{JackpotRepository, LedgerRepository};

    #[tokio::test]
    async fn ledger_merges_like_the_sql_implementation() {
        let repo = InMemoryLedgerRepository::new();
        let now = Utc::now();

        repo.append(&CoinMovement::new("U1", -10, ChangeType::SpinWheel, None, now))
            .await
            .expect("first");
        repo.append(&CoinMovement::new("U1", -20, ChangeType::SpinWheel, None, now))
            .await
            .expect("second");

        let movements = repo.movements_for_user("U1").await.expect("list");
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].amount, -30);
    }

    #[tokio::test]
    async fn jackpot_claim_is_single_shot() {
        let repo = InMemoryJackpotRepository::new();
        let today = Utc::now().date_naive();
        repo.open_day(today, 2_000).await.expect("open");

        assert_eq!(repo.claim_win(today, "U1", 1_000).await.expect("claim"), Some(2_000));
        assert_eq!(repo.claim_win(today, "U2", 1_000).await.expect("claim"), None);
    }
}
