use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use usagi_core::domain::inventory::ActiveEffects;
use usagi_core::domain::movement::{ChangeType, CoinMovement};
use usagi_db::{InventoryRepository, LedgerRepository};

use crate::errors::EconomyError;
use crate::locks::UserLocks;

/// Base daily check-in credit, before any `SignInBonus` multiplier.
pub const CHECKIN_REWARD: i64 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckinReceipt {
    pub amount: i64,
    pub balance: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from: String,
    pub to: String,
    pub amount: i64,
    pub sender_balance: i64,
}

/// Ledger-backed economy operations shared by every command and game.
/// Cheap to clone; the games hold their own copy.
#[derive(Clone)]
pub struct EconomyService {
    ledger: Arc<dyn LedgerRepository>,
    inventory: Arc<dyn InventoryRepository>,
    locks: UserLocks,
}

impl EconomyService {
    pub fn new(ledger: Arc<dyn LedgerRepository>, inventory: Arc<dyn InventoryRepository>) -> Self {
        Self { ledger, inventory, locks: UserLocks::new() }
    }

    pub async fn balance(&self, user_id: &str) -> Result<i64, EconomyError> {
        Ok(self.ledger.balance(user_id).await?)
    }

    pub async fn record_movement(
        &self,
        user_id: &str,
        amount: i64,
        change_type: ChangeType,
        related_user: Option<String>,
    ) -> Result<(), EconomyError> {
        let movement = CoinMovement::new(user_id, amount, change_type, related_user, Utc::now());
        self.ledger.append(&movement).await?;
        Ok(())
    }

    /// Effects of the user's currently-active inventory, resolved with
    /// the stacking rules. Pure read, no lock needed.
    pub async fn active_effects(&self, user_id: &str) -> Result<ActiveEffects, EconomyError> {
        let items = self.inventory.items_for_user(user_id).await?;
        Ok(ActiveEffects::resolve(&items, Utc::now()))
    }

    pub async fn has_checked_in_today(&self, user_id: &str) -> Result<bool, EconomyError> {
        let today = Utc::now().date_naive();
        Ok(self.ledger.exists_on_day(user_id, &ChangeType::Checkin, today).await?)
    }

    /// Credits the daily check-in once per UTC day. The second attempt
    /// on the same day records nothing.
    pub async fn check_in(&self, user_id: &str) -> Result<CheckinReceipt, EconomyError> {
        let _guard = self.user_guard(user_id).await;

        if self.has_checked_in_today(user_id).await? {
            return Err(EconomyError::AlreadyCheckedIn);
        }

        let effects = self.active_effects(user_id).await?;
        let amount = CHECKIN_REWARD * effects.sign_in_multiplier;
        self.record_movement(user_id, amount, ChangeType::Checkin, None).await?;
        let balance = self.balance(user_id).await?;

        info!(
            event_name = "economy.checkin.credited",
            user_id,
            amount,
            multiplier = effects.sign_in_multiplier,
            "daily check-in credited"
        );

        Ok(CheckinReceipt { amount, balance })
    }

    /// Moves coins between users as one atomic pair of movements. The
    /// sender's lock covers the balance check; the receiver side is a
    /// plain credit and needs no lock of its own.
    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: i64,
    ) -> Result<TransferReceipt, EconomyError> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }

        let _guard = self.user_guard(from).await;

        let balance = self.balance(from).await?;
        if balance < amount {
            return Err(EconomyError::InsufficientBalance { balance, required: amount });
        }

        let now = Utc::now();
        let movements = [
            CoinMovement::new(from, -amount, ChangeType::TransferOut, Some(to.to_string()), now),
            CoinMovement::new(to, amount, ChangeType::TransferIn, Some(from.to_string()), now),
        ];
        self.ledger.append_all(&movements).await?;

        info!(event_name = "economy.transfer.completed", from, to, amount, "coins transferred");

        Ok(TransferReceipt {
            from: from.to_string(),
            to: to.to_string(),
            amount,
            sender_balance: balance - amount,
        })
    }

    /// Serializes this user's check-then-debit paths. Held across the
    /// whole game round, including the payout write.
    pub(crate) async fn user_guard(&self, user_id: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(user_id).await
    }

    /// Balance-checked debit; caller must hold the user's guard.
    /// Returns the balance after the debit.
    pub(crate) async fn debit_checked(
        &self,
        user_id: &str,
        amount: i64,
        change_type: ChangeType,
    ) -> Result<i64, EconomyError> {
        let balance = self.balance(user_id).await?;
        if balance < amount {
            return Err(EconomyError::InsufficientBalance { balance, required: amount });
        }
        self.record_movement(user_id, -amount, change_type, None).await?;
        Ok(balance - amount)
    }
}
