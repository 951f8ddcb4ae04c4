use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use usagi_db::{
    DbPool, InventoryRepository, JackpotRepository, LedgerRepository, SqlInventoryRepository,
    SqlJackpotRepository, SqlLedgerRepository,
};
use usagi_economy::{
    EconomyError, EconomyService, LotteryGame, ShopService, SlotMachine, WheelGame,
};
use usagi_slack::commands::{CoinCommandService, CommandEnvelope, CommandRouteError};
use usagi_slack::messages::{self, Reply};

/// The real `/coin` service: every verb lands on the economy layer
/// backed by the SQL repositories.
pub struct EconomyCommandService {
    economy: EconomyService,
    shop: ShopService,
    wheel: WheelGame,
    lottery: LotteryGame,
    slot: SlotMachine,
}

impl EconomyCommandService {
    pub fn new(pool: DbPool) -> Self {
        let ledger: Arc<dyn LedgerRepository> = Arc::new(SqlLedgerRepository::new(pool.clone()));
        let inventory: Arc<dyn InventoryRepository> =
            Arc::new(SqlInventoryRepository::new(pool.clone()));
        let jackpot: Arc<dyn JackpotRepository> = Arc::new(SqlJackpotRepository::new(pool));

        let economy = EconomyService::new(ledger, Arc::clone(&inventory));
        Self {
            shop: ShopService::new(economy.clone(), inventory),
            wheel: WheelGame::new(economy.clone()),
            lottery: LotteryGame::new(economy.clone(), jackpot),
            slot: SlotMachine::new(economy.clone()),
            economy,
        }
    }

    /// Every economy error becomes a reply: user errors with their own
    /// message, repository failures with a generic line after logging.
    fn reply_error(&self, user_id: &str, error: EconomyError) -> Reply {
        if !error.is_user_error() {
            error!(event_name = "cli.exec.operation_failed", %error, "economy operation failed");
        }
        messages::economy_error_message(user_id, &error)
    }
}

#[async_trait]
impl CoinCommandService for EconomyCommandService {
    async fn check_in(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(match self.economy.check_in(&envelope.user_id).await {
            Ok(receipt) => messages::checkin_message(&envelope.user_id, &receipt),
            Err(error) => self.reply_error(&envelope.user_id, error),
        })
    }

    async fn balance(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(match self.economy.balance(&envelope.user_id).await {
            Ok(balance) => messages::balance_message(&envelope.user_id, balance),
            Err(error) => self.reply_error(&envelope.user_id, error),
        })
    }

    async fn transfer(
        &self,
        to: &str,
        amount: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(match self.economy.transfer(&envelope.user_id, to, amount).await {
            Ok(receipt) => messages::transfer_message(&receipt),
            Err(error) => self.reply_error(&envelope.user_id, error),
        })
    }

    async fn wheel(
        &self,
        bet: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(match self.wheel.play(&envelope.user_id, bet).await {
            Ok(play) => messages::wheel_message(&envelope.user_id, &play),
            Err(error) => self.reply_error(&envelope.user_id, error),
        })
    }

    async fn lottery(
        &self,
        bet: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(match self.lottery.play(&envelope.user_id, bet).await {
            Ok(play) => messages::lottery_message(&envelope.user_id, &play),
            Err(error) => self.reply_error(&envelope.user_id, error),
        })
    }

    async fn slot(&self, bet: i64, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(match self.slot.play(&envelope.user_id, bet).await {
            Ok(play) => messages::slot_message(&envelope.user_id, &play),
            Err(error) => self.reply_error(&envelope.user_id, error),
        })
    }

    async fn shop(&self, _envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(messages::shop_list_message(self.shop.items()))
    }

    async fn buy(
        &self,
        item_id: u32,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(match self.shop.purchase(&envelope.user_id, item_id).await {
            Ok(receipt) => messages::purchase_message(&envelope.user_id, &receipt),
            Err(error) => self.reply_error(&envelope.user_id, error),
        })
    }

    async fn bag(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(match self.shop.bag(&envelope.user_id).await {
            Ok(entries) => messages::bag_message(&envelope.user_id, &entries),
            Err(error) => self.reply_error(&envelope.user_id, error),
        })
    }
}
