use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use usagi_core::domain::jackpot::{self, POOL_BASE_AMOUNT};
use usagi_core::domain::movement::ChangeType;
use usagi_core::games::lottery;
use usagi_db::JackpotRepository;

use crate::errors::EconomyError;
use crate::service::EconomyService;
use crate::stake;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LotteryResult {
    Won { pot: i64 },
    Lost { pool: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LotteryPlay {
    pub bet: i64,
    pub stake_waived: bool,
    pub win_rate: i64,
    pub result: LotteryResult,
    pub balance: i64,
}

/// The shared-jackpot lottery. All players feed one pool per day; the
/// first winning roll takes the whole pool and closes the day.
#[derive(Clone)]
pub struct LotteryGame {
    economy: EconomyService,
    jackpot: Arc<dyn JackpotRepository>,
}

impl LotteryGame {
    pub fn new(economy: EconomyService, jackpot: Arc<dyn JackpotRepository>) -> Self {
        Self { economy, jackpot }
    }

    pub async fn play(&self, user_id: &str, bet: i64) -> Result<LotteryPlay, EconomyError> {
        let mut rng = StdRng::from_entropy();
        self.play_with_rng(user_id, bet, &mut rng).await
    }

    pub async fn play_with_rng(
        &self,
        user_id: &str,
        bet: i64,
        rng: &mut (impl Rng + Send),
    ) -> Result<LotteryPlay, EconomyError> {
        let bet = stake::validate_bet(bet)?;
        let today = Utc::now().date_naive();

        // Fast path: a decided day rejects before any coins move.
        if let Some(day) = self.jackpot.day(today).await? {
            if let Some(winner) = day.won_by {
                return Err(EconomyError::JackpotAlreadyWon { winner });
            }
        }

        let _guard = self.economy.user_guard(user_id).await;

        let effects = self.economy.active_effects(user_id).await?;
        let stake_waived = stake::stake_waived(&effects, rng);
        if !stake_waived {
            self.economy.debit_checked(user_id, bet, ChangeType::Lottery).await?;
        }

        // The stake feeds the pool win or lose, waived or not.
        let yesterday = self.jackpot.day(today - Duration::days(1)).await?;
        let seed = jackpot::seed_amount(yesterday.map(|day| day.amount));
        self.jackpot.open_day(today, seed).await?;
        let pool = self.jackpot.grow(today, bet).await?;

        let win_rate = lottery::win_rate(bet, effects.lottery_bonus);
        let result = if lottery::roll(win_rate, rng) {
            match self.jackpot.claim_win(today, user_id, POOL_BASE_AMOUNT).await? {
                Some(pot) => {
                    self.economy
                        .record_movement(user_id, pot, ChangeType::LotteryWin, None)
                        .await?;
                    info!(
                        event_name = "economy.lottery.jackpot_claimed",
                        user_id, pot, "daily jackpot claimed"
                    );
                    LotteryResult::Won { pot }
                }
                // Lost the claim race after the roll. The stake stays
                // in the pool and the play settles as a loss.
                None => {
                    let pool = self
                        .jackpot
                        .day(today)
                        .await?
                        .map(|day| day.amount)
                        .unwrap_or(POOL_BASE_AMOUNT);
                    LotteryResult::Lost { pool }
                }
            }
        } else {
            LotteryResult::Lost { pool }
        };

        let balance = self.economy.balance(user_id).await?;
        info!(
            event_name = "economy.lottery.played",
            user_id,
            bet,
            stake_waived,
            win_rate,
            won = matches!(result, LotteryResult::Won { .. }),
            balance,
            "lottery round settled"
        );

        Ok(LotteryPlay { bet, stake_waived, win_rate, result, balance })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use usagi_core::domain::inventory::{Effect, InventoryItem};
    use usagi_core::domain::jackpot::{JackpotDay, POOL_BASE_AMOUNT};
    use usagi_core::domain::movement::ChangeType;
    use usagi_db::{
        InMemoryInventoryRepository, InMemoryJackpotRepository, InMemoryLedgerRepository,
        InventoryRepository, JackpotRepository, RepositoryError,
    };

    use super::{LotteryGame, LotteryResult};
    use crate::errors::EconomyError;
    use crate::service::EconomyService;

    struct Fixture {
        game: LotteryGame,
        economy: EconomyService,
        inventory: Arc<InMemoryInventoryRepository>,
        jackpot: Arc<InMemoryJackpotRepository>,
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let inventory = Arc::new(InMemoryInventoryRepository::new(Arc::clone(&ledger)));
        let jackpot = Arc::new(InMemoryJackpotRepository::new());
        let economy = EconomyService::new(ledger, inventory.clone());
        let game = LotteryGame::new(economy.clone(), jackpot.clone());
        Fixture { game, economy, inventory, jackpot }
    }

    async fn seed(economy: &EconomyService, user_id: &str, amount: i64) {
        economy
            .record_movement(user_id, amount, ChangeType::Checkin, None)
            .await
            .expect("seed balance");
    }

    /// A lottery bonus large enough to force the win rate to 100.
    async fn guarantee_win(inventory: &InMemoryInventoryRepository, user_id: &str) {
        let now = Utc::now();
        inventory
            .insert(&InventoryItem {
                id: format!("sure-thing-{user_id}"),
                user_id: user_id.to_string(),
                item_id: 3,
                item_name: "Lottery King".to_string(),
                price_paid: 10_000,
                purchased_at: now,
                expire_at: None,
                effects: vec![Effect::LotteryBonus { bonus: 0.70 }],
            })
            .await
            .expect("insert bonus item");
    }

    #[tokio::test]
    async fn every_play_feeds_the_pool() {
        let fixture = fixture();
        seed(&fixture.economy, "U1", 1_000).await;

        let mut rng = StdRng::seed_from_u64(5);
        let play = fixture.game.play_with_rng("U1", 10, &mut rng).await.expect("play");

        assert_eq!(play.win_rate, 1);
        match play.result {
            // The overwhelmingly likely branch at rate 1: the stake
            // lands on top of the freshly seeded pool.
            LotteryResult::Lost { pool } => assert_eq!(pool, POOL_BASE_AMOUNT + 10),
            LotteryResult::Won { pot } => assert_eq!(pot, POOL_BASE_AMOUNT + 10),
        }
    }

    #[tokio::test]
    async fn a_guaranteed_win_takes_the_pool_and_closes_the_day() {
        let fixture = fixture();
        seed(&fixture.economy, "U1", 10_000).await;
        seed(&fixture.economy, "U2", 10_000).await;
        guarantee_win(&fixture.inventory, "U1").await;

        let mut rng = StdRng::seed_from_u64(1);
        let play = fixture.game.play_with_rng("U1", 300, &mut rng).await.expect("play");

        assert_eq!(play.win_rate, 100);
        let LotteryResult::Won { pot } = play.result else {
            panic!("rate 100 must win");
        };
        // Seed 1000 plus this play's stake.
        assert_eq!(pot, POOL_BASE_AMOUNT + 300);
        let staked = if play.stake_waived { 0 } else { 300 };
        assert_eq!(play.balance, 10_000 - staked + pot);

        // The day is decided for everyone else.
        let second = fixture.game.play_with_rng("U2", 10, &mut rng).await;
        assert!(matches!(
            second,
            Err(EconomyError::JackpotAlreadyWon { winner }) if winner == "U1"
        ));
        assert_eq!(fixture.economy.balance("U2").await.expect("balance"), 10_000);
    }

    #[tokio::test]
    async fn concurrent_guaranteed_wins_produce_one_winner() {
        let fixture = fixture();
        seed(&fixture.economy, "U1", 10_000).await;
        seed(&fixture.economy, "U2", 10_000).await;
        guarantee_win(&fixture.inventory, "U1").await;
        guarantee_win(&fixture.inventory, "U2").await;

        let first = {
            let game = fixture.game.clone();
            tokio::spawn(async move { game.play("U1", 300).await })
        };
        let second = {
            let game = fixture.game.clone();
            tokio::spawn(async move { game.play("U2", 300).await })
        };

        let outcomes = [first.await.expect("join"), second.await.expect("join")];
        let wins = outcomes
            .iter()
            .filter(|outcome| {
                matches!(
                    outcome,
                    Ok(play) if matches!(play.result, LotteryResult::Won { .. })
                )
            })
            .count();
        assert_eq!(wins, 1, "exactly one play may claim the pool");

        let today = Utc::now().date_naive();
        let day = fixture.jackpot.day(today).await.expect("day").expect("row");
        assert!(day.won_by.is_some());
        assert_eq!(day.amount, POOL_BASE_AMOUNT);
    }

    /// Delegates to the in-memory repository but lets a rival take the
    /// pool right after this play feeds it, forcing a lost claim race.
    struct ContestedJackpot {
        inner: Arc<InMemoryJackpotRepository>,
    }

    #[async_trait::async_trait]
    impl JackpotRepository for ContestedJackpot {
        async fn day(&self, day: NaiveDate) -> Result<Option<JackpotDay>, RepositoryError> {
            self.inner.day(day).await
        }

        async fn open_day(
            &self,
            day: NaiveDate,
            seed_amount: i64,
        ) -> Result<JackpotDay, RepositoryError> {
            self.inner.open_day(day, seed_amount).await
        }

        async fn grow(&self, day: NaiveDate, delta: i64) -> Result<i64, RepositoryError> {
            let amount = self.inner.grow(day, delta).await?;
            self.inner.claim_win(day, "RIVAL", POOL_BASE_AMOUNT).await?;
            Ok(amount)
        }

        async fn claim_win(
            &self,
            day: NaiveDate,
            winner: &str,
            reset_amount: i64,
        ) -> Result<Option<i64>, RepositoryError> {
            self.inner.claim_win(day, winner, reset_amount).await
        }
    }

    #[tokio::test]
    async fn a_win_that_loses_the_claim_race_settles_as_a_loss() {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let inventory = Arc::new(InMemoryInventoryRepository::new(Arc::clone(&ledger)));
        let jackpot =
            Arc::new(ContestedJackpot { inner: Arc::new(InMemoryJackpotRepository::new()) });
        let economy = EconomyService::new(ledger, inventory.clone());
        let game = LotteryGame::new(economy.clone(), jackpot.clone());

        seed(&economy, "U1", 10_000).await;
        guarantee_win(&inventory, "U1").await;

        let mut rng = StdRng::seed_from_u64(1);
        let play = game.play_with_rng("U1", 300, &mut rng).await.expect("play");

        assert_eq!(play.win_rate, 100);
        // The rival already holds the pool; this play reports the loss
        // and the balance after its own stake, nothing more.
        assert_eq!(play.result, LotteryResult::Lost { pool: POOL_BASE_AMOUNT });
        let staked = if play.stake_waived { 0 } else { 300 };
        assert_eq!(play.balance, 10_000 - staked);
        assert_eq!(economy.balance("U1").await.expect("balance"), 10_000 - staked);

        let today = Utc::now().date_naive();
        let day = jackpot.day(today).await.expect("day").expect("row");
        assert_eq!(day.won_by.as_deref(), Some("RIVAL"));
    }

    #[tokio::test]
    async fn yesterdays_pool_seeds_today_with_the_increment() {
        let fixture = fixture();
        let today = Utc::now().date_naive();
        let yesterday = today - chrono::Duration::days(1);
        fixture.jackpot.open_day(yesterday, 4_000).await.expect("open yesterday");

        seed(&fixture.economy, "U1", 1_000).await;
        let mut rng = StdRng::seed_from_u64(5);
        fixture.game.play_with_rng("U1", 10, &mut rng).await.ok();

        let day = fixture.jackpot.day(today).await.expect("day").expect("row");
        // 4000 carried + 500 increment + the 10-coin stake, unless the
        // play won and reset the pool.
        if day.won_by.is_none() {
            assert_eq!(day.amount, 4_000 + 500 + 10);
        }
    }
}
