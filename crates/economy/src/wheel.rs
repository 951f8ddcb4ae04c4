use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use usagi_core::domain::movement::ChangeType;
use usagi_core::games::wheel::{self, WheelOutcome};

use crate::errors::EconomyError;
use crate::service::EconomyService;
use crate::stake;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WheelPlay {
    pub bet: i64,
    pub stake_waived: bool,
    pub outcome: WheelOutcome,
    /// Credited prize, zero unless the outcome pays.
    pub prize: i64,
    /// Coins lost to the halving slot, zero otherwise.
    pub halved_loss: i64,
    pub balance: i64,
}

#[derive(Clone)]
pub struct WheelGame {
    economy: EconomyService,
}

impl WheelGame {
    pub fn new(economy: EconomyService) -> Self {
        Self { economy }
    }

    pub async fn play(&self, user_id: &str, bet: i64) -> Result<WheelPlay, EconomyError> {
        let mut rng = StdRng::from_entropy();
        self.play_with_rng(user_id, bet, &mut rng).await
    }

    /// One full round: stake, draw, settle. The user's guard is held
    /// for the whole round so the payout lands against the balance the
    /// stake was checked on.
    pub async fn play_with_rng(
        &self,
        user_id: &str,
        bet: i64,
        rng: &mut (impl Rng + Send),
    ) -> Result<WheelPlay, EconomyError> {
        let bet = stake::validate_bet(bet)?;
        let _guard = self.economy.user_guard(user_id).await;

        let effects = self.economy.active_effects(user_id).await?;
        let stake_waived = stake::stake_waived(&effects, rng);
        let after_stake = if stake_waived {
            self.economy.balance(user_id).await?
        } else {
            self.economy.debit_checked(user_id, bet, ChangeType::SpinWheel).await?
        };

        let outcome = wheel::draw(bet, effects.spin_bonus, rng);

        let mut prize = 0;
        let mut halved_loss = 0;
        match outcome {
            WheelOutcome::Prize(amount) => {
                prize = amount;
                self.economy
                    .record_movement(user_id, amount, ChangeType::SpinWheelReward, None)
                    .await?;
            }
            WheelOutcome::Halved => {
                halved_loss = after_stake.max(0) / 2;
                if halved_loss > 0 {
                    self.economy
                        .record_movement(user_id, -halved_loss, ChangeType::SpinWheelHalf, None)
                        .await?;
                }
            }
            WheelOutcome::NoWin | WheelOutcome::Thanks => {}
        }

        let balance = self.economy.balance(user_id).await?;
        info!(
            event_name = "economy.wheel.played",
            user_id,
            bet,
            stake_waived,
            prize,
            halved_loss,
            balance,
            "wheel round settled"
        );

        Ok(WheelPlay { bet, stake_waived, outcome, prize, halved_loss, balance })
    }
}
