use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use usagi_core::domain::movement::ChangeType;
use usagi_core::games::slot::{self, LineWin, SlotGrid};

use crate::errors::EconomyError;
use crate::service::EconomyService;
use crate::stake;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotPlay {
    pub bet: i64,
    pub stake_waived: bool,
    pub grid: SlotGrid,
    pub line_wins: Vec<LineWin>,
    pub payout: i64,
    pub balance: i64,
}

#[derive(Clone)]
pub struct SlotMachine {
    economy: EconomyService,
}

impl SlotMachine {
    pub fn new(economy: EconomyService) -> Self {
        Self { economy }
    }

    pub async fn play(&self, user_id: &str, bet: i64) -> Result<SlotPlay, EconomyError> {
        let mut rng = StdRng::from_entropy();
        self.play_with_rng(user_id, bet, &mut rng).await
    }

    pub async fn play_with_rng(
        &self,
        user_id: &str,
        bet: i64,
        rng: &mut (impl Rng + Send),
    ) -> Result<SlotPlay, EconomyError> {
        let bet = stake::validate_bet(bet)?;
        let _guard = self.economy.user_guard(user_id).await;

        let effects = self.economy.active_effects(user_id).await?;
        let stake_waived = stake::stake_waived(&effects, rng);
        if !stake_waived {
            self.economy.debit_checked(user_id, bet, ChangeType::SlotMachine).await?;
        }

        let grid = slot::spin(&effects.suppressed, rng);
        let evaluation = slot::evaluate(&grid, bet);
        if evaluation.total_payout > 0 {
            self.economy
                .record_movement(user_id, evaluation.total_payout, ChangeType::SlotMachineWin, None)
                .await?;
        }

        let balance = self.economy.balance(user_id).await?;
        info!(
            event_name = "economy.slot.played",
            user_id,
            bet,
            stake_waived,
            payout = evaluation.total_payout,
            winning_lines = evaluation.line_wins.len(),
            balance,
            "slot round settled"
        );

        Ok(SlotPlay {
            bet,
            stake_waived,
            grid,
            line_wins: evaluation.line_wins,
            payout: evaluation.total_payout,
            balance,
        })
    }
}
