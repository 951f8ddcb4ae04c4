use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

pub const JACKPOT_PRIZE: i64 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelOutcome {
    NoWin,
    Prize(i64),
    Thanks,
    Halved,
}

/// Relative weights for one spin. Larger stakes tilt the prize slots
/// upward; the jackpot slot additionally scales with the summed
/// `SpinBonus` effect.
pub fn outcome_table(bet: i64, spin_bonus: f64) -> Vec<(WheelOutcome, f64)> {
    let bet = bet as f64;
    vec![
        (WheelOutcome::NoWin, 30.0),
        (WheelOutcome::Prize(10), 10.0),
        (WheelOutcome::Prize(20), 15.0),
        (WheelOutcome::Prize(50), 5.0 + bet / 10.0),
        (WheelOutcome::Prize(100), 2.0 + bet / 5.0),
        (WheelOutcome::Prize(JACKPOT_PRIZE), (1.0 + bet / 10.0) * (1.0 + spin_bonus)),
        (WheelOutcome::Thanks, 20.0),
        (WheelOutcome::Halved, 1.0),
    ]
}

/// Sample one outcome. A summed spin bonus of 1.0 or more is a
/// guaranteed jackpot: no draw happens at all.
pub fn draw(bet: i64, spin_bonus: f64, rng: &mut impl Rng) -> WheelOutcome {
    if spin_bonus >= 1.0 {
        return WheelOutcome::Prize(JACKPOT_PRIZE);
    }

    let table = outcome_table(bet, spin_bonus);
    let weights: Vec<f64> = table.iter().map(|(_, weight)| *weight).collect();
    match WeightedIndex::new(&weights) {
        Ok(distribution) => table[distribution.sample(rng)].0,
        // Weights are positive for any valid bet.
        Err(_) => WheelOutcome::NoWin,
    }
}
