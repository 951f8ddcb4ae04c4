use rand::Rng;

/// Base win rate caps at 30% no matter how large the stake.
pub const MAX_BASE_RATE: i64 = 30;

/// Win percentage for one play: one point per 10 coins staked, capped,
/// plus the summed `LotteryBonus` effect, never past certainty.
pub fn win_rate(bet: i64, lottery_bonus: f64) -> i64 {
    let base = (bet / 10).min(MAX_BASE_RATE);
    let bonus = (lottery_bonus * 100.0).round() as i64;
    (base + bonus).min(100)
}

pub fn roll(rate: i64, rng: &mut impl Rng) -> bool {
    rng.gen_range(1..=100) <= rate
}
