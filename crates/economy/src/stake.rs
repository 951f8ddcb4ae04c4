use rand::Rng;

use usagi_core::domain::inventory::ActiveEffects;
use usagi_core::games::MINIMUM_BET;

use crate::errors::EconomyError;

pub fn validate_bet(bet: i64) -> Result<i64, EconomyError> {
    if bet < MINIMUM_BET {
        return Err(EconomyError::MinimumBet { minimum: MINIMUM_BET });
    }
    Ok(bet)
}

/// Fair coin flip for holders of an active `FreeCost` effect. Applies
/// to game stakes only; shop purchases always pay.
pub fn stake_waived(effects: &ActiveEffects, rng: &mut impl Rng) -> bool {
    effects.free_cost && rng.gen_bool(0.5)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use usagi_core::domain::inventory::ActiveEffects;

    use super::{stake_waived, validate_bet};
    use crate::errors::EconomyError;

    #[test]
    fn bets_below_the_minimum_are_rejected() {
        assert!(matches!(validate_bet(9), Err(EconomyError::MinimumBet { minimum: 10 })));
        assert!(matches!(validate_bet(0), Err(EconomyError::MinimumBet { .. })));
        assert!(matches!(validate_bet(-5), Err(EconomyError::MinimumBet { .. })));
        assert_eq!(validate_bet(10).expect("minimum bet"), 10);
    }

    #[test]
    fn waiver_requires_the_effect() {
        let mut rng = StdRng::seed_from_u64(3);
        let without = ActiveEffects::default();
        for _ in 0..64 {
            assert!(!stake_waived(&without, &mut rng));
        }
    }

    #[test]
    fn waiver_is_roughly_a_coin_flip_with_the_effect() {
        let mut rng = StdRng::seed_from_u64(3);
        let effects = ActiveEffects { free_cost: true, ..ActiveEffects::default() };
        let waived = (0..2_000).filter(|_| stake_waived(&effects, &mut rng)).count();
        assert!((800..1_200).contains(&waived), "waived {waived} of 2000");
    }
}
