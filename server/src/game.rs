use crate::supply::{PairSupply, SupplyError};
use log::debug;
use shared::{Pair, Response};

/// Jackpot accounting on top of a winning pair supply.
///
/// Per jackpot cycle: a match against an empty jackpot seeds it with the fee
/// and grants a bonus round; a match against a pending jackpot pays it out
/// together with the fee and resets it to zero. Misses add the fee.
pub struct Game {
    jackpot: u64,
    supply: Box<dyn PairSupply>,
}

impl Game {
    pub fn new(supply: Box<dyn PairSupply>) -> Self {
        Self::with_jackpot(supply, 0)
    }

    pub fn with_jackpot(supply: Box<dyn PairSupply>, jackpot: u64) -> Self {
        Self { jackpot, supply }
    }

    pub fn jackpot(&self) -> u64 {
        self.jackpot
    }

    /// Checks `guess` against the next winning pair.
    pub fn play(&mut self, fee: u64, guess: Pair) -> Result<Response, SupplyError> {
        let winning = self.supply.pop()?;

        if guess != winning {
            self.jackpot = self.jackpot.saturating_add(fee);
            return Ok(Response::no_win());
        }

        if self.jackpot != 0 {
            let payout = self.jackpot.saturating_add(fee);
            self.jackpot = 0;
            debug!("jackpot of {} paid out", payout);
            Ok(Response::win(payout))
        } else {
            self.jackpot = fee;
            debug!("bonus round granted, jackpot seeded with {}", fee);
            Ok(Response::bonus())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::tests::ScriptedRng;
    use crate::supply::ListSupply;
    use shared::ResponseKind;

    /// Always yields the same winning pair.
    struct FixedSupply(Pair);

    impl PairSupply for FixedSupply {
        fn pop(&mut self) -> Result<Pair, SupplyError> {
            Ok(self.0)
        }
    }

    fn game_with(jackpot: u64) -> Game {
        Game::with_jackpot(Box::new(FixedSupply(Pair::new(1, 1))), jackpot)
    }

    #[test]
    fn test_match_pays_pending_jackpot() {
        let mut game = game_with(58);
        let resp = game.play(42, Pair::new(1, 1)).unwrap();

        assert_eq!(resp, Response::win(100));
        assert_eq!(game.jackpot(), 0);
    }

    #[test]
    fn test_miss_adds_fee() {
        let mut game = game_with(58);
        let resp = game.play(42, Pair::new(1, 2)).unwrap();

        assert_eq!(resp.kind, ResponseKind::NoWin);
        assert_eq!(game.jackpot(), 100);
    }

    #[test]
    fn test_match_on_empty_jackpot_grants_bonus() {
        let mut game = game_with(0);
        let resp = game.play(42, Pair::new(1, 1)).unwrap();

        assert_eq!(resp, Response::bonus());
        assert_eq!(game.jackpot(), 42);
    }

    #[test]
    fn test_bonus_round_then_payout() {
        let mut game = game_with(0);

        assert!(game.play(150, Pair::new(1, 1)).unwrap().is_bonus());
        assert_eq!(game.play(0, Pair::new(1, 1)).unwrap(), Response::win(150));
        assert_eq!(game.jackpot(), 0);
    }

    #[test]
    fn test_nonzero_bonus_fee_is_added_before_outcome() {
        let mut game = game_with(0);
        game.play(10, Pair::new(1, 1)).unwrap();

        assert_eq!(game.play(5, Pair::new(1, 1)).unwrap(), Response::win(15));
    }

    #[test]
    fn test_zero_fee_match_on_empty_jackpot_stays_empty() {
        let mut game = game_with(0);

        assert!(game.play(0, Pair::new(1, 1)).unwrap().is_bonus());
        assert_eq!(game.jackpot(), 0);
        // Still empty, so another match is a bonus again rather than a payout.
        assert!(game.play(0, Pair::new(1, 1)).unwrap().is_bonus());
    }

    #[test]
    fn test_pending_jackpot_absorbs_misses() {
        let mut game = game_with(0);
        game.play(42, Pair::new(1, 1)).unwrap();

        for _ in 0..3 {
            assert_eq!(game.play(10, Pair::new(0, 0)).unwrap(), Response::no_win());
        }
        assert_eq!(game.jackpot(), 72);
    }

    #[test]
    fn test_jackpot_saturates() {
        let mut game = game_with(u64::MAX - 1);
        game.play(10, Pair::new(0, 0)).unwrap();
        assert_eq!(game.jackpot(), u64::MAX);

        assert_eq!(game.play(10, Pair::new(1, 1)).unwrap(), Response::win(u64::MAX));
        assert_eq!(game.jackpot(), 0);
    }

    #[test]
    fn test_supply_failure_leaves_jackpot_untouched() {
        let supply = ListSupply::with_rng(1, ScriptedRng::new(&[1, 1])).unwrap();
        let mut game = Game::with_jackpot(Box::new(supply), 58);

        assert!(game.play(42, Pair::new(1, 1)).is_err());
        assert_eq!(game.jackpot(), 58);
    }
}
