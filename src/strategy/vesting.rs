//! Linear vesting of harvested fees.
//!
//! Fees are held immediately but recognized over [`DURATION`] seconds so
//! that a harvest does not make reported balances jump.

use crate::math::math_helpers::mul_div;
use alloy_primitives::U256;

/// Seconds over which a harvest is released.
pub const DURATION: u64 = 21_600;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LockedProfit {
    pub amount0: U256,
    pub amount1: U256,
    pub last_report: u64,
}

impl LockedProfit {
    /// Seconds of the current lock still to run at `now`.
    pub fn remaining(&self, now: u64) -> u64 {
        let elapsed = now.saturating_sub(self.last_report);
        DURATION.saturating_sub(elapsed)
    }

    /// Portion of the locked amounts not yet released at `now`:
    /// `locked * remaining / DURATION`, truncating.
    pub fn unvested(&self, now: u64) -> (U256, U256) {
        let remaining = self.remaining(now);
        if remaining == 0 {
            return (U256::ZERO, U256::ZERO);
        }
        let remaining = U256::from(remaining);

        (
            share(self.amount0, remaining),
            share(self.amount1, remaining),
        )
    }

    /// Starts a new lock at `now` holding whatever is still unvested plus
    /// the freshly harvested amounts.
    pub fn lock(&mut self, now: u64, fee0: U256, fee1: U256) {
        let (still0, still1) = self.unvested(now);
        self.amount0 = still0.saturating_add(fee0);
        self.amount1 = still1.saturating_add(fee1);
        self.last_report = now;
    }
}

// remaining never exceeds DURATION, so the quotient always fits in `amount`
fn share(amount: U256, remaining: U256) -> U256 {
    mul_div(amount, remaining, U256::from(DURATION)).unwrap_or(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked(amount: u64, at: u64) -> LockedProfit {
        let mut profit = LockedProfit::default();
        profit.lock(at, U256::from(amount), U256::from(amount * 2));
        profit
    }

    #[test]
    fn nothing_is_locked_by_default() {
        let profit = LockedProfit::default();
        assert_eq!(profit.unvested(0), (U256::ZERO, U256::ZERO));
        assert_eq!(profit.unvested(1_000_000), (U256::ZERO, U256::ZERO));
    }

    #[test]
    fn fully_locked_at_harvest_time() {
        let profit = locked(1_000, 500);
        assert_eq!(profit.unvested(500), (U256::from(1_000u64), U256::from(2_000u64)));
    }

    #[test]
    fn half_released_at_half_duration() {
        let profit = locked(1_001, 500);
        let (a, b) = profit.unvested(500 + DURATION / 2);
        assert_eq!(a, U256::from(500u64));
        assert_eq!(b, U256::from(1_001u64));
    }

    #[test]
    fn fully_released_after_duration() {
        let profit = locked(1_000, 500);
        assert_eq!(profit.unvested(500 + DURATION), (U256::ZERO, U256::ZERO));
        assert_eq!(profit.unvested(500 + 10 * DURATION), (U256::ZERO, U256::ZERO));
    }

    #[test]
    fn decay_is_monotonic() {
        let profit = locked(987_654, 0);
        let mut previous = profit.unvested(0).0;
        for t in (0..=DURATION).step_by(997) {
            let (current, _) = profit.unvested(t);
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn clock_behind_last_report_keeps_everything_locked() {
        let profit = locked(1_000, 500);
        assert_eq!(profit.unvested(100).0, U256::from(1_000u64));
    }

    #[test]
    fn huge_amounts_vest_at_full_precision() {
        let profit = LockedProfit {
            amount0: U256::MAX,
            amount1: U256::MAX - U256::ONE,
            last_report: 0,
        };
        let (a, b) = profit.unvested(DURATION / 2);
        assert_eq!(a, U256::MAX >> 1);
        assert_eq!(b, (U256::MAX - U256::ONE) >> 1);
        assert_eq!(profit.unvested(0), (U256::MAX, U256::MAX - U256::ONE));
    }

    #[test]
    fn relock_carries_unvested_remainder() {
        let mut profit = locked(1_000, 0);
        profit.lock(DURATION / 2, U256::from(100u64), U256::ZERO);
        assert_eq!(profit.last_report, DURATION / 2);
        assert_eq!(profit.amount0, U256::from(600u64));
        assert_eq!(profit.amount1, U256::from(1_000u64));
        assert_eq!(profit.unvested(DURATION / 2).0, U256::from(600u64));
    }
}
