//! Calm-market check: is the current tick close enough to its
//! time-weighted average to move liquidity?

/// Outcome of the calm check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CalmStatus {
    Calm { deviation: u32 },
    Volatile { deviation: u32 },
    /// No time-weighted tick could be obtained. Never treated as calm.
    Indeterminate,
}

impl CalmStatus {
    pub fn is_calm(self) -> bool {
        matches!(self, CalmStatus::Calm { .. })
    }
}

/// Absolute distance between two ticks.
#[inline]
pub fn tick_deviation(current_tick: i32, twap_tick: i32) -> u32 {
    (current_tick as i64 - twap_tick as i64).unsigned_abs() as u32
}

/// `|current_tick - twap_tick| <= max_deviation`, inclusive.
#[inline]
pub fn is_calm(current_tick: i32, twap_tick: i32, max_deviation: u32) -> bool {
    tick_deviation(current_tick, twap_tick) <= max_deviation
}

/// Classifies the market given the time-weighted tick, if one was
/// available.
pub fn evaluate(current_tick: i32, twap_tick: Option<i32>, max_deviation: u32) -> CalmStatus {
    match twap_tick {
        None => CalmStatus::Indeterminate,
        Some(twap_tick) => {
            let deviation = tick_deviation(current_tick, twap_tick);
            if deviation <= max_deviation {
                CalmStatus::Calm { deviation }
            } else {
                CalmStatus::Volatile { deviation }
            }
        }
    }
}
