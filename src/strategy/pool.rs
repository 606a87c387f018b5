use crate::error::PoolError;
use alloy_primitives::U256;

/// Snapshot of the pool read at the start of an operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolState {
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub tick_spacing: i32,
    pub fee_pips: u32,
}

/// The concentrated-liquidity pool the strategy provides liquidity to.
///
/// Token amounts flow between the pool and the strategy's idle balances:
/// `mint` takes the returned amounts, `burn` and `collect_fees` hand the
/// returned amounts over.
pub trait Pool {
    fn current_state(&self) -> Result<PoolState, PoolError>;

    /// Average tick over the last `lookback_seconds`, or
    /// `PoolError::OracleUnavailable` when the history is too short.
    fn time_weighted_tick(&self, lookback_seconds: u32) -> Result<i32, PoolError>;

    fn mint(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError>;

    fn burn(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError>;

    fn collect_fees(&mut self, tick_lower: i32, tick_upper: i32)
    -> Result<(U256, U256), PoolError>;
}
