//! In-memory pool used by the strategy tests.

use crate::error::PoolError;
use crate::math::liquidity_amounts::get_amounts_for_liquidity;
use crate::math::tick_math::get_sqrt_ratio_at_tick;
use crate::oracle::{DEFAULT_CAPACITY, ObservationRing};
use crate::strategy::pool::{Pool, PoolState};
use alloy_primitives::U256;
use std::collections::{HashMap, HashSet};

type RangeKey = (i32, i32);

pub(crate) struct MockPool {
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub tick_spacing: i32,
    pub now: u64,
    pub oracle: ObservationRing,
    pub oracle_down: bool,
    pub state_down: bool,
    pub fail_burns: bool,
    pub fail_burn_at: Option<RangeKey>,
    pub fail_collect_at: Option<RangeKey>,
    pub rejected: HashSet<RangeKey>,
    pub positions: HashMap<RangeKey, u128>,
    pub fees: HashMap<RangeKey, (U256, U256)>,
    pub mints: usize,
    pub burns: usize,
}

impl MockPool {
    pub fn new(tick: i32, tick_spacing: i32) -> Self {
        Self {
            sqrt_price_x96: get_sqrt_ratio_at_tick(tick).unwrap(),
            tick,
            tick_spacing,
            now: 0,
            oracle: ObservationRing::new(DEFAULT_CAPACITY, 0, tick),
            oracle_down: false,
            state_down: false,
            fail_burns: false,
            fail_burn_at: None,
            fail_collect_at: None,
            rejected: HashSet::new(),
            positions: HashMap::new(),
            fees: HashMap::new(),
            mints: 0,
            burns: 0,
        }
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    /// Moves the price to `tick` at the pool's current time.
    pub fn set_tick(&mut self, tick: i32) {
        self.tick = tick;
        self.sqrt_price_x96 = get_sqrt_ratio_at_tick(tick).unwrap();
        self.oracle.write(self.now, tick);
    }

    pub fn accrue_fees(&mut self, tick_lower: i32, tick_upper: i32, fee0: u64, fee1: u64) {
        let entry = self
            .fees
            .entry((tick_lower, tick_upper))
            .or_insert((U256::ZERO, U256::ZERO));
        entry.0 += U256::from(fee0);
        entry.1 += U256::from(fee1);
    }

    pub fn reject(&mut self, tick_lower: i32, tick_upper: i32) {
        self.rejected.insert((tick_lower, tick_upper));
    }

    pub fn liquidity_at(&self, tick_lower: i32, tick_upper: i32) -> u128 {
        self.positions
            .get(&(tick_lower, tick_upper))
            .copied()
            .unwrap_or(0)
    }

    pub fn open_ranges(&self) -> usize {
        self.positions.values().filter(|l| **l > 0).count()
    }

    fn amounts(&self, tick_lower: i32, tick_upper: i32, liquidity: u128) -> (U256, U256) {
        get_amounts_for_liquidity(
            self.sqrt_price_x96,
            get_sqrt_ratio_at_tick(tick_lower).unwrap(),
            get_sqrt_ratio_at_tick(tick_upper).unwrap(),
            liquidity,
        )
        .unwrap()
    }
}

impl Pool for MockPool {
    fn current_state(&self) -> Result<PoolState, PoolError> {
        if self.state_down {
            return Err(PoolError::Call("slot0 unavailable".to_string()));
        }
        Ok(PoolState {
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
            tick_spacing: self.tick_spacing,
            fee_pips: 3_000,
        })
    }

    fn time_weighted_tick(&self, lookback_seconds: u32) -> Result<i32, PoolError> {
        if self.oracle_down {
            return Err(PoolError::OracleUnavailable(lookback_seconds));
        }
        self.oracle
            .time_weighted_tick(self.now, lookback_seconds)
            .ok_or(PoolError::OracleUnavailable(lookback_seconds))
    }

    fn mint(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError> {
        if self.rejected.contains(&(tick_lower, tick_upper)) {
            return Err(PoolError::MintRejected {
                tick_lower,
                tick_upper,
                reason: "range disabled".to_string(),
            });
        }
        self.mints += 1;
        *self.positions.entry((tick_lower, tick_upper)).or_insert(0) += liquidity;
        Ok(self.amounts(tick_lower, tick_upper, liquidity))
    }

    fn burn(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError> {
        if self.fail_burns || self.fail_burn_at == Some((tick_lower, tick_upper)) {
            return Err(PoolError::Call("burn reverted".to_string()));
        }
        let held = self.liquidity_at(tick_lower, tick_upper);
        if held < liquidity {
            return Err(PoolError::Call(format!(
                "burn of {liquidity} exceeds {held} held"
            )));
        }
        self.burns += 1;
        self.positions.insert((tick_lower, tick_upper), held - liquidity);
        Ok(self.amounts(tick_lower, tick_upper, liquidity))
    }

    fn collect_fees(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<(U256, U256), PoolError> {
        if self.fail_collect_at == Some((tick_lower, tick_upper)) {
            return Err(PoolError::Call("collect reverted".to_string()));
        }
        Ok(self
            .fees
            .remove(&(tick_lower, tick_upper))
            .unwrap_or((U256::ZERO, U256::ZERO)))
    }
}
