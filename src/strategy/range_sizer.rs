//! Placement of the `main` and `alt` ranges.
//!
//! `main` is centered on the current tick. `alt` is a single-spacing band
//! touching `main` on the side that can soak up whichever idle token is in
//! excess: just below `main` when token1 dominates, just above when token0
//! does.

use crate::error::StateError;
use crate::math::price_math::value_in_token1;
use crate::math::tick_math::{check_ticks, symmetric_range};
use alloy_primitives::U256;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl Position {
    pub fn new(tick_lower: i32, tick_upper: i32) -> Result<Self, StateError> {
        check_ticks(tick_lower, tick_upper)?;
        Ok(Self {
            tick_lower,
            tick_upper,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PositionKind {
    Main,
    Alt,
}

/// Which idle token is worth more at the current price.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Skew {
    Token0Excess,
    Token1Excess,
    Balanced,
}

impl Skew {
    /// Compares `idle0` valued in token1 against `idle1`.
    pub fn of(idle0: U256, idle1: U256, price: U256) -> Self {
        // valuing only fails on overflow, when token0 outweighs any idle1
        let Ok(value0) = value_in_token1(idle0, price) else {
            return Skew::Token0Excess;
        };
        if value0 < idle1 {
            Skew::Token1Excess
        } else if idle1 < value0 {
            Skew::Token0Excess
        } else {
            Skew::Balanced
        }
    }

    /// Token1 excess sits below `main`; token0 excess and a balanced book
    /// sit above.
    pub fn alt_below(self) -> bool {
        matches!(self, Skew::Token1Excess)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RangePlan {
    pub main: Position,
    pub alt: Position,
    pub skew: Skew,
}

/// The main range with both alt candidates, before the idle balances pick
/// a side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RangeLayout {
    pub main: Position,
    pub below: Position,
    pub above: Position,
}

impl RangeLayout {
    pub fn plan(&self, skew: Skew) -> RangePlan {
        let alt = if skew.alt_below() { self.below } else { self.above };
        RangePlan {
            main: self.main,
            alt,
            skew,
        }
    }
}

/// Places the main range around `current_tick` and both alt candidates.
///
/// `width_ticks` is the main range's half-width and must be a positive
/// multiple of `tick_spacing`. Boundaries that would leave the tick bounds
/// are an error, never clamped.
pub fn layout_ranges(
    current_tick: i32,
    tick_spacing: i32,
    width_ticks: i32,
) -> Result<RangeLayout, StateError> {
    if tick_spacing <= 0 {
        return Err(StateError::InvalidSpacing(tick_spacing));
    }
    if width_ticks <= 0 || width_ticks % tick_spacing != 0 {
        return Err(StateError::UnalignedWidth {
            width: width_ticks,
            spacing: tick_spacing,
        });
    }

    let (lower, upper) = symmetric_range(current_tick, tick_spacing, width_ticks)?;
    let main = Position::new(lower, upper)?;
    let (below, above) = alt_candidates(main, tick_spacing)?;

    Ok(RangeLayout { main, below, above })
}

/// Both places `alt` could go for a given `main`: `(below, above)`.
pub fn alt_candidates(main: Position, tick_spacing: i32) -> Result<(Position, Position), StateError> {
    let below_lower = main
        .tick_lower
        .checked_sub(tick_spacing)
        .ok_or(StateError::TickOutOfBounds)?;
    let above_upper = main
        .tick_upper
        .checked_add(tick_spacing)
        .ok_or(StateError::TickOutOfBounds)?;

    Ok((
        Position::new(below_lower, main.tick_lower)?,
        Position::new(main.tick_upper, above_upper)?,
    ))
}

/// Computes the main range around `current_tick` and the alt range for the
/// idle balances' skew at `price` (token0 in token1, scaled by
/// `PRICE_PRECISION`). See [`layout_ranges`] for the width rules.
pub fn compute_ranges(
    current_tick: i32,
    tick_spacing: i32,
    width_ticks: i32,
    idle0: U256,
    idle1: U256,
    price: U256,
) -> Result<RangePlan, StateError> {
    let layout = layout_ranges(current_tick, tick_spacing, width_ticks)?;
    let plan = layout.plan(Skew::of(idle0, idle1, price));

    tracing::debug!(
        current_tick,
        main_lower = plan.main.tick_lower,
        main_upper = plan.main.tick_upper,
        alt_lower = plan.alt.tick_lower,
        alt_upper = plan.alt.tick_upper,
        skew = ?plan.skew,
        "sized ranges"
    );

    Ok(plan)
}
