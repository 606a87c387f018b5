//! Range management core for a two-range concentrated-liquidity strategy.
//!
//! This crate exposes:
//! - Low‑level math primitives (`math::*`) for ticks, sqrt prices, prices
//!   and liquidity amounts.
//! - A tick-cumulative observation ring (`oracle`) for time-weighted ticks.
//! - The `Strategy` orchestrator that keeps a `main` and an `alt` range
//!   centered on the pool price, gated by a calm-market check, and vests
//!   harvested fees linearly.
//!
//! # Examples
//!
//! ## Pure math
//! ```no_run
//! use clmm_range_strategy::{math::tick_math, RESOLUTION, U256};
//!
//! let sqrt_price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
//! assert!(sqrt_price > U256::ZERO);
//! assert_eq!(RESOLUTION, 96);
//! ```
//!
//! ## Sizing the two ranges
//! ```no_run
//! use clmm_range_strategy::{
//!     math::price_math::PRICE_PRECISION,
//!     strategy::range_sizer::compute_ranges,
//!     U256,
//! };
//!
//! let plan = compute_ranges(1000, 10, 200, U256::ZERO, U256::from(100u8), PRICE_PRECISION).unwrap();
//! assert_eq!((plan.main.tick_lower, plan.main.tick_upper), (800, 1200));
//! assert_eq!((plan.alt.tick_lower, plan.alt.tick_upper), (790, 800));
//! ```

pub use alloy_primitives::{I256, U256};

pub mod error;
pub mod math;
pub mod oracle;
pub mod strategy;

pub use strategy::Strategy;

const U256_127: U256 = U256::from_limbs([127, 0, 0, 0]);
const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
