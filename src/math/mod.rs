pub mod bit_math;
pub mod liquidity_amounts;
pub mod math_helpers;
pub mod price_math;
pub mod tick_math;
