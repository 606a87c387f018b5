use crate::error::{Error, MathError, StateError};
use crate::math::math_helpers::mul_div;
use alloy_primitives::U256;

/// Scale of a fixed-point price: `1.0` is `10^36`.
pub const PRICE_PRECISION: U256 = U256::from_limbs([12919594847110692864, 54210108624275221, 0, 0]);

const U256_TEN: U256 = U256::from_limbs([10, 0, 0, 0]);
const Q64: U256 = U256::from_limbs([0, 1, 0, 0]);
const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
const Q192: U256 = U256::from_limbs([0, 0, 0, 1]);

/// Converts a Q64.96 sqrt price into the price of token0 denominated in
/// token1, scaled by [`PRICE_PRECISION`] and adjusted for token decimals.
///
/// Sqrt prices below `2^128` are squared exactly and truncated once by
/// `2^192`. Larger ones drop 64 bits before scaling, which costs less than
/// one part in `2^128`. With `decimals0 > decimals1` the
/// result is multiplied by `10^(decimals0 - decimals1)`, otherwise divided
/// by `10^(decimals1 - decimals0)`.
pub fn price_from_sqrt_price(
    sqrt_price_x96: U256,
    decimals0: u8,
    decimals1: u8,
) -> Result<U256, Error> {
    if sqrt_price_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }

    let price = if sqrt_price_x96 < Q128 {
        mul_div(sqrt_price_x96 * sqrt_price_x96, PRICE_PRECISION, Q192)?
    } else {
        let price_x128 = mul_div(sqrt_price_x96, sqrt_price_x96, Q64)?;
        mul_div(price_x128, PRICE_PRECISION, Q128)?
    };

    if decimals0 >= decimals1 {
        let scale = pow10(decimals0 - decimals1)?;
        price
            .checked_mul(scale)
            .ok_or_else(|| MathError::Overflow.into())
    } else {
        let scale = pow10(decimals1 - decimals0)?;
        Ok(price / scale)
    }
}

/// Price of raw token0 units in raw token1 units, the form the range
/// sizer compares idle balances with.
#[inline]
pub fn raw_price_from_sqrt_price(sqrt_price_x96: U256) -> Result<U256, Error> {
    price_from_sqrt_price(sqrt_price_x96, 0, 0)
}

/// Values `amount0` in token1 terms at `price`, truncating.
#[inline]
pub fn value_in_token1(amount0: U256, price: U256) -> Result<U256, MathError> {
    if amount0.is_zero() {
        return Ok(U256::ZERO);
    }
    mul_div(amount0, price, PRICE_PRECISION)
}

fn pow10(exponent: u8) -> Result<U256, MathError> {
    U256_TEN
        .checked_pow(U256::from(exponent))
        .ok_or(MathError::Overflow)
}
