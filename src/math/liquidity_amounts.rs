use crate::math::math_helpers::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::{
    Q96, RESOLUTION,
    error::{Error, MathError, StateError},
};
use alloy_primitives::U256;

/// Token0 amount spanned by `liquidity` between two sqrt prices,
/// optionally rounding up.
///
/// Ordering of the two prices does not matter.
pub fn get_amount_0_delta(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };

    if sqrt_ratio_a_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = sqrt_ratio_b_x96 - sqrt_ratio_a_x96;

    if round_up {
        Ok(div_rounding_up(
            mul_div_rounding_up(numerator1, numerator2, sqrt_ratio_b_x96)?,
            sqrt_ratio_a_x96,
        ))
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_ratio_b_x96)? / sqrt_ratio_a_x96)
    }
}

/// Token1 amount spanned by `liquidity` between two sqrt prices,
/// optionally rounding up.
pub fn get_amount_1_delta(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    } else {
        mul_div(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    }
}

fn to_liquidity(value: U256) -> Result<u128, MathError> {
    u128::try_from(value).map_err(|_| MathError::Overflow)
}

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

/// Largest liquidity that `amount0` of token0 can back between two sqrt
/// prices, rounding down.
pub fn get_liquidity_for_amount_0(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
) -> Result<u128, Error> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower == upper {
        return Ok(0);
    }
    if lower.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }

    let intermediate = mul_div(lower, upper, Q96)?;
    Ok(to_liquidity(mul_div(amount0, intermediate, upper - lower)?)?)
}

/// Largest liquidity that `amount1` of token1 can back between two sqrt
/// prices, rounding down.
pub fn get_liquidity_for_amount_1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount1: U256,
) -> Result<u128, Error> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower == upper {
        return Ok(0);
    }
    Ok(to_liquidity(mul_div(amount1, Q96, upper - lower)?)?)
}

/// Largest liquidity the given amounts can back for a range at the
/// current sqrt price.
///
/// Below the range only token0 counts, above it only token1, and inside it
/// the scarcer of the two sides bounds the result.
pub fn get_liquidity_for_amounts(
    sqrt_price_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128, Error> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_price_x96 <= lower {
        get_liquidity_for_amount_0(lower, upper, amount0)
    } else if sqrt_price_x96 < upper {
        scarcer(
            get_liquidity_for_amount_0(sqrt_price_x96, upper, amount0),
            get_liquidity_for_amount_1(lower, sqrt_price_x96, amount1),
        )
    } else {
        get_liquidity_for_amount_1(lower, upper, amount1)
    }
}

// A side whose liquidity overflows `u128` can never be the bound while the
// other side fits.
fn scarcer(liquidity0: Result<u128, Error>, liquidity1: Result<u128, Error>) -> Result<u128, Error> {
    match (liquidity0, liquidity1) {
        (Ok(a), Ok(b)) => Ok(a.min(b)),
        (Ok(a), Err(Error::MathError(MathError::Overflow))) => Ok(a),
        (Err(Error::MathError(MathError::Overflow)), Ok(b)) => Ok(b),
        (Err(err), _) | (_, Err(err)) => Err(err),
    }
}

/// Token amounts held by `liquidity` in a range at the current sqrt
/// price, rounding down.
pub fn get_amounts_for_liquidity(
    sqrt_price_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
) -> Result<(U256, U256), Error> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if liquidity == 0 {
        return Ok((U256::ZERO, U256::ZERO));
    }

    if sqrt_price_x96 <= lower {
        Ok((get_amount_0_delta(lower, upper, liquidity, false)?, U256::ZERO))
    } else if sqrt_price_x96 < upper {
        Ok((
            get_amount_0_delta(sqrt_price_x96, upper, liquidity, false)?,
            get_amount_1_delta(lower, sqrt_price_x96, liquidity, false)?,
        ))
    } else {
        Ok((U256::ZERO, get_amount_1_delta(lower, upper, liquidity, false)?))
    }
}
