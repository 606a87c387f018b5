use crate::error::StateError;
use crate::math::bit_math::most_significant_bit;
use crate::{U256_127, U256_128};
use alloy_primitives::{I256, U256};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

pub const SQRT_10001: I256 = I256::from_raw(U256::from_limbs([11745905768312294533, 13863, 0, 0]));
pub const TICK_LOW: I256 = I256::from_raw(U256::from_limbs([
    6552757943157144234,
    184476617836266586,
    0,
    0,
]));
pub const TICK_HIGH: I256 = I256::from_raw(U256::from_limbs([
    4998474450511881007,
    15793544031827761793,
    0,
    0,
]));

/// Returns the sqrt price (Q64.96 fixed‑point) at a given tick index, or
/// `StateError::TickOutOfBounds` if `|tick|` exceeds `MAX_TICK`.
///
/// Each set bit of `|tick|` multiplies in a Q128.128 power of
/// `1.0001^(-2^i / 2)`; positive ticks are inverted, and the final shift
/// to Q96 rounds up whenever any of the dropped 32 bits are set. The
/// constant table is fixed, so results are bit-for-bit reproducible.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();

    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::TickOutOfBounds);
    }

    // Start with ratio based on bit 0
    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    macro_rules! apply_multiplier {
        ($bit:expr, $l0:expr, $l1:expr) => {
            if abs_tick & $bit != 0 {
                ratio = ratio.wrapping_mul(U256::from_limbs([$l0, $l1, 0, 0])) >> 128;
            }
        };
    }

    apply_multiplier!(2, 6459403834229662010, 18444899583751176498);
    apply_multiplier!(4, 17226890335427755468, 18443055278223354162);
    apply_multiplier!(8, 2032852871939366096, 18439367220385604838);
    apply_multiplier!(16, 14545316742740207172, 18431993317065449817);
    apply_multiplier!(32, 5129152022828963008, 18417254355718160513);
    apply_multiplier!(64, 4894419605888772193, 18387811781193591352);
    apply_multiplier!(128, 1280255884321894483, 18329067761203520168);
    apply_multiplier!(256, 15924666964335305636, 18212142134806087854);
    apply_multiplier!(512, 8010504389359918676, 17980523815641551639);
    apply_multiplier!(1024, 10668036004952895731, 17526086738831147013);
    apply_multiplier!(2048, 4878133418470705625, 16651378430235024244);
    apply_multiplier!(4096, 9537173718739605541, 15030750278693429944);
    apply_multiplier!(8192, 9972618978014552549, 12247334978882834399);
    apply_multiplier!(16384, 10428997489610666743, 8131365268884726200);
    apply_multiplier!(32768, 9305304367709015974, 3584323654723342297);
    apply_multiplier!(65536, 14301143598189091785, 696457651847595233);
    apply_multiplier!(131072, 7393154844743099908, 26294789957452057);
    apply_multiplier!(262144, 2209338891292245656, 37481735321082);
    apply_multiplier!(524288, 10518117631919034274, 76158723);

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    let lower_32_bits = (ratio.as_limbs()[0] & 0xFFFF_FFFF) as u32;
    Ok((ratio >> 32) + U256::from((lower_32_bits != 0) as u64))
}

const SHIFT_32: usize = 32;
const SHIFT_128: usize = 128;

/// Computes the greatest tick whose sqrt ratio is less than or equal to
/// `sqrt_price_x_96` (Q64.96 fixed‑point).
///
/// Inputs outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)` fail with
/// `StateError::SqrtPriceOutOfBounds`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x_96: U256) -> Result<i32, StateError> {
    if sqrt_price_x_96 < MIN_SQRT_RATIO || sqrt_price_x_96 >= MAX_SQRT_RATIO {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    let ratio = sqrt_price_x_96 << SHIFT_32;
    let msb = most_significant_bit(ratio).map_err(|_| StateError::SqrtPriceIsZero)? as u32;

    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2: I256 = (I256::from_raw(U256::from(msb)) - I256::from_raw(U256_128)) << 64;

    macro_rules! log2_step {
        ($shift:expr) => {{
            r = r.overflowing_mul(r).0 >> U256_127;
            let f = r >> SHIFT_128;
            log_2 |= I256::from_raw(f << $shift);
            r >>= f;
        }};
    }

    log2_step!(63);
    log2_step!(62);
    log2_step!(61);
    log2_step!(60);
    log2_step!(59);
    log2_step!(58);
    log2_step!(57);
    log2_step!(56);
    log2_step!(55);
    log2_step!(54);
    log2_step!(53);
    log2_step!(52);
    log2_step!(51);
    log2_step!(50);

    let log_sqrt10001 = log_2.wrapping_mul(SQRT_10001);
    let tick_low = ((log_sqrt10001 - TICK_LOW) >> SHIFT_128).low_i32();
    let tick_high = ((log_sqrt10001 + TICK_HIGH) >> SHIFT_128).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x_96 {
        tick_high
    } else {
        tick_low
    })
}

/// Rounds `tick` down to the nearest multiple of `tick_spacing`, toward
/// negative infinity.
///
/// `-5` with spacing `10` floors to `-10`, not `0`.
pub fn floor_to_spacing(tick: i32, tick_spacing: i32) -> Result<i32, StateError> {
    if tick_spacing <= 0 {
        return Err(StateError::InvalidSpacing(tick_spacing));
    }
    Ok(tick.div_euclid(tick_spacing) * tick_spacing)
}

/// Returns `(floor - half_width, floor + half_width)` where `floor` is
/// `tick` rounded down to `tick_spacing`.
///
/// Boundaries outside `[MIN_TICK, MAX_TICK]` are an error rather than
/// being clamped, so a returned range can always be priced.
pub fn symmetric_range(
    tick: i32,
    tick_spacing: i32,
    half_width: i32,
) -> Result<(i32, i32), StateError> {
    let base = floor_to_spacing(tick, tick_spacing)?;
    if half_width <= 0 {
        return Err(StateError::InvalidRange {
            tick_lower: base,
            tick_upper: base,
        });
    }

    let lower = base
        .checked_sub(half_width)
        .ok_or(StateError::TickOutOfBounds)?;
    let upper = base
        .checked_add(half_width)
        .ok_or(StateError::TickOutOfBounds)?;

    check_ticks(lower, upper)?;
    Ok((lower, upper))
}

/// Checks that `lower < upper` and both lie inside the tick bounds.
pub fn check_ticks(tick_lower: i32, tick_upper: i32) -> Result<(), StateError> {
    if tick_lower >= tick_upper {
        return Err(StateError::InvalidRange {
            tick_lower,
            tick_upper,
        });
    }
    if tick_lower < MIN_TICK || tick_upper > MAX_TICK {
        return Err(StateError::TickOutOfBounds);
    }
    Ok(())
}
