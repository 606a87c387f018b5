#![allow(dead_code)]

use clmm_range_strategy::U256;
use clmm_range_strategy::math::liquidity_amounts::{
    get_amounts_for_liquidity, get_liquidity_for_amounts,
};
use clmm_range_strategy::math::price_math::{PRICE_PRECISION, raw_price_from_sqrt_price};
use clmm_range_strategy::math::tick_math::{
    MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, symmetric_range,
};
use clmm_range_strategy::strategy::calm_guard;
use clmm_range_strategy::strategy::range_sizer::compute_ranges;
use criterion::{BenchmarkId, Criterion, black_box};

const TICKS: [i32; 5] = [MIN_TICK, -120_000, 0, 1_000, MAX_TICK];

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");

    for tick in TICKS {
        group.bench_with_input(
            BenchmarkId::new("get_sqrt_ratio_at_tick", tick),
            &tick,
            |b, &tick| b.iter(|| get_sqrt_ratio_at_tick(black_box(tick))),
        );
    }

    for tick in TICKS {
        let sqrt_price = get_sqrt_ratio_at_tick(tick).unwrap();
        group.bench_with_input(
            BenchmarkId::new("get_tick_at_sqrt_ratio", tick),
            &sqrt_price,
            |b, &sqrt_price| b.iter(|| get_tick_at_sqrt_ratio(black_box(sqrt_price))),
        );
    }

    group.bench_function("symmetric_range", |b| {
        b.iter(|| symmetric_range(black_box(-4_321), black_box(60), black_box(1_200)))
    });

    group.finish();
}

pub fn bench_price_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_math");

    for tick in [-120_000, 0, 1_000] {
        let sqrt_price = get_sqrt_ratio_at_tick(tick).unwrap();
        group.bench_with_input(
            BenchmarkId::new("raw_price_from_sqrt_price", tick),
            &sqrt_price,
            |b, &sqrt_price| b.iter(|| raw_price_from_sqrt_price(black_box(sqrt_price))),
        );
    }

    group.finish();
}

pub fn bench_liquidity_amounts(c: &mut Criterion) {
    let mut group = c.benchmark_group("liquidity_amounts");

    let sqrt_price = get_sqrt_ratio_at_tick(1_000).unwrap();
    let lower = get_sqrt_ratio_at_tick(800).unwrap();
    let upper = get_sqrt_ratio_at_tick(1_200).unwrap();
    let amount = U256::from(1_000_000_000_000_000_000u64);

    group.bench_function("get_liquidity_for_amounts", |b| {
        b.iter(|| {
            get_liquidity_for_amounts(
                black_box(sqrt_price),
                black_box(lower),
                black_box(upper),
                black_box(amount),
                black_box(amount),
            )
        })
    });

    let liquidity = get_liquidity_for_amounts(sqrt_price, lower, upper, amount, amount).unwrap();
    group.bench_function("get_amounts_for_liquidity", |b| {
        b.iter(|| {
            get_amounts_for_liquidity(
                black_box(sqrt_price),
                black_box(lower),
                black_box(upper),
                black_box(liquidity),
            )
        })
    });

    group.finish();
}

pub fn bench_range_sizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_sizer");

    let idle0 = U256::from(3_000_000u64);
    let idle1 = U256::from(5_000_000u64);
    for (tick, spacing, width) in [(1_000, 10, 200), (-200_000, 60, 3_000), (50_000, 200, 4_000)] {
        group.bench_with_input(
            BenchmarkId::new("compute_ranges", format!("{tick}/{spacing}/{width}")),
            &(tick, spacing, width),
            |b, &(tick, spacing, width)| {
                b.iter(|| {
                    compute_ranges(
                        black_box(tick),
                        black_box(spacing),
                        black_box(width),
                        black_box(idle0),
                        black_box(idle1),
                        black_box(PRICE_PRECISION),
                    )
                })
            },
        );
    }

    group.bench_function("calm_guard::evaluate", |b| {
        b.iter(|| calm_guard::evaluate(black_box(1_051), black_box(Some(1_000)), black_box(50)))
    });

    group.finish();
}
