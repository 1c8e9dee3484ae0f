//! Criterion benchmarks for the simulation hot paths.
//!
//! Benchmarks:
//! 1. Bar loop (advance_time across a long bar sequence)
//! 2. Order churn (create, create/cancel cycles)
//! 3. Precision arithmetic throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use simex_core::domain::{Bar, OrderSide, OrderType};
use simex_core::engine::{Exchange, ExchangeConfig};
use simex_core::precision::{divide_truncated, multiply_truncated, truncate, DEFAULT_PRECISION};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = 9900.0 + (i as f64 * 0.1).sin() * 50.0;
            Bar {
                time: 1_569_160_500_000 + 300_000 * i as i64,
                open: close - 3.0,
                high: close + 15.0,
                low: close - 15.0,
                close,
                volume: 10.0 + (i % 37) as f64,
            }
        })
        .collect()
}

fn config() -> ExchangeConfig {
    ExchangeConfig::new(1.0, 20000.0, 0.00075)
}

// ── 1. Bar Loop ──────────────────────────────────────────────────────

fn bench_bar_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("bar_loop");

    for &bar_count in &[1_000, 10_000, 50_000] {
        let bars = make_bars(bar_count);

        group.bench_with_input(BenchmarkId::new("no_orders", bar_count), &bar_count, |b, _| {
            b.iter(|| {
                let mut exchange = Exchange::new(config());
                for bar in &bars {
                    exchange.advance_time(black_box(bar));
                }
                black_box(&exchange);
            });
        });

        // 100 resting sells priced far above the tape: every bar walks the
        // full order collection without a single fill.
        group.bench_with_input(
            BenchmarkId::new("100_resting_orders", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| {
                    let mut exchange = Exchange::new(config());
                    for _ in 0..100 {
                        exchange
                            .create_order(OrderSide::Sell, OrderType::Limit, 50000.0, 0.005)
                            .unwrap();
                    }
                    for bar in &bars {
                        exchange.advance_time(black_box(bar));
                    }
                    black_box(&exchange);
                });
            },
        );
    }

    group.finish();
}

// ── 2. Order Churn ───────────────────────────────────────────────────

fn bench_order_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_churn");

    group.bench_function("create_1000", |b| {
        b.iter(|| {
            let mut exchange = Exchange::new(ExchangeConfig::new(1000.0, 1e9, 0.00075));
            for _ in 0..1000 {
                exchange
                    .create_order(OrderSide::Buy, OrderType::Limit, 9900.0, 0.01)
                    .unwrap();
            }
            black_box(&exchange);
        });
    });

    group.bench_function("create_cancel_500_pairs", |b| {
        b.iter(|| {
            let mut exchange = Exchange::new(ExchangeConfig::new(1000.0, 1e9, 0.00075));
            for _ in 0..500 {
                let order = exchange
                    .create_order(OrderSide::Sell, OrderType::Limit, 50000.0, 0.5)
                    .unwrap();
                exchange.cancel_order(order.id).unwrap();
            }
            black_box(&exchange);
        });
    });

    group.finish();
}

// ── 3. Precision Arithmetic ──────────────────────────────────────────

fn bench_precision(c: &mut Criterion) {
    let mut group = c.benchmark_group("precision");

    let values: Vec<f64> = (0..1000)
        .map(|i| 9900.0 + (i as f64 * 0.1).sin() * 50.0 + i as f64 * 1e-7)
        .collect();
    let pairs: Vec<(f64, f64)> = values
        .iter()
        .zip(values.iter().rev())
        .map(|(&a, &b)| (a, b * 1e-4))
        .collect();

    group.bench_function("truncate_1000", |b| {
        b.iter(|| {
            for &v in &values {
                black_box(truncate(black_box(v), DEFAULT_PRECISION));
            }
        });
    });

    group.bench_function("multiply_truncated_1000", |b| {
        b.iter(|| {
            for &(x, y) in &pairs {
                black_box(multiply_truncated(black_box(x), black_box(y), DEFAULT_PRECISION));
            }
        });
    });

    group.bench_function("divide_truncated_1000", |b| {
        b.iter(|| {
            for &(x, y) in &pairs {
                let _ = black_box(divide_truncated(black_box(x), black_box(y), DEFAULT_PRECISION));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_bar_loop, bench_order_churn, bench_precision);
criterion_main!(benches);
