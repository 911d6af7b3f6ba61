//! Benchmarks for the finx-portfolio pipeline.
//!
//! Run with: cargo bench -p finx-portfolio

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finx_portfolio::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn base_date() -> Date {
    Date::from_ymd(2020, 1, 2).unwrap()
}

fn isin(id: usize) -> String {
    format!("XS{id:010}")
}

/// Deterministic blotter: one buy per security, then a sell every few weeks.
fn create_blotter(securities: usize, trades: usize) -> Vec<Trade> {
    (0..trades)
        .map(|i| {
            let security = i % securities;
            let settle = base_date().add_days((i / securities) as i64 * 7);
            let side = if i < securities || i % 3 != 0 { Side::Buy } else { Side::Sell };
            let price = Decimal::new(9_500 + (i as i64 * 37) % 1_000, 2);
            Trade::new(settle - 2, settle, isin(security), side, dec!(10000), price).unwrap()
        })
        .collect()
}

fn create_prices(securities: usize, days: i64) -> PriceHistory {
    let mut history = PriceHistory::new();
    for security in 0..securities {
        let currency = if security % 2 == 0 { Currency::USD } else { Currency::EUR };
        for day in (0..days).step_by(7) {
            let cents = 9_800 + ((security as i64 * 13 + day) % 400);
            history.insert(
                isin(security),
                PriceRecord::new(base_date().add_days(day - 1), currency, Decimal::new(cents, 2)),
            );
        }
    }
    history
}

fn create_schedules(securities: usize) -> SecurityCashflows {
    (0..securities)
        .map(|security| {
            let schedule = (1..=8)
                .map(|q| {
                    let payment = base_date().add_months(q * 3).unwrap();
                    let event = CashflowEvent::coupon(payment, payment - 8, payment - 7, dec!(1.125), dec!(0));
                    (payment, event)
                })
                .collect();
            (isin(security), schedule)
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_holdings(c: &mut Criterion) {
    let mut group = c.benchmark_group("holdings_from_trades");
    let config = EngineConfig::default();

    for trades in [100, 1_000, 10_000] {
        let blotter = create_blotter(50, trades);
        group.throughput(Throughput::Elements(trades as u64));
        group.bench_with_input(BenchmarkId::from_parameter(trades), &blotter, |b, blotter| {
            b.iter(|| holdings_from_trades(black_box(blotter), &config));
        });
    }
    group.finish();
}

fn bench_performance_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_performance_index");
    let config = EngineConfig::default();

    for securities in [10, 50] {
        let trades = create_blotter(securities, securities * 10);
        let holdings = holdings_from_trades(&trades, &config).unwrap();
        let prices = create_prices(securities, 400);
        let schedules = create_schedules(securities);
        let pricing_date = base_date().add_days(400);

        group.bench_with_input(BenchmarkId::from_parameter(securities), &securities, |b, _| {
            b.iter(|| {
                portfolio_performance_index(
                    black_box(pricing_date),
                    &trades,
                    &holdings,
                    &schedules,
                    &prices,
                    &config,
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_holdings, bench_performance_index);
criterion_main!(benches);
