//! Shared fixtures for unit tests.

use finx_core::types::{CashflowEvent, CashflowSchedule, Currency, Date, PriceRecord, Side, Trade};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::cashflows::SecurityCashflows;
use crate::holdings::{HoldingsIndex, HoldingsSnapshot};
use crate::pricing::PriceHistory;

pub(crate) const BOND_A: &str = "XS1234567890";
pub(crate) const BOND_B: &str = "XS0987654321";

pub(crate) fn d(s: &str) -> Date {
    Date::parse(s).unwrap()
}

fn trade(settle: &str, isin: &str, side: Side, volume: Decimal, price: Decimal) -> Trade {
    let settlement_date = d(settle);
    Trade::new(settlement_date.add_days(-2), settlement_date, isin, side, volume, price).unwrap()
}

/// Buy A, buy B, sell B out in two lots, then halve A.
pub(crate) fn reference_trades() -> Vec<Trade> {
    vec![
        trade("2000-01-03", BOND_A, Side::Buy, dec!(100000), dec!(101.50)),
        trade("2000-02-03", BOND_B, Side::Buy, dec!(100000), dec!(100.50)),
        trade("2000-04-02", BOND_B, Side::Sell, dec!(50000), dec!(101.50)),
        trade("2000-04-02", BOND_B, Side::Sell, dec!(50000), dec!(101.50)),
        trade("2000-07-02", BOND_A, Side::Sell, dec!(50000), dec!(100.50)),
    ]
}

pub(crate) fn reference_holdings() -> HoldingsIndex {
    [
        HoldingsSnapshot::new(d("2000-01-03"), [(BOND_A, dec!(100000))]),
        HoldingsSnapshot::new(d("2000-02-03"), [(BOND_A, dec!(100000)), (BOND_B, dec!(100000))]),
        HoldingsSnapshot::new(d("2000-04-02"), [(BOND_A, dec!(100000)), (BOND_B, dec!(0))]),
        HoldingsSnapshot::new(d("2000-07-02"), [(BOND_A, dec!(50000)), (BOND_B, dec!(0))]),
    ]
    .into_iter()
    .map(|snapshot| (snapshot.date, snapshot))
    .collect()
}

/// A prices in AUD, B in USD, with a gap before B's first quote.
pub(crate) fn reference_prices() -> PriceHistory {
    let mut history = PriceHistory::new();
    for (date, value) in [
        ("2000-01-01", dec!(101.50)),
        ("2000-02-01", dec!(101.00)),
        ("2000-04-01", dec!(101.25)),
        ("2000-07-01", dec!(100.50)),
    ] {
        history.insert(BOND_A, PriceRecord::new(d(date), Currency::AUD, value));
    }
    for (date, value) in [
        ("2000-02-02", dec!(100.50)),
        ("2000-04-01", dec!(101.50)),
        ("2000-07-01", dec!(101.00)),
    ] {
        history.insert(BOND_B, PriceRecord::new(d(date), Currency::USD, value));
    }
    history
}

/// Quarterly coupons with ex-dates one week before payment.
pub(crate) fn quarterly_schedule(coupon: Decimal) -> CashflowSchedule {
    ["2000-03-01", "2000-06-01", "2000-09-01", "2000-12-01"]
        .into_iter()
        .map(|payment| {
            let payment = d(payment);
            let event = CashflowEvent::coupon(payment, payment.add_days(-8), payment.add_days(-7), coupon, dec!(0));
            (payment, event)
        })
        .collect()
}

pub(crate) fn reference_schedules() -> SecurityCashflows {
    [
        (BOND_A.to_string(), quarterly_schedule(dec!(1.25))),
        (BOND_B.to_string(), quarterly_schedule(dec!(1.5))),
    ]
    .into_iter()
    .collect()
}
