//! Attribution of scheduled security cashflows to portfolio holdings.
//!
//! Schedules are quoted per 100 face. An attributed event is the scheduled
//! event scaled by `volume / 100` of the entitled holding; the shared
//! schedule is only borrowed.
//!
//! Two entitlement rules apply and deliberately differ at the boundaries:
//!
//! - **Future**: an event is owed to the current holder if it pays on or
//!   after the pricing date, unless the pricing date falls strictly inside
//!   its ex-coupon gap (`ex_date < pricing_date < payment_date`).
//! - **Historical**: an event is credited to the holding at `d_i` when its
//!   ex-date falls strictly between consecutive holdings dates
//!   `d_i < ex_date < d_{i+1}` and it was paid before the pricing date.

use std::collections::BTreeMap;

use finx_core::types::{CashflowEvent, CashflowSchedule, Date};
use tracing::debug;

use crate::error::{PortfolioError, PortfolioResult};
use crate::holdings::{HoldingsIndex, HoldingsSnapshot};

/// Per-100-face schedules keyed by security.
pub type SecurityCashflows = BTreeMap<String, CashflowSchedule>;

/// Scaled events keyed by payment date, then security.
pub type AttributedCashflows = BTreeMap<Date, BTreeMap<String, CashflowEvent>>;

/// Returns true if a holder at `pricing_date` is still owed `event`.
#[must_use]
pub fn is_future_entitled(event: &CashflowEvent, pricing_date: Date) -> bool {
    let in_ex_gap = event.ex_date() < pricing_date && pricing_date < event.payment_date();
    event.payment_date() >= pricing_date && !in_ex_gap
}

/// Returns true if `event` was earned over `(start, end)` and paid before `pricing_date`.
#[must_use]
pub fn is_historically_entitled(
    event: &CashflowEvent,
    start: Date,
    end: Date,
    pricing_date: Date,
) -> bool {
    start < event.ex_date() && event.ex_date() < end && event.payment_date() < pricing_date
}

fn check_inputs(snapshot_empty: bool, schedules: &SecurityCashflows) -> PortfolioResult<()> {
    if snapshot_empty {
        return Err(PortfolioError::empty_input("holdings"));
    }
    if schedules.is_empty() {
        return Err(PortfolioError::empty_input("cashflows"));
    }
    for event in schedules.values().flat_map(BTreeMap::values) {
        event.validate()?;
    }
    Ok(())
}

/// Cashflows still owed to the positions in `snapshot`.
///
/// The snapshot date is the pricing date. Only non-zero positions with a
/// schedule contribute; a position with no schedule is skipped.
///
/// # Errors
///
/// - `EmptyInput` naming `holdings` or `cashflows` if either is empty
/// - `Core(InvalidCashflow)` if a scheduled event has its ex-date or
///   record date after its payment date
/// - `Core(MathError)` if a scaled amount overflows
///
/// # Example
///
/// ```rust
/// use finx_core::types::{CashflowEvent, Date};
/// use finx_portfolio::cashflows::{portfolio_future_cashflows, SecurityCashflows};
/// use finx_portfolio::holdings::HoldingsSnapshot;
/// use rust_decimal_macros::dec;
///
/// let d = |s: &str| Date::parse(s).unwrap();
/// let event = CashflowEvent::coupon(d("2000-03-01"), d("2000-02-22"), d("2000-02-23"), dec!(1.25), dec!(0));
/// let schedules: SecurityCashflows =
///     [("A".to_string(), [(event.payment_date(), event)].into_iter().collect())].into_iter().collect();
/// let snapshot = HoldingsSnapshot::new(d("2000-01-03"), [("A", dec!(100000))]);
///
/// let future = portfolio_future_cashflows(&snapshot, &schedules).unwrap();
/// assert_eq!(future[&d("2000-03-01")]["A"].cashflow.total, dec!(1250));
/// ```
pub fn portfolio_future_cashflows(
    snapshot: &HoldingsSnapshot,
    schedules: &SecurityCashflows,
) -> PortfolioResult<AttributedCashflows> {
    check_inputs(snapshot.is_empty(), schedules)?;

    let pricing_date = snapshot.date;
    let mut attributed = AttributedCashflows::new();
    for (isin, holding) in snapshot.active() {
        let Some(schedule) = schedules.get(isin) else {
            debug!(%isin, "no cashflow schedule for held security");
            continue;
        };
        for event in schedule
            .values()
            .filter(|event| is_future_entitled(event, pricing_date))
        {
            attributed
                .entry(event.payment_date())
                .or_default()
                .insert(isin.clone(), event.scaled_to_volume(holding.volume)?);
        }
    }
    Ok(attributed)
}

/// Cashflows earned by `snapshot` between its date `start` and `end`.
///
/// # Errors
///
/// - `InvalidDateRange` if `start >= end`
/// - `EmptyInput` naming `holdings` or `cashflows` if either is empty
/// - `Core` if a schedule is malformed or a scaled amount overflows
pub fn historical_cashflows_for_period(
    pricing_date: Date,
    start: Date,
    end: Date,
    snapshot: &HoldingsSnapshot,
    schedules: &SecurityCashflows,
) -> PortfolioResult<AttributedCashflows> {
    if start >= end {
        return Err(PortfolioError::InvalidDateRange { start, end });
    }
    check_inputs(snapshot.is_empty(), schedules)?;

    let mut attributed = AttributedCashflows::new();
    for (isin, holding) in snapshot.active() {
        let Some(schedule) = schedules.get(isin) else {
            continue;
        };
        for event in schedule
            .values()
            .filter(|event| is_historically_entitled(event, start, end, pricing_date))
        {
            attributed
                .entry(event.payment_date())
                .or_default()
                .insert(isin.clone(), event.scaled_to_volume(holding.volume)?);
        }
    }
    Ok(attributed)
}

/// Cashflows earned across every consecutive pair of holdings dates.
///
/// # Errors
///
/// Returns `EmptyInput` naming `holdings` or `cashflows` if either is empty.
pub fn portfolio_historical_cashflows(
    pricing_date: Date,
    index: &HoldingsIndex,
    schedules: &SecurityCashflows,
) -> PortfolioResult<AttributedCashflows> {
    check_inputs(index.is_empty(), schedules)?;

    let mut attributed = AttributedCashflows::new();
    let snapshots: Vec<&HoldingsSnapshot> = index.values().collect();
    for pair in snapshots.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if start.is_empty() {
            continue;
        }
        let period =
            historical_cashflows_for_period(pricing_date, start.date, end.date, start, schedules)?;
        debug!(start = %start.date, end = %end.date, payments = period.len(), "attributed period cashflows");
        for (payment_date, by_security) in period {
            attributed.entry(payment_date).or_default().extend(by_security);
        }
    }
    Ok(attributed)
}
