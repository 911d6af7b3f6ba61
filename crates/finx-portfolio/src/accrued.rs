//! Accrued interest and dirty price reconstruction.
//!
//! Accrual is linear in calendar days across the coupon period. Once the
//! record date has passed the buyer is no longer entitled to the coupon, so
//! the accrued amount turns negative and winds back to the period end.

use finx_core::types::{CashflowSchedule, Date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, PortfolioResult};

/// A quoted clean price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanPrice {
    /// Quote date.
    pub date: Date,
    /// Clean price.
    pub price: Decimal,
}

/// A clean price with its accrued interest added back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirtyPrice {
    /// Quote date.
    pub date: Date,
    /// Clean price as quoted.
    pub clean_price: Decimal,
    /// Accrued interest at the quote date.
    pub accrued_interest: Decimal,
    /// `clean_price + accrued_interest`.
    pub dirty_price: Decimal,
}

fn check_within(argument: &str, date: Date, start: Date, end: Date) -> PortfolioResult<()> {
    if date < start || date > end {
        return Err(PortfolioError::invalid_input(
            argument,
            format!("{date} is outside the coupon period {start} to {end}"),
        ));
    }
    Ok(())
}

/// Interest accrued on `coupon_amount` at `pricing_date`.
///
/// After the record date the negative accrued interest is returned, with
/// the ex-date taken as the day after the record date.
///
/// # Errors
///
/// - `InvalidInput` if `pricing_date` or `record_date` lies outside
///   `[period_start, period_end]`
/// - `CalculationFailed` if the period has no length
///
/// # Example
///
/// ```rust
/// use finx_core::types::Date;
/// use finx_portfolio::accrued::accrued_interest;
/// use rust_decimal_macros::dec;
///
/// let d = |s: &str| Date::parse(s).unwrap();
/// let accrued = accrued_interest(d("2000-04-01"), d("2000-01-01"), d("2000-07-01"), d("2000-06-23"), dec!(3)).unwrap();
/// assert_eq!(accrued, dec!(1.5));
/// ```
pub fn accrued_interest(
    pricing_date: Date,
    period_start: Date,
    period_end: Date,
    record_date: Date,
    coupon_amount: Decimal,
) -> PortfolioResult<Decimal> {
    check_within("pricing_date", pricing_date, period_start, period_end)?;
    check_within("record_date", record_date, period_start, period_end)?;

    if pricing_date > record_date {
        return negative_accrued_interest(
            pricing_date,
            period_start,
            period_end,
            record_date.add_days(1),
            coupon_amount,
        );
    }

    let period_days = Decimal::from(period_start.days_between(&period_end));
    if period_days.is_zero() {
        return Err(PortfolioError::calculation_failed(format!(
            "coupon period starting {period_start} has no length"
        )));
    }
    let accrued_days = Decimal::from(period_start.days_between(&pricing_date));
    Ok(accrued_days * coupon_amount / period_days)
}

/// Negative accrued interest for a holder priced inside the ex-coupon period.
///
/// The daily amount spreads the coupon over the period's days inclusive of
/// both ends. The full ex-period is owed back and each day already elapsed
/// since `ex_date` reduces that.
///
/// # Errors
///
/// Returns `CalculationFailed` if the period end precedes its start.
pub fn negative_accrued_interest(
    pricing_date: Date,
    period_start: Date,
    period_end: Date,
    ex_date: Date,
    coupon_amount: Decimal,
) -> PortfolioResult<Decimal> {
    let period_days = period_start.days_between(&period_end) + 1;
    if period_days <= 0 {
        return Err(PortfolioError::calculation_failed(format!(
            "coupon period {period_start} to {period_end} is reversed"
        )));
    }
    let daily = coupon_amount / Decimal::from(period_days);
    let ex_period_days = Decimal::from(ex_date.days_between(&period_end) + 1);
    let elapsed = Decimal::from(ex_date.days_between(&pricing_date));

    Ok(-ex_period_days * daily + elapsed * daily)
}

/// Adds accrued interest to each clean price.
///
/// The first coupon period runs from `issue_date` to the first payment
/// date; each later period runs from the previous payment date to the next.
/// A price on a shared boundary belongs to the earlier period.
///
/// # Errors
///
/// - `EmptyInput` if `clean_prices` or `schedule` is empty
/// - `CalculationFailed` if a price falls outside every coupon period
pub fn dirty_price_history(
    issue_date: Date,
    clean_prices: &[CleanPrice],
    schedule: &CashflowSchedule,
) -> PortfolioResult<Vec<DirtyPrice>> {
    if clean_prices.is_empty() {
        return Err(PortfolioError::empty_input("clean_prices"));
    }
    if schedule.is_empty() {
        return Err(PortfolioError::empty_input("cashflows"));
    }

    let mut periods = Vec::with_capacity(schedule.len());
    let mut period_start = issue_date;
    for event in schedule.values() {
        periods.push((period_start, event));
        period_start = event.payment_date();
    }

    clean_prices
        .iter()
        .map(|quote| {
            let (start, event) = periods
                .iter()
                .find(|(start, event)| *start <= quote.date && quote.date <= event.payment_date())
                .ok_or_else(|| {
                    PortfolioError::calculation_failed(format!(
                        "price dated {} falls outside every coupon period",
                        quote.date
                    ))
                })?;
            let accrued = accrued_interest(
                quote.date,
                *start,
                event.payment_date(),
                event.record_date(),
                event.cashflow.coupon_interest.total_coupon_interest,
            )?;
            Ok(DirtyPrice {
                date: quote.date,
                clean_price: quote.price,
                accrued_interest: accrued,
                dirty_price: quote.price + accrued,
            })
        })
        .collect()
}
