//! Scheduled security cashflows.
//!
//! A [`CashflowEvent`] is one payment from a security's lifetime schedule,
//! expressed per 100 units of face. Scaling to a holder's position is a pure
//! function returning a new event, so a shared schedule can be attributed to
//! any number of holdings without being altered.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Date;
use crate::error::{FinxError, FinxResult};

/// A security's lifetime schedule keyed by payment date.
pub type CashflowSchedule = BTreeMap<Date, CashflowEvent>;

/// Entitlement dates of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowDates {
    /// Date the payment is made.
    pub payment_date: Date,
    /// Date the issuer uses to identify the registered holder.
    pub record_date: Date,
    /// First date on which a buyer no longer receives the payment.
    pub ex_date: Date,
}

/// Coupon components of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CouponInterest {
    /// Fixed-rate part of the coupon.
    pub fixed_coupon_interest_component: Decimal,
    /// Variable-rate part of the coupon.
    pub variable_coupon_interest_component: Decimal,
    /// Total coupon.
    pub total_coupon_interest: Decimal,
}

/// Principal components of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Principal {
    /// Principal redeemed at maturity.
    pub redemption_principal: Decimal,
    /// Principal repaid through amortisation.
    pub amortising: Decimal,
    /// Total principal.
    pub total_principal: Decimal,
}

/// Amounts of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CashflowAmounts {
    /// Total payment (coupon + principal).
    pub total: Decimal,
    /// Coupon breakdown.
    pub coupon_interest: CouponInterest,
    /// Principal breakdown.
    pub principal: Principal,
}

impl CashflowAmounts {
    /// Multiplies every amount by `factor`.
    ///
    /// # Errors
    ///
    /// Returns `FinxError::MathError` if any scaled amount overflows.
    pub fn scaled(&self, factor: Decimal) -> FinxResult<Self> {
        let scale = |amount: Decimal| {
            amount.checked_mul(factor).ok_or_else(|| {
                FinxError::math_error(format!("{amount} scaled by {factor} overflows"))
            })
        };
        Ok(Self {
            total: scale(self.total)?,
            coupon_interest: CouponInterest {
                fixed_coupon_interest_component: scale(
                    self.coupon_interest.fixed_coupon_interest_component,
                )?,
                variable_coupon_interest_component: scale(
                    self.coupon_interest.variable_coupon_interest_component,
                )?,
                total_coupon_interest: scale(self.coupon_interest.total_coupon_interest)?,
            },
            principal: Principal {
                redemption_principal: scale(self.principal.redemption_principal)?,
                amortising: scale(self.principal.amortising)?,
                total_principal: scale(self.principal.total_principal)?,
            },
        })
    }
}

/// One scheduled payment of a security.
///
/// # Example
///
/// ```rust
/// use finx_core::types::{CashflowEvent, Date};
/// use rust_decimal_macros::dec;
///
/// let event = CashflowEvent::coupon(
///     Date::parse("2000-02-01").unwrap(),
///     Date::parse("2000-01-24").unwrap(),
///     Date::parse("2000-01-23").unwrap(),
///     dec!(2.5),
///     dec!(0),
/// );
/// let held = event.scaled_to_volume(dec!(100000)).unwrap();
/// assert_eq!(held.cashflow.total, dec!(2500));
/// assert_eq!(event.cashflow.total, dec!(2.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowEvent {
    /// Entitlement dates.
    pub date: CashflowDates,
    /// Payment amounts.
    pub cashflow: CashflowAmounts,
}

impl CashflowEvent {
    /// Creates an event from its dates and amounts.
    #[must_use]
    pub fn new(date: CashflowDates, cashflow: CashflowAmounts) -> Self {
        Self { date, cashflow }
    }

    /// Creates a coupon-only payment.
    #[must_use]
    pub fn coupon(
        payment_date: Date,
        record_date: Date,
        ex_date: Date,
        fixed: Decimal,
        variable: Decimal,
    ) -> Self {
        let total_coupon = fixed + variable;
        Self {
            date: CashflowDates {
                payment_date,
                record_date,
                ex_date,
            },
            cashflow: CashflowAmounts {
                total: total_coupon,
                coupon_interest: CouponInterest {
                    fixed_coupon_interest_component: fixed,
                    variable_coupon_interest_component: variable,
                    total_coupon_interest: total_coupon,
                },
                principal: Principal::default(),
            },
        }
    }

    /// Adds principal to the payment, updating the totals.
    #[must_use]
    pub fn with_principal(mut self, redemption: Decimal, amortising: Decimal) -> Self {
        let total_principal = redemption + amortising;
        self.cashflow.principal = Principal {
            redemption_principal: redemption,
            amortising,
            total_principal,
        };
        self.cashflow.total = self.cashflow.coupon_interest.total_coupon_interest + total_principal;
        self
    }

    /// Returns the payment date.
    #[must_use]
    pub fn payment_date(&self) -> Date {
        self.date.payment_date
    }

    /// Returns the ex-date.
    #[must_use]
    pub fn ex_date(&self) -> Date {
        self.date.ex_date
    }

    /// Returns the record date.
    #[must_use]
    pub fn record_date(&self) -> Date {
        self.date.record_date
    }

    /// Returns a copy with every amount multiplied by `factor`.
    ///
    /// # Errors
    ///
    /// Returns `FinxError::MathError` if any scaled amount overflows.
    pub fn scaled(&self, factor: Decimal) -> FinxResult<Self> {
        Ok(Self {
            date: self.date,
            cashflow: self.cashflow.scaled(factor)?,
        })
    }

    /// Returns a copy scaled from per-100-face to a holding of `volume` face.
    ///
    /// # Errors
    ///
    /// Returns `FinxError::MathError` if any scaled amount overflows.
    pub fn scaled_to_volume(&self, volume: Decimal) -> FinxResult<Self> {
        self.scaled(volume / Decimal::ONE_HUNDRED)
    }

    /// Checks that the entitlement dates are ordered.
    ///
    /// # Errors
    ///
    /// Returns `FinxError::InvalidCashflow` if the ex-date or record date
    /// falls after the payment date.
    pub fn validate(&self) -> FinxResult<()> {
        if self.date.ex_date > self.date.payment_date {
            return Err(FinxError::invalid_cashflow(format!(
                "ex_date {} is after payment_date {}",
                self.date.ex_date, self.date.payment_date
            )));
        }
        if self.date.record_date > self.date.payment_date {
            return Err(FinxError::invalid_cashflow(format!(
                "record_date {} is after payment_date {}",
                self.date.record_date, self.date.payment_date
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CashflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (ex {})",
            self.date.payment_date, self.cashflow.total, self.date.ex_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn redemption_event() -> CashflowEvent {
        CashflowEvent::coupon(d("2001-01-01"), d("2000-12-24"), d("2000-12-23"), dec!(2), dec!(0.5))
            .with_principal(dec!(80), dec!(20))
    }

    #[test]
    fn test_totals() {
        let event = redemption_event();
        assert_eq!(event.cashflow.coupon_interest.total_coupon_interest, dec!(2.5));
        assert_eq!(event.cashflow.principal.total_principal, dec!(100));
        assert_eq!(event.cashflow.total, dec!(102.5));
    }

    #[test]
    fn test_scaling_touches_every_component() {
        let event = redemption_event();
        let held = event.scaled_to_volume(dec!(50000)).unwrap();

        assert_eq!(held.cashflow.total, dec!(51250));
        assert_eq!(held.cashflow.coupon_interest.fixed_coupon_interest_component, dec!(1000));
        assert_eq!(held.cashflow.coupon_interest.variable_coupon_interest_component, dec!(250));
        assert_eq!(held.cashflow.coupon_interest.total_coupon_interest, dec!(1250));
        assert_eq!(held.cashflow.principal.redemption_principal, dec!(40000));
        assert_eq!(held.cashflow.principal.amortising, dec!(10000));
        assert_eq!(held.cashflow.principal.total_principal, dec!(50000));
        assert_eq!(held.date, event.date);
    }

    #[test]
    fn test_scaling_leaves_source_untouched() {
        let event = redemption_event();
        let before = event;
        let _ = event.scaled_to_volume(dec!(1_000_000));
        let _ = event.scaled_to_volume(dec!(1_000_000));
        assert_eq!(event, before);
    }

    #[test]
    fn test_scaling_overflow_is_an_error() {
        let event = redemption_event();
        assert!(matches!(
            event.scaled_to_volume(Decimal::MAX),
            Err(FinxError::MathError { .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(redemption_event().validate().is_ok());
        let bad = CashflowEvent::coupon(d("2000-01-01"), d("2000-01-02"), d("1999-12-30"), dec!(1), dec!(0));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let json = r#"{
            "date": {"payment_date": "2000-02-01", "record_date": "2000-01-24", "ex_date": "2000-01-23"},
            "cashflow": {
                "total": 0.4,
                "coupon_interest": {
                    "fixed_coupon_interest_component": 0.4,
                    "variable_coupon_interest_component": 0.0,
                    "total_coupon_interest": 0.4
                },
                "principal": {"redemption_principal": 0.0, "amortising": 0.0, "total_principal": 0.0}
            }
        }"#;
        let event: CashflowEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.ex_date(), d("2000-01-23"));
        assert_eq!(event.cashflow.total, dec!(0.4));
    }
}
