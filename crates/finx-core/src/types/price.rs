//! Dated price quotes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{optional_code, Currency, Date};
use crate::error::{FinxError, FinxResult};

/// A dated price quote for one security.
///
/// `value` is quoted per `per_original_face_value` units of original face,
/// so a holding of `volume` face is worth
/// `volume × value / per_original_face_value`.
///
/// # Example
///
/// ```rust
/// use finx_core::types::{Currency, Date, PriceRecord};
/// use rust_decimal_macros::dec;
///
/// let price = PriceRecord::new(Date::parse("2000-01-03").unwrap(), Currency::AUD, dec!(101.50));
/// assert_eq!(price.per_original_face_value, dec!(100));
/// assert_eq!(price.value_of(dec!(100000)).unwrap(), dec!(101500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Quote date.
    pub date: Date,
    /// Quote currency; `None` only for the unavailable-price placeholder.
    #[serde(with = "optional_code")]
    pub currency: Option<Currency>,
    /// Face units the quote refers to (usually 100).
    pub per_original_face_value: Decimal,
    /// Conversion rate from the quote currency to the base currency.
    pub base_currency_conversion_rate: Decimal,
    /// Quoted price.
    pub value: Decimal,
}

impl PriceRecord {
    /// Creates a price quoted per 100 face with a conversion rate of 1.
    #[must_use]
    pub fn new(date: Date, currency: Currency, value: Decimal) -> Self {
        Self {
            date,
            currency: Some(currency),
            per_original_face_value: Decimal::ONE_HUNDRED,
            base_currency_conversion_rate: Decimal::ONE,
            value,
        }
    }

    /// Placeholder used when a held security has no quote on or before `date`.
    ///
    /// It carries no currency, a face basis of `-1` and a value of `0`, so it
    /// always values a position at exactly zero.
    #[must_use]
    pub fn unavailable(date: Date) -> Self {
        Self {
            date,
            currency: None,
            per_original_face_value: Decimal::NEGATIVE_ONE,
            base_currency_conversion_rate: Decimal::ONE,
            value: Decimal::ZERO,
        }
    }

    /// Sets the face basis of the quote.
    #[must_use]
    pub fn with_per_original_face_value(mut self, face: Decimal) -> Self {
        self.per_original_face_value = face;
        self
    }

    /// Value of `volume` face at this quote, in the quote currency.
    ///
    /// A zero face basis yields zero rather than dividing by zero.
    ///
    /// # Errors
    ///
    /// Returns `FinxError::MathError` if the value overflows.
    pub fn value_of(&self, volume: Decimal) -> FinxResult<Decimal> {
        if self.per_original_face_value.is_zero() {
            return Ok(Decimal::ZERO);
        }
        volume
            .checked_mul(self.value)
            .and_then(|v| v.checked_div(self.per_original_face_value))
            .ok_or_else(|| {
                FinxError::math_error(format!("{volume} face at {} overflows", self.value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[test]
    fn test_value_of() {
        let price = PriceRecord::new(d("2000-01-03"), Currency::USD, dec!(99.50));
        assert_eq!(price.value_of(dec!(100000)).unwrap(), dec!(99500));

        let per_unit = price.with_per_original_face_value(dec!(1));
        assert_eq!(per_unit.value_of(dec!(10)).unwrap(), dec!(995));
    }

    #[test]
    fn test_value_of_overflow_is_an_error() {
        let price = PriceRecord::new(d("2000-01-03"), Currency::AUD, dec!(101.5));
        assert!(matches!(
            price.value_of(Decimal::MAX / dec!(10)),
            Err(FinxError::MathError { .. })
        ));
    }

    #[test]
    fn test_unavailable_values_to_zero() {
        let price = PriceRecord::unavailable(d("2000-01-03"));
        assert_eq!(price.currency, None);
        assert_eq!(price.value_of(dec!(100000)).unwrap(), dec!(0));
        assert_eq!(price.value_of(dec!(-5)).unwrap(), dec!(0));
    }

    #[test]
    fn test_serde_shape() {
        let json = r#"{
            "date": "2000-01-01",
            "currency": "AUD",
            "per_original_face_value": 100,
            "base_currency_conversion_rate": 1.00,
            "value": 99.50
        }"#;
        let price: PriceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(price.currency, Some(Currency::AUD));
        assert_eq!(price.value, dec!(99.5));

        let sentinel = serde_json::to_value(PriceRecord::unavailable(d("2000-01-01"))).unwrap();
        assert_eq!(sentinel["currency"], "N/A");
    }
}
