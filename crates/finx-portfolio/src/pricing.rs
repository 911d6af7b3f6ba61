//! Price history and as-of price resolution.
//!
//! A [`PriceHistory`] holds every known quote per security keyed by date.
//! Resolving "the price as of D" means taking the quote with the latest date
//! on or before D; quotes after D are never visible.

use std::collections::{BTreeMap, BTreeSet};

use finx_core::types::{Currency, Date, PriceRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PortfolioError, PortfolioResult};

/// Security → quote currency.
pub type CurrencyMap = BTreeMap<String, Currency>;

/// Quotes per security, keyed by quote date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceHistory {
    securities: BTreeMap<String, BTreeMap<Date, PriceRecord>>,
}

impl PriceHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the external wire shape `{isin: {"YYYY-MM-DD": record}}`.
    ///
    /// Every record is checked structurally before anything is returned.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::MalformedPriceRecord` naming the security,
    /// date key and offending field when a record is missing a field, has a
    /// field of the wrong type, is keyed by an invalid date, or carries a
    /// date different from its key. A document that is not a JSON object
    /// of objects is reported the same way with an empty date.
    pub fn from_json(json: &str) -> PortfolioResult<Self> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| PortfolioError::malformed_price("", "", e.to_string()))?;
        let Value::Object(by_security) = document else {
            return Err(PortfolioError::malformed_price(
                "",
                "",
                "price history must be an object keyed by security",
            ));
        };

        let mut history = Self::new();
        for (isin, quotes) in by_security {
            let Value::Object(by_date) = quotes else {
                return Err(PortfolioError::malformed_price(
                    isin,
                    "",
                    "quotes must be an object keyed by date",
                ));
            };
            for (key, record) in by_date {
                let date = Date::parse(&key).map_err(|_| {
                    PortfolioError::malformed_price(&isin, &key, "date key is not YYYY-MM-DD")
                })?;
                let record: PriceRecord = serde_json::from_value(record)
                    .map_err(|e| PortfolioError::malformed_price(&isin, &key, e.to_string()))?;
                if record.date != date {
                    return Err(PortfolioError::malformed_price(
                        &isin,
                        &key,
                        format!("record is dated {}", record.date),
                    ));
                }
                history.insert(isin.clone(), record);
            }
        }
        Ok(history)
    }

    /// Adds a quote, replacing any existing quote for the same security and date.
    pub fn insert(&mut self, isin: impl Into<String>, record: PriceRecord) {
        self.securities
            .entry(isin.into())
            .or_default()
            .insert(record.date, record);
    }

    /// All quotes for one security.
    #[must_use]
    pub fn quotes(&self, isin: &str) -> Option<&BTreeMap<Date, PriceRecord>> {
        self.securities.get(isin)
    }

    /// Iterates over securities and their quotes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<Date, PriceRecord>)> {
        self.securities.iter()
    }

    /// Number of securities with at least one quote entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.securities.len()
    }

    /// Returns true if no security has a quote.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.securities.values().all(BTreeMap::is_empty)
    }
}

impl<S: Into<String>> FromIterator<(S, PriceRecord)> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = (S, PriceRecord)>>(iter: I) -> Self {
        let mut history = Self::new();
        for (isin, record) in iter {
            history.insert(isin, record);
        }
        history
    }
}

/// The latest quote for `isin` dated on or before `date`.
#[must_use]
pub fn price_as_of<'a>(history: &'a PriceHistory, isin: &str, date: Date) -> Option<&'a PriceRecord> {
    history
        .quotes(isin)?
        .range(..=date)
        .next_back()
        .map(|(_, record)| record)
}

/// The latest quote on or before `date` for every security that has one.
///
/// Securities with no such quote are absent from the result.
#[must_use]
pub fn resolve_prices(history: &PriceHistory, date: Date) -> BTreeMap<String, PriceRecord> {
    history
        .iter()
        .filter_map(|(isin, quotes)| {
            quotes
                .range(..=date)
                .next_back()
                .map(|(_, record)| (isin.clone(), record.clone()))
        })
        .collect()
}

/// Security → currency, taken from each security's most recent quote.
///
/// Quotes without a currency are skipped.
#[must_use]
pub fn currency_map(history: &PriceHistory) -> CurrencyMap {
    history
        .iter()
        .filter_map(|(isin, quotes)| {
            quotes
                .values()
                .rev()
                .find_map(|record| record.currency)
                .map(|currency| (isin.clone(), currency))
        })
        .collect()
}

/// Every currency quoted anywhere in the history, sorted.
#[must_use]
pub fn currencies(history: &PriceHistory) -> BTreeSet<Currency> {
    history
        .iter()
        .flat_map(|(_, quotes)| quotes.values())
        .filter_map(|record| record.currency)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{d, reference_prices, BOND_A, BOND_B};
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_as_of_takes_latest_on_or_before() {
        let history = reference_prices();

        let price = price_as_of(&history, BOND_A, d("2000-03-15")).unwrap();
        assert_eq!(price.date, d("2000-02-01"));

        let exact = price_as_of(&history, BOND_A, d("2000-04-01")).unwrap();
        assert_eq!(exact.value, dec!(101.25));

        assert!(price_as_of(&history, BOND_B, d("2000-01-03")).is_none());
        assert!(price_as_of(&history, "UNKNOWN", d("2000-07-02")).is_none());
    }

    #[test]
    fn test_resolve_prices_omits_unpriced() {
        let history = reference_prices();

        let early = resolve_prices(&history, d("2000-01-03"));
        assert_eq!(early.len(), 1);
        assert!(early.contains_key(BOND_A));

        let late = resolve_prices(&history, d("2000-07-02"));
        assert_eq!(late[BOND_A].value, dec!(100.50));
        assert_eq!(late[BOND_B].value, dec!(101.00));
        assert!(late.values().all(|p| p.date <= d("2000-07-02")));
    }

    #[test]
    fn test_currency_map_and_currencies() {
        let history = reference_prices();
        let map = currency_map(&history);
        assert_eq!(map[BOND_A], Currency::AUD);
        assert_eq!(map[BOND_B], Currency::USD);

        let all: Vec<Currency> = currencies(&history).into_iter().collect();
        assert_eq!(all, vec![Currency::USD, Currency::AUD]);
    }

    #[test]
    fn test_currency_map_uses_latest_quote() {
        let mut history = PriceHistory::new();
        history.insert("X", PriceRecord::new(d("2000-01-01"), Currency::USD, dec!(100)));
        history.insert("X", PriceRecord::new(d("2000-02-01"), Currency::EUR, dec!(100)));
        history.insert("X", PriceRecord::unavailable(d("2000-03-01")));
        assert_eq!(currency_map(&history)["X"], Currency::EUR);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "XS1234567890": {
                "2000-01-01": {
                    "date": "2000-01-01",
                    "currency": "AUD",
                    "per_original_face_value": 100,
                    "base_currency_conversion_rate": 1.0,
                    "value": 101.5
                }
            }
        }"#;
        let history = PriceHistory::from_json(json).unwrap();
        let price = price_as_of(&history, BOND_A, d("2000-01-02")).unwrap();
        assert_eq!(price.value, dec!(101.5));
        assert_eq!(price.currency, Some(Currency::AUD));
    }

    #[test]
    fn test_from_json_names_missing_field() {
        let json = r#"{
            "XS1234567890": {
                "2000-01-01": {"date": "2000-01-01", "currency": "AUD", "value": 101.5}
            }
        }"#;
        match PriceHistory::from_json(json) {
            Err(PortfolioError::MalformedPriceRecord { isin, date, field }) => {
                assert_eq!(isin, BOND_A);
                assert_eq!(date, "2000-01-01");
                assert!(field.contains("per_original_face_value"));
            }
            other => panic!("expected MalformedPriceRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json_rejects_inconsistent_shapes() {
        let wrong_date = r#"{"X": {"2000-01-01": {
            "date": "2000-01-02", "currency": "AUD",
            "per_original_face_value": 100, "base_currency_conversion_rate": 1, "value": 1
        }}}"#;
        assert!(matches!(
            PriceHistory::from_json(wrong_date),
            Err(PortfolioError::MalformedPriceRecord { .. })
        ));

        let bad_key = r#"{"X": {"01/01/2000": {}}}"#;
        assert!(matches!(
            PriceHistory::from_json(bad_key),
            Err(PortfolioError::MalformedPriceRecord { field, .. }) if field.contains("date key")
        ));

        assert!(PriceHistory::from_json("[]").is_err());
        assert!(PriceHistory::from_json(r#"{"X": 1}"#).is_err());
    }
}
